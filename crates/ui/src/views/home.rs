use std::sync::Arc;

use dioxus::prelude::*;
use dioxus_router::Link;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};

#[derive(Clone, Debug, PartialEq)]
struct QuizCard {
    quiz_id: u64,
    title: String,
    topic: Option<String>,
    duration_label: String,
    proctored: bool,
}

#[component]
pub fn HomeView() -> Element {
    let ctx = use_context::<AppContext>();
    let default_quiz = ctx.default_quiz();
    let catalog = ctx.backend().catalog;

    let resource = use_resource(move || {
        let catalog = Arc::clone(&catalog);
        async move {
            let quiz_id = default_quiz.ok_or(ViewError::MissingQuiz)?;
            let quiz = catalog.get_quiz(quiz_id).await?;
            Ok::<_, ViewError>(QuizCard {
                quiz_id: quiz_id.value(),
                title: quiz.title().to_owned(),
                topic: quiz.topic().map(|topic| topic.name.clone()),
                duration_label: format!("{} minutes", quiz.duration_minutes()),
                proctored: quiz.proctored(),
            })
        }
    });
    let state = view_state_from_resource(resource);

    rsx! {
        div { class: "page home-page",
            h2 { "Quiz" }
            match state {
                ViewState::Idle | ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Ready(card) => rsx! {
                    div { class: "home-card",
                        h3 { class: "home-card__title", "{card.title}" }
                        if let Some(topic) = card.topic.clone() {
                            p { class: "home-card__topic", "{topic}" }
                        }
                        p { class: "home-card__meta", "{card.duration_label}" }
                        if card.proctored {
                            p { class: "home-card__meta", "Proctored" }
                        }
                        Link {
                            class: "btn btn-primary",
                            to: Route::Quiz { quiz_id: card.quiz_id },
                            "Start Quiz"
                        }
                    }
                },
                ViewState::Error(err) => rsx! {
                    p { class: "home-error", "{err.message()}" }
                },
            }
        }
    }
}
