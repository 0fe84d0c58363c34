use std::sync::Arc;

use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_router::{Routable, Router};

use backend::{Backend, InMemoryBackend};
use quiz_core::model::{AnswerOption, OptionId, Question, QuestionId, Quiz, QuizId, StudentId, TopicId, TopicRef};
use services::SessionConfig;

use crate::context::{UiApp, build_app_context};
use crate::views::{HomeView, QuizView};

pub const SEEDED_QUIZ: u64 = 1;

#[derive(Clone)]
struct TestApp {
    backend: InMemoryBackend,
    config: SessionConfig,
    default_quiz: Option<QuizId>,
}

impl UiApp for TestApp {
    fn backend(&self) -> Backend {
        Backend::in_memory(&self.backend)
    }

    fn session_config(&self) -> SessionConfig {
        self.config.clone()
    }

    fn default_quiz(&self) -> Option<QuizId> {
        self.default_quiz
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Home,
    Quiz(u64),
}

#[derive(Props, Clone)]
struct ViewHarnessProps {
    app: Arc<TestApp>,
    view: ViewKind,
}

impl PartialEq for ViewHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

#[component]
fn ViewRouterHarness(props: ViewHarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    use_context_provider(|| build_app_context(&app));
    use_context_provider(|| props.view);
    rsx! { Router::<TestRoute> {} }
}

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum TestRoute {
    #[route("/")]
    Root {},
}

#[component]
fn Root() -> Element {
    let view = use_context::<ViewKind>();
    match view {
        ViewKind::Home => rsx! { HomeView {} },
        ViewKind::Quiz(quiz_id) => rsx! { QuizView { quiz_id } },
    }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
    pub backend: InMemoryBackend,
}

impl ViewHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub async fn drive_async(&mut self) {
        let _ = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            self.dom.wait_for_work(),
        )
        .await;
        self.dom.render_immediate(&mut NoOpMutations);
        self.dom.process_events();
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }

    /// Drives the dom until the rendered html contains `needle`, or gives up.
    pub async fn render_until(&mut self, needle: &str) -> String {
        let mut html = self.render();
        for _ in 0..20 {
            if html.contains(needle) {
                break;
            }
            self.drive_async().await;
            html = self.render();
        }
        html
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

pub fn seeded_backend() -> InMemoryBackend {
    let backend = InMemoryBackend::new();
    let quiz = Quiz::new(QuizId::new(SEEDED_QUIZ), "Ownership Basics", Some(10)).with_topic(TopicRef {
        id: TopicId::new(3),
        name: "Memory".into(),
        course_id: None,
    });
    let questions = vec![
        Question::new(
            QuestionId::new(1),
            "Which keyword moves a value into a closure?",
            vec![
                AnswerOption::new(OptionId::new(11), "move"),
                AnswerOption::new(OptionId::new(12), "ref"),
            ],
        )
        .with_correct_answer("move"),
        Question::new(
            QuestionId::new(2),
            "How many mutable borrows may coexist?",
            vec![
                AnswerOption::new(OptionId::new(21), "One"),
                AnswerOption::new(OptionId::new(22), "Any number"),
            ],
        )
        .with_correct_answer("One"),
    ];
    backend.insert_quiz(quiz, questions).expect("seed quiz");
    backend
}

pub fn setup_view_harness(
    view: ViewKind,
    config: SessionConfig,
    default_quiz: Option<QuizId>,
) -> ViewHarness {
    let backend = seeded_backend();
    let app = Arc::new(TestApp {
        backend: backend.clone(),
        config,
        default_quiz,
    });
    let dom = VirtualDom::new_with_props(ViewRouterHarness, ViewHarnessProps { app, view });
    ViewHarness { dom, backend }
}

pub fn learner_config() -> SessionConfig {
    SessionConfig::new(StudentId::new(11))
}
