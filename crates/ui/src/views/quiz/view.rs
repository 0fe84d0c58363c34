use std::sync::Arc;
use std::time::Duration;

use dioxus::prelude::*;
use dioxus_router::{Navigator, use_navigator};
use tokio::sync::mpsc;

use quiz_core::model::QuizId;
use services::quiz::{SessionCommand, SessionSnapshot, spawn_session};
use services::{ChannelExit, ChannelNotifier, ExitReason, Notice};

use crate::context::AppContext;
use crate::routes::Route;
use crate::vm::{QuizScreen, header_vm, screen_vm};

use super::components::{
    AcknowledgePanel, LoadFailedPanel, QuestionCard, QuizHeader, ResultPanel, ReviewPanel, Toast,
    ToastStack,
};
use super::scripts::{BridgeMessage, PageBridge};

const TOAST_TTL: Duration = Duration::from_secs(4);

#[component]
pub fn QuizView(quiz_id: u64) -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let mut snapshot = use_signal(SessionSnapshot::default);
    let toasts = use_signal(Vec::<Toast>::new);

    let handle = use_hook(|| {
        let (notice_tx, mut notices) = mpsc::unbounded_channel::<Notice>();
        let (exit_tx, mut exits) = mpsc::unbounded_channel::<ExitReason>();
        let handle = spawn_session(
            ctx.backend(),
            QuizId::new(quiz_id),
            ctx.session_config(),
            Arc::new(ChannelNotifier::new(notice_tx)),
            Arc::new(ChannelExit::new(exit_tx)),
        );

        let mut updates = handle.subscribe();
        spawn(async move {
            snapshot.set(updates.borrow_and_update().clone());
            loop {
                tokio::select! {
                    changed = updates.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let next = updates.borrow_and_update().clone();
                        snapshot.set(next);
                    }
                    Some(notice) = notices.recv() => show_toast(toasts, notice),
                    Some(reason) = exits.recv() => {
                        leave(navigator, reason);
                        return;
                    }
                }
            }
            while let Ok(notice) = notices.try_recv() {
                show_toast(toasts, notice);
            }
            if let Ok(reason) = exits.try_recv() {
                leave(navigator, reason);
            }
        });
        handle
    });

    let bridge = use_hook(PageBridge::next);

    {
        let handle = handle.clone();
        use_hook(move || {
            spawn(async move {
                let mut page = document::eval(&bridge.script());
                while let Ok(message) = page.recv::<BridgeMessage>().await {
                    let Some(signal) = message.into_signal() else {
                        continue;
                    };
                    if !handle.send(SessionCommand::Signal(signal)) {
                        break;
                    }
                }
            });
        });
    }

    {
        let handle = handle.clone();
        use_drop(move || {
            document::eval(&bridge.stop_script());
            handle.close();
        });
    }

    let on_command = {
        let handle = handle.clone();
        use_callback(move |command: SessionCommand| {
            handle.send(command);
        })
    };

    let current = snapshot.read().clone();
    let header = header_vm(&current);
    let screen = screen_vm(&current);
    let (root_class, guarded) = if current.blocks_clipboard {
        ("page quiz-page quiz-page--guarded", "true")
    } else {
        ("page quiz-page", "false")
    };

    rsx! {
        div {
            class: root_class,
            id: "quiz-root",
            "data-guarded": guarded,
            ToastStack { toasts: toasts.read().clone() }
            match screen {
                QuizScreen::Loading => rsx! {
                    p { class: "quiz-status", "Loading quiz..." }
                },
                QuizScreen::LoadFailed(message) => rsx! {
                    LoadFailedPanel { message, on_command }
                },
                QuizScreen::Acknowledge { duration_label } => rsx! {
                    AcknowledgePanel { title: header.title.clone(), duration_label, on_command }
                },
                QuizScreen::Question(vm) => rsx! {
                    QuizHeader { header: header.clone() }
                    QuestionCard { vm, on_command }
                },
                QuizScreen::Review(vm) => rsx! {
                    ReviewPanel {
                        vm,
                        clock_label: header.clock_label.clone(),
                        clock_caption: header.clock_caption,
                        on_command,
                    }
                },
                QuizScreen::Submitting => rsx! {
                    p { class: "quiz-status", "Submitting your answers..." }
                },
                QuizScreen::Result(vm) => rsx! {
                    ResultPanel { vm, on_command }
                },
                QuizScreen::Closed => rsx! {
                    p { class: "quiz-status", "Leaving quiz..." }
                },
            }
        }
    }
}

fn show_toast(mut toasts: Signal<Vec<Toast>>, notice: Notice) {
    let id = toasts
        .peek()
        .iter()
        .map(|toast| toast.id + 1)
        .max()
        .unwrap_or_default();
    toasts.write().push(Toast {
        id,
        message: notice.message,
        kind: notice.kind,
    });
    spawn(async move {
        tokio::time::sleep(TOAST_TTL).await;
        toasts.write().retain(|toast| toast.id != id);
    });
}

fn leave(navigator: Navigator, reason: ExitReason) {
    match reason {
        ExitReason::LoadFailed => {
            let _ = navigator.push(Route::Home {});
        }
        ExitReason::Back | ExitReason::Finished => {
            if navigator.can_go_back() {
                navigator.go_back();
            } else {
                let _ = navigator.push(Route::Home {});
            }
        }
    }
}
