use dioxus::prelude::*;

use quiz_core::model::QuestionId;
use services::quiz::{PaletteEntry, SessionCommand};
use services::NoticeKind;

use crate::vm::{
    LOCKED_REVIEW_NOTICE, OptionVm, QuestionVm, QuizHeaderVm, ResultRowVm, ResultVm, ReviewRowVm,
    ReviewVm,
};

const SECURITY_RULES: [(&str, &str); 4] = [
    (
        "Tab Switching / Window Minimizing",
        "Leaving this page or minimizing the window will trigger auto-submission.",
    ),
    (
        "Screenshots or Screen Recording",
        "Attempting to capture the screen content is detected and will auto-submit.",
    ),
    (
        "Copy / Paste Operations",
        "Clipboard operations are completely disabled during the quiz.",
    ),
    (
        "Right-Click Context Menu",
        "The context menu is restricted to prevent unauthorized actions.",
    ),
];

const CHECKLIST: [&str; 4] = [
    "Ensure you have a stable internet connection",
    "Close all unnecessary tabs and applications",
    "Make sure you won't be interrupted during the quiz",
    "Keep this window in full screen or maximized",
];

#[derive(Clone, Debug, PartialEq)]
pub(super) struct Toast {
    pub id: u64,
    pub message: String,
    pub kind: NoticeKind,
}

fn toast_class(kind: NoticeKind) -> &'static str {
    match kind {
        NoticeKind::Info => "toast toast--info",
        NoticeKind::Success => "toast toast--success",
        NoticeKind::Warning => "toast toast--warning",
        NoticeKind::Error => "toast toast--error",
    }
}

#[component]
pub(super) fn ToastStack(toasts: Vec<Toast>) -> Element {
    rsx! {
        div { class: "toast-stack", role: "status",
            for toast in toasts {
                div { key: "{toast.id}", class: toast_class(toast.kind), "{toast.message}" }
            }
        }
    }
}

#[component]
pub(super) fn QuizHeader(header: QuizHeaderVm) -> Element {
    let clock_class = if header.urgent {
        "quiz-header__clock quiz-header__clock--urgent"
    } else {
        "quiz-header__clock"
    };
    let percent = header.progress_percent;
    rsx! {
        header { class: "quiz-header",
            div { class: "quiz-header__titles",
                h1 { class: "quiz-header__title", "{header.title}" }
                if let Some(topic) = header.topic.clone() {
                    span { class: "quiz-header__topic", "{topic}" }
                }
            }
            div { class: "quiz-header__timer",
                span { class: "quiz-header__caption", "{header.clock_caption}" }
                span { class: clock_class, id: "quiz-clock", "{header.clock_label}" }
            }
            if header.show_progress {
                div { class: "quiz-header__progress",
                    span { "Progress" }
                    span { class: "quiz-header__percent", "{percent}%" }
                    div { class: "progress-bar",
                        div { class: "progress-bar__fill", style: "width: {percent}%" }
                    }
                }
            }
        }
    }
}

#[component]
pub(super) fn LoadFailedPanel(message: String, on_command: EventHandler<SessionCommand>) -> Element {
    rsx! {
        div { class: "quiz-failed",
            p { class: "quiz-failed__message", "{message}" }
            button {
                class: "btn btn-secondary",
                r#type: "button",
                onclick: move |_| on_command.call(SessionCommand::Back),
                "Back"
            }
        }
    }
}

#[component]
pub(super) fn AcknowledgePanel(
    title: String,
    duration_label: String,
    on_command: EventHandler<SessionCommand>,
) -> Element {
    rsx! {
        div { class: "quiz-ack",
            button {
                class: "quiz-ack__back",
                r#type: "button",
                onclick: move |_| on_command.call(SessionCommand::Back),
                "Back"
            }
            section { class: "quiz-ack__card", role: "dialog", aria_labelledby: "quiz-ack-title",
                header { class: "quiz-ack__header",
                    h1 { id: "quiz-ack-title", "Security Protocol" }
                    p { "Please Read Carefully Before Starting" }
                }
                p { class: "quiz-ack__quiz", "{title} · {duration_label}" }
                p { class: "quiz-ack__intro",
                    "This assessment is monitored by an anti-cheat system. Any violation of the rules below will result in immediate automatic submission of your quiz with current answers."
                }
                ul { class: "quiz-ack__rules",
                    for (heading, detail) in SECURITY_RULES {
                        li { key: "{heading}",
                            h3 { "{heading}" }
                            p { "{detail}" }
                        }
                    }
                }
                ul { class: "quiz-ack__checklist",
                    for item in CHECKLIST {
                        li { key: "{item}", "{item}" }
                    }
                }
                button {
                    class: "btn btn-primary",
                    id: "quiz-ack-accept",
                    r#type: "button",
                    onclick: move |_| on_command.call(SessionCommand::Acknowledge),
                    "I Understand, Start Quiz"
                }
            }
        }
    }
}

#[component]
pub(super) fn QuestionCard(vm: QuestionVm, on_command: EventHandler<SessionCommand>) -> Element {
    let question_id = vm.question_id;
    let read_only = vm.read_only;
    rsx! {
        div { class: "quiz-body",
            if !read_only {
                Palette { entries: vm.palette.clone(), on_command }
            }
            article { class: "quiz-card",
                header { class: "quiz-card__header",
                    span { class: "quiz-card__position", "{vm.position_label}" }
                }
                h2 { class: "quiz-card__prompt", "{vm.prompt}" }
                ul { class: "quiz-options",
                    for option in vm.options.clone() {
                        OptionRow { key: "{option.text}", question_id, option, read_only, on_command }
                    }
                }
                if let Some(answer) = vm.correct_answer.clone() {
                    p { class: "quiz-card__answer", "Correct Answer: {answer}" }
                }
                footer { class: "quiz-card__footer",
                    button {
                        class: "btn btn-ghost",
                        id: "quiz-prev",
                        r#type: "button",
                        disabled: !vm.can_go_back,
                        onclick: move |_| on_command.call(SessionCommand::Prev),
                        "Previous"
                    }
                    button {
                        class: "btn btn-primary",
                        id: "quiz-next",
                        r#type: "button",
                        onclick: move |_| on_command.call(SessionCommand::Next),
                        "{vm.next_label}"
                    }
                }
            }
        }
    }
}

#[component]
fn OptionRow(
    question_id: QuestionId,
    option: OptionVm,
    read_only: bool,
    on_command: EventHandler<SessionCommand>,
) -> Element {
    let class = if option.selected {
        "quiz-option quiz-option--selected"
    } else {
        "quiz-option"
    };
    let text = option.text.clone();
    rsx! {
        li {
            label { class,
                input {
                    r#type: "radio",
                    name: "q_{question_id}",
                    value: "{option.text}",
                    checked: option.selected,
                    disabled: read_only,
                    onchange: move |_| {
                        on_command.call(SessionCommand::Select {
                            question_id,
                            option_text: text.clone(),
                        });
                    },
                }
                span { class: "quiz-option__text", "{option.text}" }
            }
        }
    }
}

#[component]
fn Palette(entries: Vec<PaletteEntry>, on_command: EventHandler<SessionCommand>) -> Element {
    rsx! {
        aside { class: "quiz-palette",
            h3 { class: "quiz-palette__title", "Palette" }
            div { class: "quiz-palette__grid",
                for entry in entries {
                    PaletteButton { key: "{entry.index}", entry, on_command }
                }
            }
            ul { class: "quiz-palette__legend",
                li { class: "legend legend--current", "Current" }
                li { class: "legend legend--answered", "Answered" }
                li { class: "legend legend--unanswered", "Unanswered" }
            }
        }
    }
}

#[component]
fn PaletteButton(entry: PaletteEntry, on_command: EventHandler<SessionCommand>) -> Element {
    let index = entry.index;
    let number = index + 1;
    let class = match (entry.current, entry.answered) {
        (true, _) => "palette-cell palette-cell--current",
        (false, true) => "palette-cell palette-cell--answered",
        (false, false) => "palette-cell",
    };
    rsx! {
        button {
            class,
            r#type: "button",
            onclick: move |_| on_command.call(SessionCommand::JumpTo(index)),
            "{number}"
        }
    }
}

#[component]
pub(super) fn ReviewPanel(
    vm: ReviewVm,
    clock_label: String,
    clock_caption: &'static str,
    on_command: EventHandler<SessionCommand>,
) -> Element {
    rsx! {
        section { class: "quiz-review",
            header { class: "quiz-review__header",
                div {
                    h2 { "Review Your Attempt" }
                    p { "Review your options before final submission." }
                }
                div { class: "quiz-review__clock",
                    span { class: "quiz-review__time", "{clock_label}" }
                    span { class: "quiz-review__caption", "{clock_caption}" }
                }
            }
            if vm.locked {
                p { class: "quiz-review__locked", role: "alert", "{LOCKED_REVIEW_NOTICE}" }
            } else if let Some(warning) = vm.warning.clone() {
                p { class: "quiz-review__warning", "{warning}" }
            }
            div { class: "quiz-review__grid",
                for row in vm.rows.clone() {
                    ReviewRow { key: "{row.index}", row, locked: vm.locked, on_command }
                }
            }
            footer { class: "quiz-review__footer",
                if !vm.locked {
                    button {
                        class: "btn btn-secondary",
                        r#type: "button",
                        onclick: move |_| on_command.call(SessionCommand::CloseReview),
                        "Back to Questions"
                    }
                }
                button {
                    class: "btn btn-primary",
                    id: "quiz-submit",
                    r#type: "button",
                    onclick: move |_| on_command.call(SessionCommand::Submit),
                    "Submit Assessment"
                }
            }
        }
    }
}

#[component]
fn ReviewRow(row: ReviewRowVm, locked: bool, on_command: EventHandler<SessionCommand>) -> Element {
    let index = row.index;
    let class = if row.answer.is_some() {
        "review-row review-row--answered"
    } else {
        "review-row review-row--unanswered"
    };
    rsx! {
        button {
            class,
            r#type: "button",
            disabled: locked,
            onclick: move |_| on_command.call(SessionCommand::JumpTo(index)),
            span { class: "review-row__label", "{row.label}" }
            p { class: "review-row__prompt", "{row.prompt}" }
            if let Some(answer) = row.answer.clone() {
                span { class: "review-row__answer", "Selected: {answer}" }
            } else {
                span { class: "review-row__missing", "Not Answered" }
            }
        }
    }
}

#[component]
pub(super) fn ResultPanel(vm: ResultVm, on_command: EventHandler<SessionCommand>) -> Element {
    rsx! {
        section { class: "quiz-result",
            h2 { "Quiz Result" }
            if let Some(notice) = vm.forced_notice {
                p { class: "quiz-result__forced", "{notice}" }
            }
            div { class: "quiz-result__score", "{vm.score_label}" }
            if let Some(verdict) = vm.verdict {
                p { class: "quiz-result__verdict", "{verdict}" }
            }
            if let Some(correct) = vm.correct_label.clone() {
                p { class: "quiz-result__meta", "{correct}" }
            }
            p { class: "quiz-result__meta", "{vm.answered_label}" }
            p { class: "quiz-result__meta", "{vm.time_label}" }
            p { class: "quiz-result__meta", "{vm.submitted_label}" }
            if !vm.rows.is_empty() {
                ul { class: "quiz-result__rows",
                    for row in vm.rows.clone() {
                        ResultRow { key: "{row.label}", row }
                    }
                }
            }
            footer { class: "quiz-result__footer",
                button {
                    class: "btn btn-primary",
                    id: "quiz-retry",
                    r#type: "button",
                    onclick: move |_| on_command.call(SessionCommand::Retry),
                    "Retry Quiz"
                }
                button {
                    class: "btn btn-secondary",
                    r#type: "button",
                    onclick: move |_| on_command.call(SessionCommand::Back),
                    "Back to Course"
                }
            }
        }
    }
}

#[component]
fn ResultRow(row: ResultRowVm) -> Element {
    let class = if row.correct {
        "result-row result-row--correct"
    } else {
        "result-row result-row--wrong"
    };
    let selected = row.selected.clone().unwrap_or_else(|| "Not answered".to_owned());
    rsx! {
        li { class,
            span { class: "result-row__label", "{row.label}" }
            p { class: "result-row__prompt", "{row.prompt}" }
            p { class: "result-row__selected", "Your answer: {selected}" }
            if let Some(answer) = row.correct_answer.clone() {
                p { class: "result-row__correct", "Correct answer: {answer}" }
            }
        }
    }
}
