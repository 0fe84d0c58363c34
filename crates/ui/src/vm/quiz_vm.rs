use quiz_core::model::{AttemptOutcome, QuestionId, SubmitCause};
use services::quiz::{
    PaletteEntry, SessionPhase, SessionSnapshot, TimerMode, format_clock, violation_notice,
};

use super::time_fmt::format_datetime;

/// Below this many seconds the countdown is drawn as urgent.
pub const URGENT_CLOCK_SECS: u32 = 60;

pub const LOCKED_REVIEW_NOTICE: &str =
    "Your answers are locked after an automatic submission. Submit again to record them.";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizHeaderVm {
    pub title: String,
    pub topic: Option<String>,
    pub clock_label: String,
    pub clock_caption: &'static str,
    pub urgent: bool,
    pub progress_percent: u8,
    pub show_progress: bool,
    pub show_palette: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionVm {
    pub text: String,
    pub selected: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionVm {
    pub question_id: QuestionId,
    pub position_label: String,
    pub prompt: String,
    pub options: Vec<OptionVm>,
    /// Only present for read-only sessions.
    pub correct_answer: Option<String>,
    pub read_only: bool,
    pub can_go_back: bool,
    pub next_label: &'static str,
    pub palette: Vec<PaletteEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReviewRowVm {
    pub index: usize,
    pub label: String,
    pub prompt: String,
    pub answer: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReviewVm {
    pub rows: Vec<ReviewRowVm>,
    pub answered: usize,
    pub unanswered: usize,
    pub warning: Option<String>,
    /// Set once a forced submission froze the answers; rows no longer navigate.
    pub locked: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultRowVm {
    pub label: String,
    pub prompt: String,
    pub selected: Option<String>,
    pub correct_answer: Option<String>,
    pub correct: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultVm {
    pub score_label: String,
    pub verdict: Option<&'static str>,
    pub correct_label: Option<String>,
    pub answered_label: String,
    pub time_label: String,
    pub submitted_label: String,
    pub forced_notice: Option<&'static str>,
    pub rows: Vec<ResultRowVm>,
}

/// The one screen a session shows at a time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QuizScreen {
    Loading,
    LoadFailed(String),
    Acknowledge { duration_label: String },
    Question(QuestionVm),
    Review(ReviewVm),
    Submitting,
    Result(ResultVm),
    Closed,
}

#[must_use]
pub fn header_vm(snapshot: &SessionSnapshot) -> QuizHeaderVm {
    let countdown = snapshot.timer_mode == TimerMode::Countdown;
    QuizHeaderVm {
        title: snapshot.title.clone(),
        topic: snapshot.topic_name.clone(),
        clock_label: snapshot.clock_label(),
        clock_caption: if countdown {
            "Time Remaining"
        } else {
            "Elapsed"
        },
        urgent: countdown && snapshot.phase.is_live() && snapshot.clock_secs <= URGENT_CLOCK_SECS,
        progress_percent: snapshot.progress_percent(),
        show_progress: !snapshot.read_only,
        show_palette: !snapshot.read_only && snapshot.phase == SessionPhase::Answering,
    }
}

#[must_use]
pub fn screen_vm(snapshot: &SessionSnapshot) -> QuizScreen {
    if snapshot.closed {
        return QuizScreen::Closed;
    }
    match snapshot.phase {
        SessionPhase::Loading => snapshot
            .load_error
            .as_ref()
            .map_or(QuizScreen::Loading, |_| {
                QuizScreen::LoadFailed("Failed to load quiz".to_owned())
            }),
        SessionPhase::Acknowledging => QuizScreen::Acknowledge {
            duration_label: format!("Duration: {}", format_clock(snapshot.clock_secs)),
        },
        SessionPhase::Answering => {
            question_vm(snapshot).map_or(QuizScreen::Loading, QuizScreen::Question)
        }
        SessionPhase::Reviewing => QuizScreen::Review(review_vm(snapshot)),
        SessionPhase::Submitting => QuizScreen::Submitting,
        SessionPhase::Submitted => snapshot
            .outcome
            .as_ref()
            .map_or(QuizScreen::Submitting, |outcome| {
                QuizScreen::Result(result_vm(snapshot, outcome))
            }),
    }
}

fn question_vm(snapshot: &SessionSnapshot) -> Option<QuestionVm> {
    let question = snapshot.current_question()?;
    let selected = snapshot.answer_for(question.id());
    let next_label = match (snapshot.is_last(), snapshot.read_only) {
        (false, _) => "Next Question",
        (true, true) => "Finish",
        (true, false) => "Review & Submit",
    };
    Some(QuestionVm {
        question_id: question.id(),
        position_label: format!("Question {} of {}", snapshot.cursor + 1, snapshot.total()),
        prompt: question.prompt().to_owned(),
        options: question
            .options()
            .iter()
            .map(|option| OptionVm {
                text: option.text.clone(),
                selected: selected == Some(option.text.as_str()),
            })
            .collect(),
        correct_answer: snapshot
            .read_only
            .then(|| question.correct_answer().map(str::to_owned))
            .flatten(),
        read_only: snapshot.read_only,
        can_go_back: !snapshot.is_first(),
        next_label,
        palette: snapshot.palette(),
    })
}

fn review_vm(snapshot: &SessionSnapshot) -> ReviewVm {
    let summary = snapshot.review();
    let warning = match summary.unanswered {
        0 => None,
        1 => Some("You have 1 unanswered question.".to_owned()),
        n => Some(format!("You have {n} unanswered questions.")),
    };
    ReviewVm {
        rows: summary
            .items
            .into_iter()
            .map(|item| ReviewRowVm {
                index: item.index,
                label: format!("Q{}", item.index + 1),
                prompt: item.prompt,
                answer: item.answer,
            })
            .collect(),
        answered: summary.answered,
        unanswered: summary.unanswered,
        warning,
        locked: snapshot.violation.is_some(),
    }
}

fn result_vm(snapshot: &SessionSnapshot, outcome: &AttemptOutcome) -> ResultVm {
    let result = &outcome.result;
    let rows = snapshot
        .questions
        .iter()
        .enumerate()
        .filter_map(|(index, question)| {
            result.outcome_for(question.id()).map(|graded| ResultRowVm {
                label: format!("Q{}", index + 1),
                prompt: question.prompt().to_owned(),
                selected: graded.selected_answer.clone(),
                correct_answer: graded.correct_answer.clone(),
                correct: graded.correct,
            })
        })
        .collect();

    ResultVm {
        score_label: format!("{}%", result.score),
        verdict: result
            .passed
            .map(|passed| if passed { "Passed" } else { "Not passed" }),
        correct_label: match (result.correct_answers, result.total_questions) {
            (Some(correct), Some(total)) => Some(format!("{correct} of {total} correct")),
            _ => None,
        },
        answered_label: format!("Answered {} of {}", outcome.answered, snapshot.total()),
        time_label: format!("Time spent {}", format_clock(outcome.time_spent_secs)),
        submitted_label: format!("Submitted {}", format_datetime(outcome.submitted_at)),
        forced_notice: match outcome.cause {
            SubmitCause::Manual => None,
            SubmitCause::Forced(cause) => Some(violation_notice(cause)),
        },
        rows,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use quiz_core::model::{
        AnswerOption, AttemptResult, OptionId, Question, QuestionOutcome, QuizId, ViolationCause,
    };
    use quiz_core::time::fixed_now;

    use super::*;

    fn snapshot(phase: SessionPhase) -> SessionSnapshot {
        let questions: Vec<Question> = (1..=3)
            .map(|id| {
                Question::new(
                    QuestionId::new(id),
                    format!("Prompt {id}"),
                    vec![
                        AnswerOption::new(OptionId::new(id * 10), "Yes"),
                        AnswerOption::new(OptionId::new(id * 10 + 1), "No"),
                    ],
                )
            })
            .collect();
        let mut answers = BTreeMap::new();
        answers.insert(QuestionId::new(1), "Yes".to_owned());
        SessionSnapshot {
            quiz_id: Some(QuizId::new(1)),
            phase,
            title: "Ownership".into(),
            questions: questions.into(),
            answers,
            clock_secs: 45,
            proctored: true,
            ..SessionSnapshot::default()
        }
    }

    #[test]
    fn question_screen_marks_the_selected_option() {
        let QuizScreen::Question(vm) = screen_vm(&snapshot(SessionPhase::Answering)) else {
            panic!("expected question screen");
        };
        assert_eq!(vm.position_label, "Question 1 of 3");
        assert!(vm.options[0].selected);
        assert!(!vm.options[1].selected);
        assert!(!vm.can_go_back);
        assert_eq!(vm.next_label, "Next Question");
        assert!(vm.correct_answer.is_none());
    }

    #[test]
    fn last_question_leads_to_review_or_finish() {
        let mut learner = snapshot(SessionPhase::Answering);
        learner.cursor = 2;
        let QuizScreen::Question(vm) = screen_vm(&learner) else {
            panic!("expected question screen");
        };
        assert_eq!(vm.next_label, "Review & Submit");

        learner.read_only = true;
        let QuizScreen::Question(vm) = screen_vm(&learner) else {
            panic!("expected question screen");
        };
        assert_eq!(vm.next_label, "Finish");
    }

    #[test]
    fn review_warns_about_unanswered_questions() {
        let QuizScreen::Review(vm) = screen_vm(&snapshot(SessionPhase::Reviewing)) else {
            panic!("expected review screen");
        };
        assert_eq!(vm.answered, 1);
        assert_eq!(vm.warning.as_deref(), Some("You have 2 unanswered questions."));
        assert_eq!(vm.rows[0].label, "Q1");
        assert_eq!(vm.rows[1].answer, None);
        assert!(!vm.locked);
    }

    #[test]
    fn review_after_forced_failure_is_locked() {
        let mut locked = snapshot(SessionPhase::Reviewing);
        locked.violation = Some(ViolationCause::Timeout);
        let QuizScreen::Review(vm) = screen_vm(&locked) else {
            panic!("expected review screen");
        };
        assert!(vm.locked);
    }

    #[test]
    fn header_turns_urgent_near_the_end() {
        let header = header_vm(&snapshot(SessionPhase::Answering));
        assert!(header.urgent);
        assert_eq!(header.clock_label, "00:45");
        assert_eq!(header.progress_percent, 33);

        let header = header_vm(&snapshot(SessionPhase::Acknowledging));
        assert!(!header.urgent);
    }

    #[test]
    fn load_failure_has_its_own_screen() {
        let mut failed = snapshot(SessionPhase::Loading);
        failed.load_error = Some("not found".into());
        assert_eq!(
            screen_vm(&failed),
            QuizScreen::LoadFailed("Failed to load quiz".into())
        );
    }

    #[test]
    fn forced_result_explains_itself() {
        let mut done = snapshot(SessionPhase::Submitted);
        done.outcome = Some(AttemptOutcome {
            result: AttemptResult {
                score: 33,
                total_questions: Some(3),
                correct_answers: Some(1),
                passed: Some(false),
                results: vec![QuestionOutcome {
                    question_id: QuestionId::new(1),
                    correct: true,
                    selected_answer: Some("Yes".into()),
                    correct_answer: Some("Yes".into()),
                }],
            },
            cause: SubmitCause::Forced(ViolationCause::TabSwitch),
            time_spent_secs: 75,
            answered: 1,
            started_at: fixed_now(),
            submitted_at: fixed_now(),
        });

        let QuizScreen::Result(vm) = screen_vm(&done) else {
            panic!("expected result screen");
        };
        assert_eq!(vm.score_label, "33%");
        assert_eq!(vm.verdict, Some("Not passed"));
        assert_eq!(vm.correct_label.as_deref(), Some("1 of 3 correct"));
        assert_eq!(vm.time_label, "Time spent 01:15");
        assert_eq!(
            vm.forced_notice,
            Some(violation_notice(ViolationCause::TabSwitch))
        );
        assert_eq!(vm.rows.len(), 1);
    }
}
