use std::collections::BTreeMap;
use std::sync::Arc;

use quiz_core::model::{AttemptOutcome, Question, QuestionId, QuizId, ViolationCause};

use super::controller::QuizSession;
use super::phase::SessionPhase;
use super::review::{PaletteEntry, ReviewSummary, palette, progress_percent};
use super::timer::{TimerMode, format_clock};

/// Everything a view needs to render one frame of a session.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionSnapshot {
    pub quiz_id: Option<QuizId>,
    pub phase: SessionPhase,
    pub title: String,
    pub topic_name: Option<String>,
    pub questions: Arc<[Question]>,
    pub cursor: usize,
    pub answers: BTreeMap<QuestionId, String>,
    pub timer_mode: TimerMode,
    pub clock_secs: u32,
    pub read_only: bool,
    pub proctored: bool,
    pub blocks_clipboard: bool,
    pub violation: Option<ViolationCause>,
    pub outcome: Option<AttemptOutcome>,
    pub load_error: Option<String>,
    pub closed: bool,
}

impl SessionSnapshot {
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.cursor)
    }

    #[must_use]
    pub fn answer_for(&self, question_id: QuestionId) -> Option<&str> {
        self.answers.get(&question_id).map(String::as_str)
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn answered(&self) -> usize {
        self.answers.len()
    }

    #[must_use]
    pub fn progress_percent(&self) -> u8 {
        progress_percent(self.answered(), self.total())
    }

    #[must_use]
    pub fn is_first(&self) -> bool {
        self.cursor == 0
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.cursor + 1 >= self.total()
    }

    /// `MM:SS` for the clock face.
    #[must_use]
    pub fn clock_label(&self) -> String {
        format_clock(self.clock_secs)
    }

    #[must_use]
    pub fn review(&self) -> ReviewSummary {
        ReviewSummary::build(&self.questions, &self.answers)
    }

    #[must_use]
    pub fn palette(&self) -> Vec<PaletteEntry> {
        palette(&self.questions, &self.answers, self.cursor)
    }
}

impl QuizSession {
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let quiz = self.quiz();
        let timer = self.timer();
        SessionSnapshot {
            quiz_id: Some(self.quiz_id()),
            phase: self.phase(),
            title: quiz.map(|quiz| quiz.title().to_owned()).unwrap_or_default(),
            topic_name: quiz
                .and_then(|quiz| quiz.topic())
                .map(|topic| topic.name.clone()),
            questions: self.shared_questions().unwrap_or_default(),
            cursor: self.cursor().unwrap_or_default(),
            answers: self.answers().cloned().unwrap_or_default(),
            timer_mode: self.config().timer_mode(),
            clock_secs: timer.map(|timer| timer.display_secs()).unwrap_or_else(|| {
                match (self.config().timer_mode(), quiz) {
                    (TimerMode::Countdown, Some(quiz)) => quiz.duration_secs(),
                    _ => 0,
                }
            }),
            read_only: self.is_read_only(),
            proctored: self.is_proctored(),
            blocks_clipboard: self.blocks_clipboard(),
            violation: self.violation(),
            outcome: self.outcome().cloned(),
            load_error: self.load_error().map(str::to_owned),
            closed: !self.is_mounted(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use quiz_core::model::{AnswerOption, OptionId, Quiz, StudentId};

    use crate::exit::NoopExit;
    use crate::notify::TracingNotifier;
    use crate::quiz::config::SessionConfig;

    fn loaded() -> QuizSession {
        let mut session = QuizSession::new(
            QuizId::new(3),
            SessionConfig::new(StudentId::new(1)),
            Arc::new(TracingNotifier),
            Arc::new(NoopExit),
        );
        let questions = (1..=4)
            .map(|id| {
                Question::new(
                    QuestionId::new(id),
                    format!("Q{id}"),
                    vec![AnswerOption::new(OptionId::new(id), "yes")],
                )
            })
            .collect();
        session
            .apply_loaded(Quiz::new(QuizId::new(3), "Traits", Some(2)), questions)
            .unwrap();
        session
    }

    #[test]
    fn acknowledgement_screen_shows_the_full_budget() {
        let snapshot = loaded().snapshot();
        assert_eq!(snapshot.phase, SessionPhase::Acknowledging);
        assert_eq!(snapshot.clock_label(), "02:00");
        assert_eq!(snapshot.total(), 4);
        assert!(snapshot.blocks_clipboard);
    }

    #[test]
    fn progress_follows_answers() {
        let mut session = loaded();
        session.acknowledge().unwrap();
        session.select_answer(QuestionId::new(2), "yes").unwrap();
        session.jump_to(3).unwrap();

        let snapshot = session.snapshot();
        assert_eq!(snapshot.answered(), 1);
        assert_eq!(snapshot.progress_percent(), 25);
        assert!(snapshot.is_last());
        assert_eq!(snapshot.current_question().map(Question::id), Some(QuestionId::new(4)));
        assert_eq!(snapshot.review().first_unanswered(), Some(0));
    }
}
