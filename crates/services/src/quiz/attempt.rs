use std::collections::BTreeMap;

use quiz_core::model::{QuestionId, ViolationCause};

use super::timer::QuizTimer;

/// Mutable state of one attempt: answers, cursor, clock and violation flag.
///
/// Phase checks live in the controller; this type only keeps the cursor in
/// bounds and the answer map single-valued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptState {
    answers: BTreeMap<QuestionId, String>,
    cursor: usize,
    question_count: usize,
    timer: QuizTimer,
    violation: Option<ViolationCause>,
}

impl AttemptState {
    /// `question_count` must be non-zero; the controller validates quizzes before
    /// starting an attempt.
    #[must_use]
    pub fn new(question_count: usize, timer: QuizTimer) -> Self {
        Self {
            answers: BTreeMap::new(),
            cursor: 0,
            question_count,
            timer,
            violation: None,
        }
    }

    #[must_use]
    pub fn answers(&self) -> &BTreeMap<QuestionId, String> {
        &self.answers
    }

    #[must_use]
    pub fn answer_for(&self, question_id: QuestionId) -> Option<&str> {
        self.answers.get(&question_id).map(String::as_str)
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    /// Replaces any earlier selection for the question.
    pub fn record_answer(&mut self, question_id: QuestionId, answer_text: impl Into<String>) {
        self.answers.insert(question_id, answer_text.into());
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.question_count
    }

    #[must_use]
    pub fn at_last(&self) -> bool {
        self.cursor + 1 >= self.question_count
    }

    /// Returns `false` (and stays put) on the last question.
    pub fn step_forward(&mut self) -> bool {
        if self.at_last() {
            return false;
        }
        self.cursor += 1;
        true
    }

    /// Returns `false` (and stays put) on the first question.
    pub fn step_back(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }

    /// Out-of-range indexes are ignored.
    pub fn move_to(&mut self, index: usize) -> bool {
        if index >= self.question_count {
            return false;
        }
        self.cursor = index;
        true
    }

    #[must_use]
    pub fn timer(&self) -> &QuizTimer {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut QuizTimer {
        &mut self.timer
    }

    #[must_use]
    pub fn violation(&self) -> Option<ViolationCause> {
        self.violation
    }

    /// Records the first violation only. Returns whether this call set it.
    pub fn flag_violation(&mut self, cause: ViolationCause) -> bool {
        if self.violation.is_some() {
            return false;
        }
        self.violation = Some(cause);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(count: usize) -> AttemptState {
        AttemptState::new(count, QuizTimer::countdown(60, 30))
    }

    #[test]
    fn cursor_stays_in_bounds_for_any_walk() {
        let mut attempt = state(3);
        let moves: [i8; 12] = [1, 1, 1, 1, -1, -1, -1, -1, 5, 2, -1, 9];
        for step in moves {
            match step {
                1 => {
                    attempt.step_forward();
                }
                -1 => {
                    attempt.step_back();
                }
                index => {
                    attempt.move_to(usize::try_from(index).unwrap());
                }
            }
            assert!(attempt.cursor() < attempt.question_count());
        }
        assert_eq!(attempt.cursor(), 1);
    }

    #[test]
    fn selecting_again_overwrites() {
        let mut attempt = state(2);
        attempt.record_answer(QuestionId::new(1), "a");
        assert_eq!(attempt.answer_for(QuestionId::new(1)), Some("a"));
        attempt.record_answer(QuestionId::new(1), "b");
        assert_eq!(attempt.answer_for(QuestionId::new(1)), Some("b"));
        assert_eq!(attempt.answered_count(), 1);
    }

    #[test]
    fn violation_is_set_once() {
        let mut attempt = state(1);
        assert!(attempt.flag_violation(ViolationCause::TabSwitch));
        assert!(!attempt.flag_violation(ViolationCause::ScreenshotAttempt));
        assert_eq!(attempt.violation(), Some(ViolationCause::TabSwitch));
    }
}
