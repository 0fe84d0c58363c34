use std::collections::HashSet;

use thiserror::Error;

use crate::model::ids::{CourseId, OptionId, QuestionId, QuizId, TopicId};

/// Duration applied when the backend omits one or reports zero minutes.
pub const DEFAULT_DURATION_MINUTES: u32 = 10;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("quiz has no questions")]
    NoQuestions,

    #[error("question {0} appears more than once")]
    DuplicateQuestion(QuestionId),

    #[error("question {question} lists option {option} more than once")]
    DuplicateOption {
        question: QuestionId,
        option: OptionId,
    },
}

//
// ─── QUIZ ──────────────────────────────────────────────────────────────────────
//

/// Topic a quiz is attached to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicRef {
    pub id: TopicId,
    pub name: String,
    pub course_id: Option<CourseId>,
}

/// Quiz metadata as fetched from the backend.
///
/// The question list is fetched separately; see [`Question`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quiz {
    id: QuizId,
    title: String,
    duration_minutes: u32,
    topic: Option<TopicRef>,
    course_id: Option<CourseId>,
    proctored: bool,
}

impl Quiz {
    /// Builds quiz metadata. A missing or zero duration falls back to
    /// [`DEFAULT_DURATION_MINUTES`]. Quizzes are proctored unless told otherwise.
    #[must_use]
    pub fn new(id: QuizId, title: impl Into<String>, duration_minutes: Option<u32>) -> Self {
        let duration_minutes = match duration_minutes {
            Some(minutes) if minutes > 0 => minutes,
            _ => DEFAULT_DURATION_MINUTES,
        };
        Self {
            id,
            title: title.into(),
            duration_minutes,
            topic: None,
            course_id: None,
            proctored: true,
        }
    }

    #[must_use]
    pub fn with_topic(mut self, topic: TopicRef) -> Self {
        self.topic = Some(topic);
        self
    }

    #[must_use]
    pub fn with_course(mut self, course_id: CourseId) -> Self {
        self.course_id = Some(course_id);
        self
    }

    #[must_use]
    pub fn with_proctored(mut self, proctored: bool) -> Self {
        self.proctored = proctored;
        self
    }

    #[must_use]
    pub fn id(&self) -> QuizId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    /// Time budget in seconds.
    #[must_use]
    pub fn duration_secs(&self) -> u32 {
        self.duration_minutes.saturating_mul(60)
    }

    #[must_use]
    pub fn topic(&self) -> Option<&TopicRef> {
        self.topic.as_ref()
    }

    /// Course this quiz belongs to, falling back to the topic's course.
    #[must_use]
    pub fn course_id(&self) -> Option<CourseId> {
        self.course_id
            .or_else(|| self.topic.as_ref().and_then(|topic| topic.course_id))
    }

    #[must_use]
    pub fn proctored(&self) -> bool {
        self.proctored
    }
}

//
// ─── QUESTIONS ─────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOption {
    pub id: OptionId,
    pub text: String,
}

impl AnswerOption {
    #[must_use]
    pub fn new(id: OptionId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }
}

/// A single-select question. Options keep the order the backend sent them in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    prompt: String,
    options: Vec<AnswerOption>,
    correct_answer: Option<String>,
}

impl Question {
    #[must_use]
    pub fn new(id: QuestionId, prompt: impl Into<String>, options: Vec<AnswerOption>) -> Self {
        Self {
            id,
            prompt: prompt.into(),
            options,
            correct_answer: None,
        }
    }

    /// Attaches the correct answer text. Only instructor views receive it.
    #[must_use]
    pub fn with_correct_answer(mut self, answer: impl Into<String>) -> Self {
        self.correct_answer = Some(answer.into());
        self
    }

    /// Drops the correct answer so it can never reach an active attempt.
    #[must_use]
    pub fn without_correct_answer(mut self) -> Self {
        self.correct_answer = None;
        self
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[AnswerOption] {
        &self.options
    }

    #[must_use]
    pub fn correct_answer(&self) -> Option<&str> {
        self.correct_answer.as_deref()
    }

    #[must_use]
    pub fn has_option_text(&self, text: &str) -> bool {
        self.options.iter().any(|option| option.text == text)
    }
}

/// Checks the invariants the quiz player relies on: at least one question,
/// unique question ids, and unique option ids within each question.
///
/// # Errors
///
/// Returns the first `QuizError` found.
pub fn validate_questions(questions: &[Question]) -> Result<(), QuizError> {
    if questions.is_empty() {
        return Err(QuizError::NoQuestions);
    }

    let mut seen = HashSet::with_capacity(questions.len());
    for question in questions {
        if !seen.insert(question.id()) {
            return Err(QuizError::DuplicateQuestion(question.id()));
        }
        let mut option_ids = HashSet::with_capacity(question.options().len());
        for option in question.options() {
            if !option_ids.insert(option.id) {
                return Err(QuizError::DuplicateOption {
                    question: question.id(),
                    option: option.id,
                });
            }
        }
    }
    Ok(())
}
