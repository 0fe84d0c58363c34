use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::ids::{QuestionId, StudentId, TopicId};

//
// ─── SUBMIT CAUSE ──────────────────────────────────────────────────────────────
//

/// Reason an attempt was submitted without the learner confirming it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViolationCause {
    Timeout,
    TabSwitch,
    ScreenshotAttempt,
}

impl ViolationCause {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ViolationCause::Timeout => "timeout",
            ViolationCause::TabSwitch => "tab-switch",
            ViolationCause::ScreenshotAttempt => "screenshot-attempt",
        }
    }
}

impl fmt::Display for ViolationCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubmitCause {
    /// The learner confirmed on the review screen.
    Manual,
    /// Timer expiry or an integrity violation; bypasses confirmation and validation.
    Forced(ViolationCause),
}

impl SubmitCause {
    #[must_use]
    pub fn is_forced(self) -> bool {
        matches!(self, SubmitCause::Forced(_))
    }

    #[must_use]
    pub fn violation(self) -> Option<ViolationCause> {
        match self {
            SubmitCause::Manual => None,
            SubmitCause::Forced(cause) => Some(cause),
        }
    }
}

//
// ─── SUBMISSION PAYLOAD ────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedAnswer {
    pub question_id: QuestionId,
    pub answer_text: String,
}

/// Body posted to the attempt endpoint.
///
/// Unanswered questions are absent from `answers`; the server infers
/// "unanswered" from that absence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptPayload {
    pub student_id: StudentId,
    pub topic_id: Option<TopicId>,
    #[serde(rename = "timeSpent")]
    pub time_spent_secs: u32,
    pub answers: Vec<SubmittedAnswer>,
}

impl AttemptPayload {
    #[must_use]
    pub fn answer_for(&self, question_id: QuestionId) -> Option<&str> {
        self.answers
            .iter()
            .find(|answer| answer.question_id == question_id)
            .map(|answer| answer.answer_text.as_str())
    }
}

//
// ─── RESULT ────────────────────────────────────────────────────────────────────
//

/// Per-question correctness, when the server reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionOutcome {
    pub question_id: QuestionId,
    pub correct: bool,
    #[serde(default)]
    pub selected_answer: Option<String>,
    #[serde(default)]
    pub correct_answer: Option<String>,
}

/// Graded result returned by the server for one attempt.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptResult {
    pub score: u32,
    #[serde(default)]
    pub total_questions: Option<u32>,
    #[serde(default)]
    pub correct_answers: Option<u32>,
    #[serde(default)]
    pub passed: Option<bool>,
    #[serde(default)]
    pub results: Vec<QuestionOutcome>,
}

impl AttemptResult {
    #[must_use]
    pub fn outcome_for(&self, question_id: QuestionId) -> Option<&QuestionOutcome> {
        self.results
            .iter()
            .find(|outcome| outcome.question_id == question_id)
    }
}

/// Terminal artifact of a submitted attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptOutcome {
    pub result: AttemptResult,
    pub cause: SubmitCause,
    pub time_spent_secs: u32,
    pub answered: usize,
    pub started_at: DateTime<Utc>,
    pub submitted_at: DateTime<Utc>,
}
