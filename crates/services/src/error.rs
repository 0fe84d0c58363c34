//! Shared error types for the services crate.

use thiserror::Error;

use backend::ApiError;
use quiz_core::model::{QuestionId, QuizError, ViolationCause};

use crate::quiz::SessionPhase;

/// Errors emitted by the quiz session controller.
///
/// Load failures end the session attempt; submit failures roll the attempt back
/// so the learner can try again. Forced submissions never fail validation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no quiz selected")]
    MissingQuizId,
    #[error("failed to load quiz: {0}")]
    LoadFailure(#[source] ApiError),
    #[error(transparent)]
    InvalidQuiz(#[from] QuizError),
    #[error("failed to submit attempt: {0}")]
    SubmitFailure(#[source] ApiError),
    #[error("cannot {action} while {phase}")]
    InvalidPhase {
        action: &'static str,
        phase: SessionPhase,
    },
    #[error("session is read-only")]
    ReadOnly,
    #[error("answers are locked after {0}")]
    Locked(ViolationCause),
    #[error("question {0} is not part of this quiz")]
    UnknownQuestion(QuestionId),
    #[error("{option:?} is not an option of question {question}")]
    UnknownOption {
        question: QuestionId,
        option: String,
    },
    #[error("session is no longer active")]
    Inactive,
}
