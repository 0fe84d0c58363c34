use std::collections::BTreeMap;

use quiz_core::model::{
    AttemptPayload, Question, QuestionId, QuizId, StudentId, SubmitCause, SubmittedAnswer, TopicId,
};

use super::phase::SessionPhase;

/// Builds the submission body. Answers follow question order; unanswered
/// questions are left out entirely.
#[must_use]
pub fn assemble_payload(
    student_id: StudentId,
    topic_id: Option<TopicId>,
    questions: &[Question],
    answers: &BTreeMap<QuestionId, String>,
    time_spent_secs: u32,
) -> AttemptPayload {
    let answers = questions
        .iter()
        .filter_map(|question| {
            answers.get(&question.id()).map(|text| SubmittedAnswer {
                question_id: question.id(),
                answer_text: text.clone(),
            })
        })
        .collect();

    AttemptPayload {
        student_id,
        topic_id,
        time_spent_secs,
        answers,
    }
}

/// A frozen attempt waiting for its single network call.
///
/// Produced by `QuizSession::begin_submit`; hand it back to
/// `QuizSession::complete_submit` together with the outcome of the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitTicket {
    pub(crate) generation: u64,
    pub(crate) quiz_id: QuizId,
    pub(crate) cause: SubmitCause,
    pub(crate) payload: AttemptPayload,
    pub(crate) rollback: SessionPhase,
}

impl SubmitTicket {
    #[must_use]
    pub fn quiz_id(&self) -> QuizId {
        self.quiz_id
    }

    #[must_use]
    pub fn cause(&self) -> SubmitCause {
        self.cause
    }

    #[must_use]
    pub fn payload(&self) -> &AttemptPayload {
        &self.payload
    }

    /// Phase restored if the network call fails.
    #[must_use]
    pub fn rollback_phase(&self) -> SessionPhase {
        self.rollback
    }
}
