mod attempt;
mod ids;
mod quiz;

pub use ids::{CourseId, OptionId, ParseIdError, QuestionId, QuizId, StudentId, TopicId};

pub use attempt::{
    AttemptOutcome, AttemptPayload, AttemptResult, QuestionOutcome, SubmitCause,
    SubmittedAnswer, ViolationCause,
};
pub use quiz::{
    AnswerOption, DEFAULT_DURATION_MINUTES, Question, Quiz, QuizError, TopicRef,
    validate_questions,
};
