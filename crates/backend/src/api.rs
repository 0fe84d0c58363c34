use async_trait::async_trait;
use quiz_core::model::{
    AttemptPayload, AttemptResult, Question, QuestionOutcome, Quiz, QuizId,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by backend adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("not found")]
    NotFound,

    #[error("network error: {0}")]
    Network(String),

    #[error("server responded with status {0}")]
    Status(u16),

    #[error("could not decode response: {0}")]
    Decode(String),

    #[error("backend unavailable")]
    Unavailable,
}

/// Read-only access to quiz metadata and questions.
#[async_trait]
pub trait QuizCatalog: Send + Sync {
    /// Fetch quiz metadata (title, duration, topic, proctoring flag).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the quiz does not exist, or a transport error.
    async fn get_quiz(&self, id: QuizId) -> Result<Quiz, ApiError>;

    /// Fetch the ordered question list for a quiz.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the quiz does not exist, or a transport error.
    async fn get_questions(&self, id: QuizId) -> Result<Vec<Question>, ApiError>;
}

/// Accepts finished attempts and returns the graded result.
///
/// Callers must invoke this at most once per attempt.
#[async_trait]
pub trait AttemptSubmitter: Send + Sync {
    /// Submit an attempt for grading.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` when the request cannot be delivered or is rejected.
    async fn submit_attempt(
        &self,
        quiz_id: QuizId,
        payload: &AttemptPayload,
    ) -> Result<AttemptResult, ApiError>;
}

/// Simple in-memory backend for tests, demos and prototyping.
///
/// Grades submissions against the stored correct answers and records every
/// payload it receives.
#[derive(Clone, Default)]
pub struct InMemoryBackend {
    quizzes: Arc<Mutex<HashMap<QuizId, (Quiz, Vec<Question>)>>>,
    submissions: Arc<Mutex<Vec<(QuizId, AttemptPayload)>>>,
    failing_submits: Arc<Mutex<u32>>,
    offline: Arc<Mutex<bool>>,
}

impl InMemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store (or replace) a quiz together with its questions.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unavailable` if the internal lock is poisoned.
    pub fn insert_quiz(&self, quiz: Quiz, questions: Vec<Question>) -> Result<(), ApiError> {
        let mut guard = self.quizzes.lock().map_err(|_| ApiError::Unavailable)?;
        guard.insert(quiz.id(), (quiz, questions));
        Ok(())
    }

    /// Make the next `count` submissions fail with a network error.
    pub fn fail_next_submits(&self, count: u32) {
        if let Ok(mut guard) = self.failing_submits.lock() {
            *guard = count;
        }
    }

    /// While offline every call fails with a network error.
    pub fn set_offline(&self, offline: bool) {
        if let Ok(mut guard) = self.offline.lock() {
            *guard = offline;
        }
    }

    /// Every payload accepted so far, in arrival order.
    #[must_use]
    pub fn submissions(&self) -> Vec<(QuizId, AttemptPayload)> {
        self.submissions
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn submission_count(&self) -> usize {
        self.submissions.lock().map(|guard| guard.len()).unwrap_or(0)
    }

    fn ensure_online(&self) -> Result<(), ApiError> {
        let offline = *self.offline.lock().map_err(|_| ApiError::Unavailable)?;
        if offline {
            return Err(ApiError::Network("offline".into()));
        }
        Ok(())
    }

    fn take_submit_failure(&self) -> Result<bool, ApiError> {
        let mut guard = self
            .failing_submits
            .lock()
            .map_err(|_| ApiError::Unavailable)?;
        if *guard > 0 {
            *guard -= 1;
            return Ok(true);
        }
        Ok(false)
    }
}

fn grade(questions: &[Question], payload: &AttemptPayload) -> AttemptResult {
    let results: Vec<QuestionOutcome> = questions
        .iter()
        .map(|question| {
            let selected = payload.answer_for(question.id()).map(str::to_owned);
            let correct = match (question.correct_answer(), selected.as_deref()) {
                (Some(expected), Some(given)) => expected == given,
                _ => false,
            };
            QuestionOutcome {
                question_id: question.id(),
                correct,
                selected_answer: selected,
                correct_answer: question.correct_answer().map(str::to_owned),
            }
        })
        .collect();

    let total = u32::try_from(results.len()).unwrap_or(u32::MAX);
    let correct = u32::try_from(results.iter().filter(|outcome| outcome.correct).count())
        .unwrap_or(u32::MAX);
    let score = if total == 0 {
        0
    } else {
        correct.saturating_mul(100) / total
    };

    AttemptResult {
        score,
        total_questions: Some(total),
        correct_answers: Some(correct),
        passed: None,
        results,
    }
}

#[async_trait]
impl QuizCatalog for InMemoryBackend {
    async fn get_quiz(&self, id: QuizId) -> Result<Quiz, ApiError> {
        self.ensure_online()?;
        let guard = self.quizzes.lock().map_err(|_| ApiError::Unavailable)?;
        guard
            .get(&id)
            .map(|(quiz, _)| quiz.clone())
            .ok_or(ApiError::NotFound)
    }

    async fn get_questions(&self, id: QuizId) -> Result<Vec<Question>, ApiError> {
        self.ensure_online()?;
        let guard = self.quizzes.lock().map_err(|_| ApiError::Unavailable)?;
        guard
            .get(&id)
            .map(|(_, questions)| questions.clone())
            .ok_or(ApiError::NotFound)
    }
}

#[async_trait]
impl AttemptSubmitter for InMemoryBackend {
    async fn submit_attempt(
        &self,
        quiz_id: QuizId,
        payload: &AttemptPayload,
    ) -> Result<AttemptResult, ApiError> {
        self.ensure_online()?;
        if self.take_submit_failure()? {
            return Err(ApiError::Network("injected submit failure".into()));
        }

        let questions = {
            let guard = self.quizzes.lock().map_err(|_| ApiError::Unavailable)?;
            guard
                .get(&quiz_id)
                .map(|(_, questions)| questions.clone())
                .ok_or(ApiError::NotFound)?
        };

        let mut guard = self
            .submissions
            .lock()
            .map_err(|_| ApiError::Unavailable)?;
        guard.push((quiz_id, payload.clone()));
        Ok(grade(&questions, payload))
    }
}

/// Aggregates the backend contracts behind trait objects for easy swapping.
#[derive(Clone)]
pub struct Backend {
    pub catalog: Arc<dyn QuizCatalog>,
    pub attempts: Arc<dyn AttemptSubmitter>,
}

impl Backend {
    #[must_use]
    pub fn new(catalog: Arc<dyn QuizCatalog>, attempts: Arc<dyn AttemptSubmitter>) -> Self {
        Self { catalog, attempts }
    }

    #[must_use]
    pub fn in_memory(repo: &InMemoryBackend) -> Self {
        let catalog: Arc<dyn QuizCatalog> = Arc::new(repo.clone());
        let attempts: Arc<dyn AttemptSubmitter> = Arc::new(repo.clone());
        Self { catalog, attempts }
    }

    #[must_use]
    pub fn http(client: crate::http::HttpBackend) -> Self {
        let client = Arc::new(client);
        let catalog: Arc<dyn QuizCatalog> = client.clone();
        let attempts: Arc<dyn AttemptSubmitter> = client;
        Self { catalog, attempts }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{AnswerOption, OptionId, QuestionId, StudentId, SubmittedAnswer};

    fn seeded() -> InMemoryBackend {
        let repo = InMemoryBackend::new();
        let questions = vec![
            Question::new(
                QuestionId::new(1),
                "2 + 2?",
                vec![
                    AnswerOption::new(OptionId::new(1), "3"),
                    AnswerOption::new(OptionId::new(2), "4"),
                ],
            )
            .with_correct_answer("4"),
            Question::new(
                QuestionId::new(2),
                "Capital of France?",
                vec![
                    AnswerOption::new(OptionId::new(3), "Paris"),
                    AnswerOption::new(OptionId::new(4), "Rome"),
                ],
            )
            .with_correct_answer("Paris"),
        ];
        repo.insert_quiz(Quiz::new(QuizId::new(1), "Basics", Some(5)), questions)
            .unwrap();
        repo
    }

    fn payload(answers: &[(u64, &str)]) -> AttemptPayload {
        AttemptPayload {
            student_id: StudentId::new(1),
            topic_id: None,
            time_spent_secs: 10,
            answers: answers
                .iter()
                .map(|(id, text)| SubmittedAnswer {
                    question_id: QuestionId::new(*id),
                    answer_text: (*text).to_string(),
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn grades_against_stored_answers() {
        let repo = seeded();
        let result = repo
            .submit_attempt(QuizId::new(1), &payload(&[(1, "4")]))
            .await
            .unwrap();
        assert_eq!(result.score, 50);
        assert_eq!(result.correct_answers, Some(1));
        let missing = result.outcome_for(QuestionId::new(2)).unwrap();
        assert!(!missing.correct);
        assert_eq!(missing.selected_answer, None);
    }

    #[tokio::test]
    async fn unknown_quiz_is_not_found() {
        let repo = seeded();
        assert_eq!(
            repo.get_quiz(QuizId::new(99)).await.unwrap_err(),
            ApiError::NotFound
        );
    }

    #[tokio::test]
    async fn injected_failures_are_consumed() {
        let repo = seeded();
        repo.fail_next_submits(1);
        assert!(matches!(
            repo.submit_attempt(QuizId::new(1), &payload(&[])).await,
            Err(ApiError::Network(_))
        ));
        assert!(repo.submit_attempt(QuizId::new(1), &payload(&[])).await.is_ok());
        assert_eq!(repo.submission_count(), 1);
    }
}
