mod mapping;

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use quiz_core::model::{AttemptPayload, AttemptResult, Question, Quiz, QuizId};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::api::{ApiError, AttemptSubmitter, QuizCatalog};
use mapping::{QuestionDto, QuizDto};

pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";

/// Upper bound for a whole request, connect through body.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Clone, Debug)]
pub struct HttpConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout: Duration,
}

impl HttpConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|value| !value.trim().is_empty());
        self
    }

    /// Reads `LEARN_API_URL` and `LEARN_API_TOKEN`.
    #[must_use]
    pub fn from_env() -> Self {
        let base_url = env::var("LEARN_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into());
        Self::new(base_url).with_token(env::var("LEARN_API_TOKEN").ok())
    }
}

/// REST client for the quiz endpoints.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    config: HttpConfig,
}

impl HttpBackend {
    /// # Errors
    ///
    /// Returns `ApiError::Network` if the HTTP client cannot be initialised.
    pub fn new(config: HttpConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(transport_error)?;
        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path);
        tracing::debug!(%url, "GET");
        let response = self
            .authorize(self.client.get(url))
            .send()
            .await
            .map_err(transport_error)?;
        decode(response).await
    }
}

fn transport_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Network("request timed out".into())
    } else {
        ApiError::Network(err.to_string())
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Err(ApiError::NotFound);
    }
    if !status.is_success() {
        return Err(ApiError::Status(status.as_u16()));
    }
    let body = response
        .bytes()
        .await
        .map_err(transport_error)?;
    serde_json::from_slice(&body).map_err(|err| ApiError::Decode(err.to_string()))
}

#[async_trait]
impl QuizCatalog for HttpBackend {
    async fn get_quiz(&self, id: QuizId) -> Result<Quiz, ApiError> {
        let dto: QuizDto = self.get_json(&format!("quizzes/{id}")).await?;
        Ok(dto.into_quiz())
    }

    async fn get_questions(&self, id: QuizId) -> Result<Vec<Question>, ApiError> {
        let dtos: Vec<QuestionDto> = self.get_json(&format!("quizzes/{id}/questions")).await?;
        Ok(dtos.into_iter().map(QuestionDto::into_question).collect())
    }
}

#[async_trait]
impl AttemptSubmitter for HttpBackend {
    async fn submit_attempt(
        &self,
        quiz_id: QuizId,
        payload: &AttemptPayload,
    ) -> Result<AttemptResult, ApiError> {
        let url = self.url(&format!("attempts/quiz/{quiz_id}"));
        tracing::debug!(%url, answers = payload.answers.len(), "POST attempt");
        let response = self
            .authorize(self.client.post(url))
            .json(payload)
            .send()
            .await
            .map_err(transport_error)?;
        decode(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_paths_without_double_slash() {
        let backend = HttpBackend::new(HttpConfig::new("http://example.test/api/")).unwrap();
        assert_eq!(
            backend.url("quizzes/3/questions"),
            "http://example.test/api/quizzes/3/questions"
        );
    }

    #[test]
    fn blank_token_is_ignored() {
        let config = HttpConfig::new("http://example.test").with_token(Some("  ".into()));
        assert!(config.token.is_none());
    }

    #[tokio::test]
    async fn unanswered_submission_times_out_as_network_error() {
        // Accepts connections into the backlog but never replies.
        let silent = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = silent.local_addr().unwrap();
        let config = HttpConfig::new(format!("http://{addr}/api"))
            .with_timeout(Duration::from_millis(200));
        let backend = HttpBackend::new(config).unwrap();

        let payload = AttemptPayload {
            student_id: quiz_core::model::StudentId::new(1),
            topic_id: None,
            time_spent_secs: 12,
            answers: Vec::new(),
        };
        let err = backend
            .submit_attempt(QuizId::new(4), &payload)
            .await
            .unwrap_err();
        assert_eq!(err, ApiError::Network("request timed out".into()));
        drop(silent);
    }
}
