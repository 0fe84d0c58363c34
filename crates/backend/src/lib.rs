#![forbid(unsafe_code)]

pub mod api;
pub mod http;

pub use api::{ApiError, AttemptSubmitter, Backend, InMemoryBackend, QuizCatalog};
pub use http::{HttpBackend, HttpConfig};
