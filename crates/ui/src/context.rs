use std::sync::Arc;

use backend::Backend;
use quiz_core::model::QuizId;
use services::SessionConfig;

pub trait UiApp: Send + Sync {
    fn backend(&self) -> Backend;
    fn session_config(&self) -> SessionConfig;
    fn default_quiz(&self) -> Option<QuizId>;
}

#[derive(Clone)]
pub struct AppContext {
    backend: Backend,
    session_config: SessionConfig,
    default_quiz: Option<QuizId>,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            backend: app.backend(),
            session_config: app.session_config(),
            default_quiz: app.default_quiz(),
        }
    }

    #[must_use]
    pub fn backend(&self) -> Backend {
        self.backend.clone()
    }

    /// Template for every session started from this window.
    #[must_use]
    pub fn session_config(&self) -> SessionConfig {
        self.session_config.clone()
    }

    #[must_use]
    pub fn default_quiz(&self) -> Option<QuizId> {
        self.default_quiz
    }
}

// This context is provided by the application composition root (e.g. `crates/app`).

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
