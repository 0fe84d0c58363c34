//! The "leave session" callback. The controller never owns routing.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc::UnboundedSender;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// "Back" from the result screen or an explicit quit.
    Back,
    /// "Finish" on the last question of a read-only preview.
    Finished,
    /// The quiz could not be loaded.
    LoadFailed,
}

pub trait SessionExit: Send + Sync {
    fn leave(&self, reason: ExitReason);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopExit;

impl SessionExit for NoopExit {
    fn leave(&self, _reason: ExitReason) {}
}

#[derive(Debug, Clone, Default)]
pub struct RecordingExit {
    exits: Arc<Mutex<Vec<ExitReason>>>,
}

impl RecordingExit {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn exits(&self) -> Vec<ExitReason> {
        self.exits
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl SessionExit for RecordingExit {
    fn leave(&self, reason: ExitReason) {
        if let Ok(mut guard) = self.exits.lock() {
            guard.push(reason);
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChannelExit {
    tx: UnboundedSender<ExitReason>,
}

impl ChannelExit {
    #[must_use]
    pub fn new(tx: UnboundedSender<ExitReason>) -> Self {
        Self { tx }
    }
}

impl SessionExit for ChannelExit {
    fn leave(&self, reason: ExitReason) {
        let _ = self.tx.send(reason);
    }
}
