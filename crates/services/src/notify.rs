//! The notification surface the controller reports to.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc::UnboundedSender;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeKind {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub kind: NoticeKind,
}

/// Fire-and-forget user notifications (toasts).
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str, kind: NoticeKind);
}

/// Writes notices to the log. Default for headless use.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str, kind: NoticeKind) {
        match kind {
            NoticeKind::Error => tracing::error!(notice = message),
            NoticeKind::Warning => tracing::warn!(notice = message),
            NoticeKind::Info | NoticeKind::Success => tracing::info!(notice = message),
        }
    }
}

/// Keeps every notice in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    notices: Arc<Mutex<Vec<Notice>>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn count_of(&self, message: &str) -> usize {
        self.notices()
            .iter()
            .filter(|notice| notice.message == message)
            .count()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str, kind: NoticeKind) {
        if let Ok(mut guard) = self.notices.lock() {
            guard.push(Notice {
                message: message.to_owned(),
                kind,
            });
        }
    }
}

/// Forwards notices to a channel; the UI drains it into toasts.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: UnboundedSender<Notice>,
}

impl ChannelNotifier {
    #[must_use]
    pub fn new(tx: UnboundedSender<Notice>) -> Self {
        Self { tx }
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, message: &str, kind: NoticeKind) {
        // A closed receiver means the view is gone; nobody is left to tell.
        let _ = self.tx.send(Notice {
            message: message.to_owned(),
            kind,
        });
    }
}
