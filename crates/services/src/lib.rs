#![forbid(unsafe_code)]

pub mod error;
pub mod exit;
pub mod notify;
pub mod quiz;

pub use quiz_core::Clock;

pub use error::SessionError;
pub use exit::{ChannelExit, ExitReason, NoopExit, RecordingExit, SessionExit};
pub use notify::{ChannelNotifier, Notice, NoticeKind, Notifier, RecordingNotifier, TracingNotifier};
pub use quiz::{
    NavOutcome, QuizSession, SessionCommand, SessionConfig, SessionHandle, SessionPhase,
    SessionSnapshot, SubmitTicket, spawn_session,
};
