//! Proctored quiz sessions.

mod attempt;
mod config;
mod controller;
mod driver;
mod integrity;
mod phase;
mod review;
mod snapshot;
mod submission;
mod timer;

pub use attempt::AttemptState;
pub use config::{SessionConfig, VisibilityPolicy};
pub use controller::{
    INVALID_QUIZ_NOTICE, LOAD_FAILED_NOTICE, NavOutcome, OVERDUE_RESUBMIT_SECS, QuizSession,
    SUBMIT_FAILED_NOTICE, SUBMITTED_NOTICE, SignalResponse, low_water_notice,
};
pub use driver::{SessionCommand, SessionHandle, spawn_session};
pub use integrity::{
    BLOCKED_ACTION_NOTICE, BrowserSignal, IntegrityMonitor, IntegrityVerdict, InvalidChord,
    KeyChord, TAB_SWITCH_WARNING, violation_notice,
};
pub use phase::SessionPhase;
pub use review::{PaletteEntry, ReviewItem, ReviewSummary, palette, progress_percent};
pub use snapshot::SessionSnapshot;
pub use submission::{SubmitTicket, assemble_payload};
pub use timer::{DEFAULT_LOW_WATER_SECS, QuizTimer, TickOutcome, TimerMode, format_clock};
