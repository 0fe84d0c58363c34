use std::fmt;

/// Lifecycle of one quiz-taking session.
///
/// `Submitting` and `Submitted` freeze the attempt: answers and cursor can no
/// longer change, the clock stops and integrity detectors go quiet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionPhase {
    #[default]
    Loading,
    Acknowledging,
    Answering,
    Reviewing,
    Submitting,
    Submitted,
}

impl SessionPhase {
    /// The learner is working on the attempt: the clock runs and detectors are armed.
    #[must_use]
    pub const fn is_live(self) -> bool {
        matches!(self, SessionPhase::Answering | SessionPhase::Reviewing)
    }

    #[must_use]
    pub const fn is_frozen(self) -> bool {
        matches!(self, SessionPhase::Submitting | SessionPhase::Submitted)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            SessionPhase::Loading => "loading",
            SessionPhase::Acknowledging => "acknowledging",
            SessionPhase::Answering => "answering",
            SessionPhase::Reviewing => "reviewing",
            SessionPhase::Submitting => "submitting",
            SessionPhase::Submitted => "submitted",
        }
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
