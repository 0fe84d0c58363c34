//! Browser-observable integrity signals and the detectors that judge them.

use std::str::FromStr;

use thiserror::Error;

use quiz_core::model::ViolationCause;

use super::config::VisibilityPolicy;
use super::phase::SessionPhase;

pub const BLOCKED_ACTION_NOTICE: &str = "Action not allowed during quiz!";
pub const TAB_SWITCH_WARNING: &str = "Tab switch detected!";

/// User-facing message for a forced submission.
#[must_use]
pub fn violation_notice(cause: ViolationCause) -> &'static str {
    match cause {
        ViolationCause::Timeout => "Time is up! Your answers have been submitted.",
        ViolationCause::TabSwitch => "Tab switch detected! Quiz auto-submitted.",
        ViolationCause::ScreenshotAttempt => "Screenshot attempt detected! Quiz auto-submitted.",
    }
}

/// A key plus the modifiers that must be held with it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyChord {
    pub key: String,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

impl KeyChord {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ctrl: false,
            shift: false,
            alt: false,
            meta: false,
        }
    }

    #[must_use]
    pub fn print_screen() -> Self {
        Self::new("PrintScreen")
    }

    #[must_use]
    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    #[must_use]
    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    #[must_use]
    pub fn with_alt(mut self) -> Self {
        self.alt = true;
        self
    }

    #[must_use]
    pub fn with_meta(mut self) -> Self {
        self.meta = true;
        self
    }

    /// A pressed chord matches when the key agrees and every modifier this
    /// chord requires is held. Extra modifiers are allowed.
    #[must_use]
    pub fn matches(&self, pressed: &KeyChord) -> bool {
        self.key.eq_ignore_ascii_case(&pressed.key)
            && (!self.ctrl || pressed.ctrl)
            && (!self.shift || pressed.shift)
            && (!self.alt || pressed.alt)
            && (!self.meta || pressed.meta)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid key chord: {0:?}")]
pub struct InvalidChord(pub String);

/// Parses `Ctrl+Shift+S` style chords. Modifier names are case-insensitive;
/// `Cmd` and `Super` stand for meta, `Option` for alt.
impl FromStr for KeyChord {
    type Err = InvalidChord;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidChord(raw.to_owned());
        let mut parts: Vec<&str> = raw.split('+').map(str::trim).collect();
        let key = parts.pop().filter(|key| !key.is_empty()).ok_or_else(invalid)?;
        let mut chord = KeyChord::new(key);
        for modifier in parts {
            chord = match modifier.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => chord.with_ctrl(),
                "shift" => chord.with_shift(),
                "alt" | "option" => chord.with_alt(),
                "meta" | "cmd" | "super" => chord.with_meta(),
                _ => return Err(invalid()),
            };
        }
        Ok(chord)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowserSignal {
    VisibilityHidden,
    VisibilityVisible,
    KeyUp(KeyChord),
    Copy,
    Cut,
    Paste,
    ContextMenu,
}

impl BrowserSignal {
    #[must_use]
    pub fn is_clipboard(&self) -> bool {
        matches!(
            self,
            BrowserSignal::Copy | BrowserSignal::Cut | BrowserSignal::Paste | BrowserSignal::ContextMenu
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrityVerdict {
    /// Nothing to do.
    Ignored,
    /// Suppress the browser default and tell the learner; no submission.
    Blocked,
    /// Tell the learner; no submission.
    Warned,
    /// Force submission.
    Violation(ViolationCause),
}

/// The three detectors of a proctored session.
///
/// Detectors hold no "already fired" state of their own: the caller passes the
/// current phase and violation flag on every signal, so a signal arriving after
/// submission began is judged against the frozen phase and ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrityMonitor {
    armed: bool,
    visibility_policy: VisibilityPolicy,
    capture_chords: Vec<KeyChord>,
}

impl IntegrityMonitor {
    #[must_use]
    pub fn disarmed() -> Self {
        Self {
            armed: false,
            visibility_policy: VisibilityPolicy::WarnOnly,
            capture_chords: Vec::new(),
        }
    }

    #[must_use]
    pub fn armed(visibility_policy: VisibilityPolicy, capture_chords: Vec<KeyChord>) -> Self {
        Self {
            armed: true,
            visibility_policy,
            capture_chords,
        }
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Whether clipboard and context-menu actions are suppressed in `phase`.
    #[must_use]
    pub fn blocks_clipboard(&self, phase: SessionPhase) -> bool {
        self.armed
            && matches!(
                phase,
                SessionPhase::Acknowledging
                    | SessionPhase::Answering
                    | SessionPhase::Reviewing
                    | SessionPhase::Submitting
            )
    }

    #[must_use]
    pub fn inspect(
        &self,
        signal: &BrowserSignal,
        phase: SessionPhase,
        already_violated: bool,
    ) -> IntegrityVerdict {
        if !self.armed {
            return IntegrityVerdict::Ignored;
        }
        if signal.is_clipboard() {
            return if self.blocks_clipboard(phase) {
                IntegrityVerdict::Blocked
            } else {
                IntegrityVerdict::Ignored
            };
        }
        if !phase.is_live() || already_violated {
            return IntegrityVerdict::Ignored;
        }
        match signal {
            BrowserSignal::VisibilityHidden => match self.visibility_policy {
                VisibilityPolicy::ForceSubmit => {
                    IntegrityVerdict::Violation(ViolationCause::TabSwitch)
                }
                VisibilityPolicy::WarnOnly => IntegrityVerdict::Warned,
            },
            BrowserSignal::KeyUp(pressed)
                if self.capture_chords.iter().any(|chord| chord.matches(pressed)) =>
            {
                IntegrityVerdict::Violation(ViolationCause::ScreenshotAttempt)
            }
            _ => IntegrityVerdict::Ignored,
        }
    }
}
