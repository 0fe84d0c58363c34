/// Default low-water mark for the one-time "time is almost up" warning.
pub const DEFAULT_LOW_WATER_SECS: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimerMode {
    /// Fixed budget counting down to zero; expiry forces submission.
    #[default]
    Countdown,
    /// Counts up without limit. Used for instructor viewing and untimed practice.
    Elapsed,
}

/// What a single one-second tick did to the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Advanced,
    /// Remaining time just reached the low-water mark. Reported once.
    LowWater,
    /// Remaining time just reached zero. Reported once.
    Expired,
    /// Countdown already sits at zero; counts seconds past the deadline.
    Exhausted,
}

/// Attempt clock driven by external one-second ticks.
///
/// The clock never reads wall time; whoever owns it decides when a tick counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizTimer {
    mode: TimerMode,
    budget_secs: u32,
    remaining_secs: u32,
    elapsed_secs: u32,
    low_water_secs: u32,
    warned: bool,
    expired: bool,
    overdue_secs: u32,
}

impl QuizTimer {
    #[must_use]
    pub fn countdown(budget_secs: u32, low_water_secs: u32) -> Self {
        Self {
            mode: TimerMode::Countdown,
            budget_secs,
            remaining_secs: budget_secs,
            elapsed_secs: 0,
            low_water_secs,
            warned: false,
            expired: budget_secs == 0,
            overdue_secs: 0,
        }
    }

    #[must_use]
    pub fn elapsed() -> Self {
        Self {
            mode: TimerMode::Elapsed,
            budget_secs: 0,
            remaining_secs: 0,
            elapsed_secs: 0,
            low_water_secs: 0,
            warned: false,
            expired: false,
            overdue_secs: 0,
        }
    }

    #[must_use]
    pub fn new(mode: TimerMode, budget_secs: u32, low_water_secs: u32) -> Self {
        match mode {
            TimerMode::Countdown => Self::countdown(budget_secs, low_water_secs),
            TimerMode::Elapsed => Self::elapsed(),
        }
    }

    /// Advance the clock by one second.
    pub fn tick(&mut self) -> TickOutcome {
        match self.mode {
            TimerMode::Elapsed => {
                self.elapsed_secs = self.elapsed_secs.saturating_add(1);
                TickOutcome::Advanced
            }
            TimerMode::Countdown => {
                if self.expired {
                    self.overdue_secs = self.overdue_secs.saturating_add(1);
                    return TickOutcome::Exhausted;
                }
                self.remaining_secs = self.remaining_secs.saturating_sub(1);
                self.elapsed_secs = self.elapsed_secs.saturating_add(1);
                if self.remaining_secs == 0 {
                    self.expired = true;
                    return TickOutcome::Expired;
                }
                if !self.warned && self.remaining_secs <= self.low_water_secs {
                    self.warned = true;
                    return TickOutcome::LowWater;
                }
                TickOutcome::Advanced
            }
        }
    }

    #[must_use]
    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    /// Seconds left in countdown mode; `None` when counting up.
    #[must_use]
    pub fn remaining_secs(&self) -> Option<u32> {
        match self.mode {
            TimerMode::Countdown => Some(self.remaining_secs),
            TimerMode::Elapsed => None,
        }
    }

    #[must_use]
    pub fn elapsed_secs(&self) -> u32 {
        self.elapsed_secs
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expired
    }

    /// Ticks received after the countdown reached zero.
    #[must_use]
    pub fn overdue_secs(&self) -> u32 {
        self.overdue_secs
    }

    /// Time spent on the attempt as reported to the server.
    #[must_use]
    pub fn time_spent_secs(&self) -> u32 {
        match self.mode {
            TimerMode::Countdown => self.budget_secs - self.remaining_secs,
            TimerMode::Elapsed => self.elapsed_secs,
        }
    }

    /// The number a clock face should show: remaining time, or elapsed time.
    #[must_use]
    pub fn display_secs(&self) -> u32 {
        self.remaining_secs().unwrap_or(self.elapsed_secs)
    }
}

/// Formats seconds as `MM:SS`; minutes grow past two digits when needed.
#[must_use]
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
