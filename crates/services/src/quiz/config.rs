use quiz_core::model::{Quiz, StudentId, TopicId};

use super::integrity::KeyChord;
use super::timer::{DEFAULT_LOW_WATER_SECS, TimerMode};

/// What losing visibility does to a proctored attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisibilityPolicy {
    /// Notify and force submission.
    #[default]
    ForceSubmit,
    /// Notify only; the attempt continues.
    WarnOnly,
}

/// Parameters for one quiz-taking session.
///
/// One controller serves proctored exams, untimed practice and instructor
/// preview; the differences live here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    learner: StudentId,
    topic_override: Option<TopicId>,
    proctored: Option<bool>,
    timer_mode: TimerMode,
    read_only: bool,
    low_water_secs: u32,
    visibility_policy: VisibilityPolicy,
    capture_chords: Vec<KeyChord>,
}

impl SessionConfig {
    /// Countdown, proctoring taken from the quiz, force-submit on tab switch.
    #[must_use]
    pub fn new(learner: StudentId) -> Self {
        Self {
            learner,
            topic_override: None,
            proctored: None,
            timer_mode: TimerMode::Countdown,
            read_only: false,
            low_water_secs: DEFAULT_LOW_WATER_SECS,
            visibility_policy: VisibilityPolicy::ForceSubmit,
            capture_chords: vec![KeyChord::print_screen()],
        }
    }

    /// Untimed practice: counts up, warns on tab switch, never forces submission on time.
    #[must_use]
    pub fn practice(learner: StudentId) -> Self {
        Self::new(learner)
            .with_timer_mode(TimerMode::Elapsed)
            .with_visibility_policy(VisibilityPolicy::WarnOnly)
    }

    /// Instructor preview: read-only, no detectors, no submission.
    #[must_use]
    pub fn instructor(viewer: StudentId) -> Self {
        Self::new(viewer).with_read_only(true)
    }

    /// Overrides the topic reported in the submission; defaults to the quiz's topic.
    #[must_use]
    pub fn with_topic(mut self, topic: Option<TopicId>) -> Self {
        self.topic_override = topic;
        self
    }

    /// Forces proctoring on or off regardless of the quiz flag.
    #[must_use]
    pub fn with_proctored(mut self, proctored: bool) -> Self {
        self.proctored = Some(proctored);
        self
    }

    #[must_use]
    pub fn with_timer_mode(mut self, mode: TimerMode) -> Self {
        self.timer_mode = mode;
        self
    }

    #[must_use]
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    #[must_use]
    pub fn with_low_water_secs(mut self, secs: u32) -> Self {
        self.low_water_secs = secs;
        self
    }

    #[must_use]
    pub fn with_visibility_policy(mut self, policy: VisibilityPolicy) -> Self {
        self.visibility_policy = policy;
        self
    }

    #[must_use]
    pub fn with_capture_chords(mut self, chords: Vec<KeyChord>) -> Self {
        self.capture_chords = chords;
        self
    }

    #[must_use]
    pub fn learner(&self) -> StudentId {
        self.learner
    }

    #[must_use]
    pub fn read_only(&self) -> bool {
        self.read_only
    }

    #[must_use]
    pub fn low_water_secs(&self) -> u32 {
        self.low_water_secs
    }

    #[must_use]
    pub fn visibility_policy(&self) -> VisibilityPolicy {
        self.visibility_policy
    }

    #[must_use]
    pub fn capture_chords(&self) -> &[KeyChord] {
        &self.capture_chords
    }

    /// Read-only sessions always count up.
    #[must_use]
    pub fn timer_mode(&self) -> TimerMode {
        if self.read_only {
            TimerMode::Elapsed
        } else {
            self.timer_mode
        }
    }

    /// Whether detectors and acknowledgement apply to this quiz.
    #[must_use]
    pub fn proctoring_for(&self, quiz: &Quiz) -> bool {
        !self.read_only && self.proctored.unwrap_or_else(|| quiz.proctored())
    }

    /// Topic reported in the submission payload.
    #[must_use]
    pub fn topic_for(&self, quiz: &Quiz) -> Option<TopicId> {
        self.topic_override
            .or_else(|| quiz.topic().map(|topic| topic.id))
    }
}
