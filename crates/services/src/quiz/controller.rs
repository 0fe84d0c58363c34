use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use backend::{ApiError, AttemptSubmitter, QuizCatalog};
use quiz_core::Clock;
use quiz_core::model::{
    AttemptOutcome, AttemptResult, Question, QuestionId, Quiz, QuizId, SubmitCause,
    ViolationCause, validate_questions,
};

use crate::error::SessionError;
use crate::exit::{ExitReason, SessionExit};
use crate::notify::{NoticeKind, Notifier};

use super::attempt::AttemptState;
use super::config::SessionConfig;
use super::integrity::{
    BLOCKED_ACTION_NOTICE, BrowserSignal, IntegrityMonitor, IntegrityVerdict, TAB_SWITCH_WARNING,
    violation_notice,
};
use super::phase::SessionPhase;
use super::review::{PaletteEntry, ReviewSummary, palette};
use super::submission::{SubmitTicket, assemble_payload};
use super::timer::{QuizTimer, TickOutcome};

pub const LOAD_FAILED_NOTICE: &str = "Failed to load quiz";
pub const INVALID_QUIZ_NOTICE: &str = "Invalid quiz";
pub const SUBMITTED_NOTICE: &str = "Quiz submitted";
pub const SUBMIT_FAILED_NOTICE: &str = "Submit failed. Your answers are kept, please try again.";

/// How often an overdue attempt re-sends its forced submission.
pub const OVERDUE_RESUBMIT_SECS: u32 = 10;

#[must_use]
pub fn low_water_notice(remaining_secs: u32) -> String {
    format!("Only {remaining_secs} seconds left! Your answers will be auto-submitted.")
}

/// Result of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    Moved,
    /// Already at the edge, or the target was out of range.
    Unchanged,
    EnteredReview,
    /// Read-only walk-through reached its end; the session has exited.
    Finished,
}

/// What the caller should do with a browser event.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SignalResponse {
    /// Suppress the browser's default action.
    pub prevent_default: bool,
    /// A forced submission to perform.
    pub ticket: Option<SubmitTicket>,
}

#[derive(Debug, Clone)]
struct LoadedQuiz {
    quiz: Quiz,
    questions: Arc<[Question]>,
}

/// Controller for one quiz session.
///
/// The phase is the single source of truth: every input (learner actions, timer
/// ticks, browser signals, network completions) is judged against it, so inputs
/// that arrive after the session froze or was torn down are no-ops.
///
/// The controller never performs I/O on its own except through [`Self::load`]
/// and [`Self::submit`]; everything else is synchronous so a driver can feed it
/// from a single task.
pub struct QuizSession {
    quiz_id: QuizId,
    config: SessionConfig,
    clock: Clock,
    notifier: Arc<dyn Notifier>,
    exit: Arc<dyn SessionExit>,
    phase: SessionPhase,
    loaded: Option<LoadedQuiz>,
    attempt: Option<AttemptState>,
    monitor: IntegrityMonitor,
    acknowledged: bool,
    generation: u64,
    mounted: bool,
    started_at: Option<DateTime<Utc>>,
    outcome: Option<AttemptOutcome>,
    load_error: Option<String>,
}

impl QuizSession {
    #[must_use]
    pub fn new(
        quiz_id: QuizId,
        config: SessionConfig,
        notifier: Arc<dyn Notifier>,
        exit: Arc<dyn SessionExit>,
    ) -> Self {
        Self {
            quiz_id,
            config,
            clock: Clock::default(),
            notifier,
            exit,
            phase: SessionPhase::Loading,
            loaded: None,
            attempt: None,
            monitor: IntegrityMonitor::disarmed(),
            acknowledged: false,
            generation: 0,
            mounted: true,
            started_at: None,
            outcome: None,
            load_error: None,
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    //
    // ─── LOADING ───────────────────────────────────────────────────────────────
    //

    /// Fetches quiz metadata and questions, then enters the first attempt.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::MissingQuizId` for the unset id `0`,
    /// `SessionError::LoadFailure` if either fetch fails and
    /// `SessionError::InvalidQuiz` if the question set is unusable.
    pub async fn load(&mut self, catalog: &dyn QuizCatalog) -> Result<(), SessionError> {
        self.ensure_mounted()?;
        self.ensure_phase("load the quiz", SessionPhase::Loading)?;
        if self.quiz_id.value() == 0 {
            let err = SessionError::MissingQuizId;
            tracing::warn!("no quiz id to load");
            self.load_error = Some(err.to_string());
            self.notifier.notify(INVALID_QUIZ_NOTICE, NoticeKind::Error);
            return Err(err);
        }

        let quiz_id = self.quiz_id;
        let fetched = async {
            let quiz = catalog.get_quiz(quiz_id).await?;
            let questions = catalog.get_questions(quiz_id).await?;
            Ok::<_, ApiError>((quiz, questions))
        }
        .await;

        match fetched {
            Ok((quiz, questions)) => self.apply_loaded(quiz, questions),
            Err(err) => {
                tracing::warn!(quiz_id = %self.quiz_id, error = %err, "quiz load failed");
                self.load_error = Some(err.to_string());
                self.notifier.notify(LOAD_FAILED_NOTICE, NoticeKind::Error);
                Err(SessionError::LoadFailure(err))
            }
        }
    }

    /// Installs an already fetched quiz.
    ///
    /// Correct answers are stripped unless the session is read-only.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidQuiz` when the question set is empty or
    /// contains duplicates.
    pub fn apply_loaded(&mut self, quiz: Quiz, questions: Vec<Question>) -> Result<(), SessionError> {
        self.ensure_mounted()?;
        self.ensure_phase("load the quiz", SessionPhase::Loading)?;

        if let Err(err) = validate_questions(&questions) {
            tracing::warn!(quiz_id = %self.quiz_id, error = %err, "quiz rejected");
            self.load_error = Some(err.to_string());
            self.notifier.notify(LOAD_FAILED_NOTICE, NoticeKind::Error);
            return Err(err.into());
        }

        let questions: Arc<[Question]> = if self.config.read_only() {
            questions.into()
        } else {
            questions
                .into_iter()
                .map(Question::without_correct_answer)
                .collect()
        };

        self.monitor = if self.config.proctoring_for(&quiz) {
            IntegrityMonitor::armed(
                self.config.visibility_policy(),
                self.config.capture_chords().to_vec(),
            )
        } else {
            IntegrityMonitor::disarmed()
        };
        tracing::info!(
            quiz_id = %self.quiz_id,
            questions = questions.len(),
            course_id = ?quiz.course_id(),
            proctored = self.monitor.is_armed(),
            read_only = self.config.read_only(),
            "quiz loaded"
        );
        self.loaded = Some(LoadedQuiz { quiz, questions });
        self.load_error = None;
        self.enter_fresh_attempt();
        Ok(())
    }

    /// Starts the timed attempt once the learner accepted the proctoring rules.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidPhase` outside of the acknowledgement step.
    pub fn acknowledge(&mut self) -> Result<(), SessionError> {
        self.ensure_mounted()?;
        self.ensure_phase("acknowledge", SessionPhase::Acknowledging)?;
        self.acknowledged = true;
        self.start_attempt();
        Ok(())
    }

    fn enter_fresh_attempt(&mut self) {
        self.attempt = None;
        self.outcome = None;
        self.started_at = None;
        if self.monitor.is_armed() && !self.acknowledged {
            self.phase = SessionPhase::Acknowledging;
        } else {
            self.start_attempt();
        }
    }

    fn start_attempt(&mut self) {
        let Some(loaded) = &self.loaded else {
            return;
        };
        let timer = QuizTimer::new(
            self.config.timer_mode(),
            loaded.quiz.duration_secs(),
            self.config.low_water_secs(),
        );
        self.attempt = Some(AttemptState::new(loaded.questions.len(), timer));
        self.started_at = Some(self.clock.now());
        self.phase = SessionPhase::Answering;
        tracing::debug!(quiz_id = %self.quiz_id, generation = self.generation, "attempt started");
    }

    //
    // ─── ANSWERING ─────────────────────────────────────────────────────────────
    //

    /// Records `option_text` as the answer to `question_id`, replacing any
    /// earlier choice.
    ///
    /// # Errors
    ///
    /// Rejects selections in read-only sessions, outside of the answering
    /// phase, and for questions or options that are not part of the quiz.
    pub fn select_answer(
        &mut self,
        question_id: QuestionId,
        option_text: &str,
    ) -> Result<(), SessionError> {
        self.ensure_mounted()?;
        if self.config.read_only() {
            return Err(SessionError::ReadOnly);
        }
        self.ensure_unlocked()?;
        self.ensure_phase("select an answer", SessionPhase::Answering)?;

        let (Some(loaded), Some(attempt)) = (self.loaded.as_ref(), self.attempt.as_mut()) else {
            return Err(SessionError::Inactive);
        };
        let question = loaded
            .questions
            .iter()
            .find(|question| question.id() == question_id)
            .ok_or(SessionError::UnknownQuestion(question_id))?;
        if !question.has_option_text(option_text) {
            return Err(SessionError::UnknownOption {
                question: question_id,
                option: option_text.to_owned(),
            });
        }
        attempt.record_answer(question_id, option_text);
        Ok(())
    }

    /// Moves to the next question. Past the last question this opens the
    /// review screen, or ends a read-only walk-through.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidPhase` outside of the answering phase.
    pub fn next(&mut self) -> Result<NavOutcome, SessionError> {
        self.ensure_mounted()?;
        self.ensure_phase("go to the next question", SessionPhase::Answering)?;
        let read_only = self.config.read_only();
        let attempt = self.attempt_mut()?;
        if attempt.step_forward() {
            return Ok(NavOutcome::Moved);
        }
        if read_only {
            self.leave(ExitReason::Finished);
            return Ok(NavOutcome::Finished);
        }
        self.phase = SessionPhase::Reviewing;
        Ok(NavOutcome::EnteredReview)
    }

    /// # Errors
    ///
    /// Returns `SessionError::InvalidPhase` outside of the answering phase.
    pub fn prev(&mut self) -> Result<NavOutcome, SessionError> {
        self.ensure_mounted()?;
        self.ensure_phase("go to the previous question", SessionPhase::Answering)?;
        let moved = self.attempt_mut()?.step_back();
        Ok(if moved {
            NavOutcome::Moved
        } else {
            NavOutcome::Unchanged
        })
    }

    /// Jumps to the question at `index`, leaving the review screen if needed.
    /// Out-of-range targets are ignored.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidPhase` unless answering or reviewing, and
    /// `SessionError::Locked` once a forced submission has frozen the answers.
    pub fn jump_to(&mut self, index: usize) -> Result<NavOutcome, SessionError> {
        self.ensure_mounted()?;
        self.ensure_unlocked()?;
        if !matches!(self.phase, SessionPhase::Answering | SessionPhase::Reviewing) {
            return Err(self.invalid("jump to a question"));
        }
        if !self.attempt_mut()?.move_to(index) {
            return Ok(NavOutcome::Unchanged);
        }
        self.phase = SessionPhase::Answering;
        Ok(NavOutcome::Moved)
    }

    /// # Errors
    ///
    /// Read-only sessions have no review screen.
    pub fn open_review(&mut self) -> Result<(), SessionError> {
        self.ensure_mounted()?;
        if self.config.read_only() {
            return Err(SessionError::ReadOnly);
        }
        self.ensure_phase("open the review", SessionPhase::Answering)?;
        self.phase = SessionPhase::Reviewing;
        Ok(())
    }

    /// Returns to the question the learner was on.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidPhase` unless reviewing, and
    /// `SessionError::Locked` once a forced submission has frozen the answers.
    pub fn close_review(&mut self) -> Result<(), SessionError> {
        self.ensure_mounted()?;
        self.ensure_unlocked()?;
        self.ensure_phase("close the review", SessionPhase::Reviewing)?;
        self.phase = SessionPhase::Answering;
        Ok(())
    }

    //
    // ─── TIMER AND INTEGRITY ───────────────────────────────────────────────────
    //

    /// Advances the attempt clock by one second.
    ///
    /// Returns a ticket when the countdown just expired, and again every
    /// [`OVERDUE_RESUBMIT_SECS`] while an expired attempt is back in a live
    /// phase after its submission failed.
    pub fn on_tick(&mut self) -> Option<SubmitTicket> {
        if !self.mounted || !self.phase.is_live() {
            return None;
        }
        let timer = self.attempt.as_mut()?.timer_mut();
        let outcome = timer.tick();
        match outcome {
            TickOutcome::Advanced => None,
            TickOutcome::Exhausted => {
                let due = timer.is_expired() && timer.overdue_secs() % OVERDUE_RESUBMIT_SECS == 0;
                if !due {
                    return None;
                }
                tracing::info!(quiz_id = %self.quiz_id, "re-sending overdue attempt");
                self.begin_submit(SubmitCause::Forced(ViolationCause::Timeout))
            }
            TickOutcome::LowWater => {
                let remaining = self
                    .attempt
                    .as_ref()
                    .and_then(|attempt| attempt.timer().remaining_secs())
                    .unwrap_or_default();
                self.notifier
                    .notify(&low_water_notice(remaining), NoticeKind::Warning);
                None
            }
            TickOutcome::Expired => self.force_submit(ViolationCause::Timeout),
        }
    }

    /// Judges a browser event against the current phase.
    pub fn on_signal(&mut self, signal: &BrowserSignal) -> SignalResponse {
        if !self.mounted {
            return SignalResponse::default();
        }
        let already_violated = self
            .attempt
            .as_ref()
            .and_then(AttemptState::violation)
            .is_some();
        match self.monitor.inspect(signal, self.phase, already_violated) {
            IntegrityVerdict::Ignored => SignalResponse::default(),
            IntegrityVerdict::Blocked => {
                self.notifier
                    .notify(BLOCKED_ACTION_NOTICE, NoticeKind::Error);
                SignalResponse {
                    prevent_default: true,
                    ticket: None,
                }
            }
            IntegrityVerdict::Warned => {
                self.notifier.notify(TAB_SWITCH_WARNING, NoticeKind::Warning);
                SignalResponse::default()
            }
            IntegrityVerdict::Violation(cause) => SignalResponse {
                prevent_default: false,
                ticket: self.force_submit(cause),
            },
        }
    }

    fn force_submit(&mut self, cause: ViolationCause) -> Option<SubmitTicket> {
        if self.config.read_only() || !self.phase.is_live() {
            return None;
        }
        self.attempt.as_mut()?.flag_violation(cause);
        tracing::warn!(quiz_id = %self.quiz_id, cause = %cause, "forcing submission");
        self.notifier
            .notify(violation_notice(cause), NoticeKind::Error);
        self.begin_submit(SubmitCause::Forced(cause))
    }

    //
    // ─── SUBMISSION ────────────────────────────────────────────────────────────
    //

    /// Freezes the attempt and produces the single submission to send.
    ///
    /// Manual submission is only accepted from the review screen; forced
    /// submission from any live phase. Everything else, including a second
    /// request while one is in flight, yields `None`.
    pub fn begin_submit(&mut self, cause: SubmitCause) -> Option<SubmitTicket> {
        if !self.mounted || self.config.read_only() {
            return None;
        }
        let allowed = match cause {
            SubmitCause::Manual => self.phase == SessionPhase::Reviewing,
            SubmitCause::Forced(_) => self.phase.is_live(),
        };
        // A locked attempt is still a forced one, whoever presses submit.
        let cause = match (cause, self.locked_by()) {
            (SubmitCause::Manual, Some(first)) => SubmitCause::Forced(first),
            _ => cause,
        };
        if !allowed {
            tracing::debug!(phase = %self.phase, "submission ignored");
            return None;
        }
        let loaded = self.loaded.as_ref()?;
        let attempt = self.attempt.as_ref()?;
        let payload = assemble_payload(
            self.config.learner(),
            self.config.topic_for(&loaded.quiz),
            &loaded.questions,
            attempt.answers(),
            attempt.timer().time_spent_secs(),
        );
        let ticket = SubmitTicket {
            generation: self.generation,
            quiz_id: self.quiz_id,
            cause,
            payload,
            rollback: self.phase,
        };
        self.phase = SessionPhase::Submitting;
        tracing::info!(
            quiz_id = %self.quiz_id,
            answered = ticket.payload.answers.len(),
            time_spent = ticket.payload.time_spent_secs,
            forced = cause.is_forced(),
            "submitting attempt"
        );
        Some(ticket)
    }

    /// Applies the outcome of a ticket's network call.
    ///
    /// Results for an older attempt or a torn-down session are dropped.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Inactive` for dropped results and
    /// `SessionError::SubmitFailure` when the call failed. A manual attempt
    /// then returns to the phase it was submitted from; a forced one waits,
    /// locked, on the review screen.
    pub fn complete_submit(
        &mut self,
        ticket: SubmitTicket,
        result: Result<AttemptResult, ApiError>,
    ) -> Result<(), SessionError> {
        if !self.mounted
            || ticket.generation != self.generation
            || self.phase != SessionPhase::Submitting
        {
            tracing::debug!(quiz_id = %self.quiz_id, "stale submission result dropped");
            return Err(SessionError::Inactive);
        }

        match result {
            Ok(result) => {
                let submitted_at = self.clock.now();
                tracing::info!(quiz_id = %self.quiz_id, score = result.score, "attempt submitted");
                self.outcome = Some(AttemptOutcome {
                    result,
                    cause: ticket.cause,
                    time_spent_secs: ticket.payload.time_spent_secs,
                    answered: ticket.payload.answers.len(),
                    started_at: self.started_at.unwrap_or(submitted_at),
                    submitted_at,
                });
                self.phase = SessionPhase::Submitted;
                if !ticket.cause.is_forced() {
                    self.notifier.notify(SUBMITTED_NOTICE, NoticeKind::Success);
                }
                Ok(())
            }
            Err(err) => {
                tracing::warn!(quiz_id = %self.quiz_id, error = %err, "attempt submission failed");
                self.phase = if ticket.cause.is_forced() {
                    SessionPhase::Reviewing
                } else {
                    ticket.rollback
                };
                self.notifier
                    .notify(SUBMIT_FAILED_NOTICE, NoticeKind::Error);
                Err(SessionError::SubmitFailure(err))
            }
        }
    }

    /// Sends a ticket and applies the result.
    ///
    /// # Errors
    ///
    /// See [`Self::complete_submit`].
    pub async fn send(
        &mut self,
        ticket: SubmitTicket,
        submitter: &dyn AttemptSubmitter,
    ) -> Result<(), SessionError> {
        let result = submitter
            .submit_attempt(ticket.quiz_id(), ticket.payload())
            .await;
        self.complete_submit(ticket, result)
    }

    /// Manual submission from the review screen.
    ///
    /// Returns `Ok(false)` when there was nothing to submit.
    ///
    /// # Errors
    ///
    /// See [`Self::complete_submit`].
    pub async fn submit(&mut self, submitter: &dyn AttemptSubmitter) -> Result<bool, SessionError> {
        let Some(ticket) = self.begin_submit(SubmitCause::Manual) else {
            return Ok(false);
        };
        self.send(ticket, submitter).await?;
        Ok(true)
    }

    //
    // ─── AFTER SUBMISSION ──────────────────────────────────────────────────────
    //

    /// Starts a fresh attempt on the same questions.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidPhase` unless the attempt was submitted.
    pub fn retry(&mut self) -> Result<(), SessionError> {
        self.ensure_mounted()?;
        self.ensure_phase("retry", SessionPhase::Submitted)?;
        self.generation += 1;
        self.acknowledged = false;
        tracing::info!(quiz_id = %self.quiz_id, generation = self.generation, "retrying quiz");
        self.enter_fresh_attempt();
        Ok(())
    }

    /// Leaves the quiz from any phase.
    pub fn back(&mut self) {
        if !self.mounted {
            return;
        }
        let reason = if self.phase == SessionPhase::Loading && self.load_error.is_some() {
            ExitReason::LoadFailed
        } else {
            ExitReason::Back
        };
        self.leave(reason);
    }

    /// Detaches the session. Nothing reaches it afterwards.
    pub fn teardown(&mut self) {
        if self.mounted {
            tracing::debug!(quiz_id = %self.quiz_id, phase = %self.phase, "session torn down");
        }
        self.mounted = false;
    }

    fn leave(&mut self, reason: ExitReason) {
        self.teardown();
        self.exit.leave(reason);
    }

    //
    // ─── ACCESSORS ─────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn quiz_id(&self) -> QuizId {
        self.quiz_id
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.config.read_only()
    }

    #[must_use]
    pub fn is_proctored(&self) -> bool {
        self.monitor.is_armed()
    }

    #[must_use]
    pub fn quiz(&self) -> Option<&Quiz> {
        self.loaded.as_ref().map(|loaded| &loaded.quiz)
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        self.loaded
            .as_ref()
            .map(|loaded| &loaded.questions[..])
            .unwrap_or_default()
    }

    pub(crate) fn shared_questions(&self) -> Option<Arc<[Question]>> {
        self.loaded.as_ref().map(|loaded| Arc::clone(&loaded.questions))
    }

    #[must_use]
    pub fn cursor(&self) -> Option<usize> {
        self.attempt.as_ref().map(AttemptState::cursor)
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions().get(self.cursor()?)
    }

    #[must_use]
    pub fn answer_for(&self, question_id: QuestionId) -> Option<&str> {
        self.attempt.as_ref()?.answer_for(question_id)
    }

    #[must_use]
    pub fn answers(&self) -> Option<&BTreeMap<QuestionId, String>> {
        self.attempt.as_ref().map(AttemptState::answers)
    }

    #[must_use]
    pub fn timer(&self) -> Option<&QuizTimer> {
        self.attempt.as_ref().map(AttemptState::timer)
    }

    #[must_use]
    pub fn violation(&self) -> Option<ViolationCause> {
        self.attempt.as_ref().and_then(AttemptState::violation)
    }

    /// The violation that froze the answers, if any.
    #[must_use]
    pub fn locked_by(&self) -> Option<ViolationCause> {
        self.violation()
    }

    #[must_use]
    pub fn outcome(&self) -> Option<&AttemptOutcome> {
        self.outcome.as_ref()
    }

    #[must_use]
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    #[must_use]
    pub fn blocks_clipboard(&self) -> bool {
        self.mounted && self.monitor.blocks_clipboard(self.phase)
    }

    #[must_use]
    pub fn review_summary(&self) -> ReviewSummary {
        match self.answers() {
            Some(answers) => ReviewSummary::build(self.questions(), answers),
            None => ReviewSummary::default(),
        }
    }

    #[must_use]
    pub fn palette(&self) -> Vec<PaletteEntry> {
        match (self.answers(), self.cursor()) {
            (Some(answers), Some(cursor)) => palette(self.questions(), answers, cursor),
            _ => Vec::new(),
        }
    }

    //
    // ─── GUARDS ────────────────────────────────────────────────────────────────
    //

    fn ensure_mounted(&self) -> Result<(), SessionError> {
        if self.mounted {
            Ok(())
        } else {
            Err(SessionError::Inactive)
        }
    }

    fn ensure_unlocked(&self) -> Result<(), SessionError> {
        match self.locked_by() {
            Some(cause) => Err(SessionError::Locked(cause)),
            None => Ok(()),
        }
    }

    fn ensure_phase(
        &self,
        action: &'static str,
        expected: SessionPhase,
    ) -> Result<(), SessionError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(self.invalid(action))
        }
    }

    fn invalid(&self, action: &'static str) -> SessionError {
        SessionError::InvalidPhase {
            action,
            phase: self.phase,
        }
    }

    fn attempt_mut(&mut self) -> Result<&mut AttemptState, SessionError> {
        self.attempt.as_mut().ok_or(SessionError::Inactive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use quiz_core::model::{AnswerOption, OptionId, StudentId};
    use quiz_core::time::fixed_clock;

    use crate::exit::RecordingExit;
    use crate::notify::RecordingNotifier;
    use crate::quiz::integrity::KeyChord;

    fn question(id: u64) -> Question {
        Question::new(
            QuestionId::new(id),
            format!("Question {id}"),
            vec![
                AnswerOption::new(OptionId::new(id * 10 + 1), "A"),
                AnswerOption::new(OptionId::new(id * 10 + 2), "B"),
            ],
        )
        .with_correct_answer("A")
    }

    fn quiz(minutes: u32) -> Quiz {
        Quiz::new(QuizId::new(7), "Ownership", Some(minutes))
    }

    fn session(config: SessionConfig) -> (QuizSession, RecordingNotifier, RecordingExit) {
        let notifier = RecordingNotifier::new();
        let exit = RecordingExit::new();
        let session = QuizSession::new(
            QuizId::new(7),
            config,
            Arc::new(notifier.clone()),
            Arc::new(exit.clone()),
        )
        .with_clock(fixed_clock());
        (session, notifier, exit)
    }

    fn answering() -> (QuizSession, RecordingNotifier, RecordingExit) {
        let (mut session, notifier, exit) = session(SessionConfig::new(StudentId::new(1)));
        session
            .apply_loaded(quiz(10), vec![question(1), question(2), question(3)])
            .unwrap();
        session.acknowledge().unwrap();
        (session, notifier, exit)
    }

    #[test]
    fn proctored_quiz_waits_for_acknowledgement() {
        let (mut session, _, _) = session(SessionConfig::new(StudentId::new(1)));
        session.apply_loaded(quiz(10), vec![question(1)]).unwrap();

        assert_eq!(session.phase(), SessionPhase::Acknowledging);
        assert!(session.timer().is_none());
        assert!(session.on_tick().is_none());
        assert!(session.select_answer(QuestionId::new(1), "A").is_err());

        session.acknowledge().unwrap();
        assert_eq!(session.phase(), SessionPhase::Answering);
        assert_eq!(session.timer().and_then(QuizTimer::remaining_secs), Some(600));
    }

    #[test]
    fn unproctored_quiz_starts_immediately() {
        let (mut session, _, _) =
            session(SessionConfig::new(StudentId::new(1)).with_proctored(false));
        session.apply_loaded(quiz(10), vec![question(1)]).unwrap();
        assert_eq!(session.phase(), SessionPhase::Answering);
        assert!(!session.blocks_clipboard());
    }

    #[test]
    fn correct_answers_are_hidden_from_learners() {
        let (session, _, _) = answering();
        assert!(session.questions().iter().all(|q| q.correct_answer().is_none()));
    }

    #[test]
    fn empty_question_set_is_rejected() {
        let (mut session, notifier, _) = session(SessionConfig::new(StudentId::new(1)));
        let err = session.apply_loaded(quiz(10), Vec::new()).unwrap_err();
        assert!(matches!(err, SessionError::InvalidQuiz(_)));
        assert_eq!(session.phase(), SessionPhase::Loading);
        assert_eq!(notifier.count_of(LOAD_FAILED_NOTICE), 1);
    }

    #[test]
    fn selection_replaces_earlier_choice() {
        let (mut session, _, _) = answering();
        session.select_answer(QuestionId::new(1), "A").unwrap();
        session.select_answer(QuestionId::new(1), "B").unwrap();
        assert_eq!(session.answer_for(QuestionId::new(1)), Some("B"));
    }

    #[test]
    fn selection_must_name_a_real_option() {
        let (mut session, _, _) = answering();
        assert!(matches!(
            session.select_answer(QuestionId::new(9), "A"),
            Err(SessionError::UnknownQuestion(_))
        ));
        assert!(matches!(
            session.select_answer(QuestionId::new(1), "Z"),
            Err(SessionError::UnknownOption { .. })
        ));
    }

    #[test]
    fn next_past_last_question_opens_review() {
        let (mut session, _, _) = answering();
        assert_eq!(session.next().unwrap(), NavOutcome::Moved);
        assert_eq!(session.next().unwrap(), NavOutcome::Moved);
        assert_eq!(session.next().unwrap(), NavOutcome::EnteredReview);
        assert_eq!(session.phase(), SessionPhase::Reviewing);
        assert_eq!(session.cursor(), Some(2));
    }

    #[test]
    fn prev_at_first_question_is_unchanged() {
        let (mut session, _, _) = answering();
        assert_eq!(session.prev().unwrap(), NavOutcome::Unchanged);
    }

    #[test]
    fn jump_from_review_returns_to_answering() {
        let (mut session, _, _) = answering();
        session.open_review().unwrap();
        assert_eq!(session.jump_to(7).unwrap(), NavOutcome::Unchanged);
        assert_eq!(session.phase(), SessionPhase::Reviewing);
        assert_eq!(session.jump_to(1).unwrap(), NavOutcome::Moved);
        assert_eq!(session.phase(), SessionPhase::Answering);
        assert_eq!(session.cursor(), Some(1));
    }

    #[test]
    fn manual_submit_requires_review() {
        let (mut session, _, _) = answering();
        assert!(session.begin_submit(SubmitCause::Manual).is_none());
        session.open_review().unwrap();
        let ticket = session.begin_submit(SubmitCause::Manual).unwrap();
        assert_eq!(ticket.rollback_phase(), SessionPhase::Reviewing);
        assert_eq!(session.phase(), SessionPhase::Submitting);
        assert!(session.begin_submit(SubmitCause::Manual).is_none());
    }

    #[test]
    fn low_water_warning_fires_once() {
        let (mut session, notifier, _) = answering();
        for _ in 0..580 {
            assert!(session.on_tick().is_none());
        }
        assert_eq!(notifier.count_of(&low_water_notice(30)), 1);
    }

    #[test]
    fn expiry_forces_a_single_submission() {
        let (mut session, notifier, _) = answering();
        let mut tickets = Vec::new();
        for _ in 0..605 {
            tickets.extend(session.on_tick());
        }
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].cause(), SubmitCause::Forced(ViolationCause::Timeout));
        assert_eq!(tickets[0].payload().time_spent_secs, 600);
        assert_eq!(
            notifier.count_of(violation_notice(ViolationCause::Timeout)),
            1
        );
    }

    #[test]
    fn clipboard_is_blocked_but_never_submits() {
        let (mut session, notifier, _) = answering();
        let response = session.on_signal(&BrowserSignal::Paste);
        assert!(response.prevent_default);
        assert!(response.ticket.is_none());
        assert_eq!(notifier.count_of(BLOCKED_ACTION_NOTICE), 1);
        assert_eq!(
            notifier.notices().last().map(|notice| notice.kind),
            Some(NoticeKind::Error)
        );
    }

    #[test]
    fn screenshot_key_forces_submission() {
        let (mut session, _, _) = answering();
        let response = session.on_signal(&BrowserSignal::KeyUp(KeyChord::print_screen()));
        let ticket = response.ticket.unwrap();
        assert_eq!(
            ticket.cause(),
            SubmitCause::Forced(ViolationCause::ScreenshotAttempt)
        );
        assert_eq!(session.violation(), Some(ViolationCause::ScreenshotAttempt));
    }

    #[test]
    fn failed_submit_rolls_back_and_keeps_answers() {
        let (mut session, notifier, _) = answering();
        session.select_answer(QuestionId::new(1), "A").unwrap();
        session.open_review().unwrap();
        let ticket = session.begin_submit(SubmitCause::Manual).unwrap();

        let err = session
            .complete_submit(ticket, Err(ApiError::Unavailable))
            .unwrap_err();
        assert!(matches!(err, SessionError::SubmitFailure(_)));
        assert_eq!(session.phase(), SessionPhase::Reviewing);
        assert_eq!(session.answer_for(QuestionId::new(1)), Some("A"));
        assert_eq!(notifier.count_of(SUBMIT_FAILED_NOTICE), 1);
    }

    #[test]
    fn successful_manual_submit_announces_itself() {
        let (mut session, notifier, _) = answering();
        session.open_review().unwrap();
        let ticket = session.begin_submit(SubmitCause::Manual).unwrap();
        session
            .complete_submit(ticket, Ok(AttemptResult { score: 80, ..AttemptResult::default() }))
            .unwrap();

        assert_eq!(session.phase(), SessionPhase::Submitted);
        assert_eq!(session.outcome().map(|o| o.result.score), Some(80));
        assert_eq!(notifier.count_of(SUBMITTED_NOTICE), 1);
    }

    #[test]
    fn results_after_teardown_are_dropped() {
        let (mut session, _, exit) = answering();
        session.open_review().unwrap();
        let ticket = session.begin_submit(SubmitCause::Manual).unwrap();
        session.back();

        assert!(session.complete_submit(ticket, Ok(AttemptResult::default())).is_err());
        assert!(session.outcome().is_none());
        assert_eq!(exit.exits(), vec![ExitReason::Back]);
        assert!(session.on_tick().is_none());
    }

    #[test]
    fn retry_starts_from_scratch() {
        let (mut session, _, _) = answering();
        session.select_answer(QuestionId::new(2), "B").unwrap();
        session.jump_to(2).unwrap();
        session.open_review().unwrap();
        let ticket = session.begin_submit(SubmitCause::Manual).unwrap();
        session.complete_submit(ticket, Ok(AttemptResult::default())).unwrap();

        session.retry().unwrap();
        assert_eq!(session.phase(), SessionPhase::Acknowledging);
        session.acknowledge().unwrap();
        assert_eq!(session.cursor(), Some(0));
        assert_eq!(session.answers().map(BTreeMap::len), Some(0));
        assert_eq!(session.timer().and_then(QuizTimer::remaining_secs), Some(600));
        assert!(session.outcome().is_none());
    }

    #[test]
    fn read_only_walk_through_finishes_without_submitting() {
        let (mut session, _, exit) = session(SessionConfig::instructor(StudentId::new(2)));
        session
            .apply_loaded(quiz(10), vec![question(1), question(2)])
            .unwrap();

        assert_eq!(session.phase(), SessionPhase::Answering);
        assert_eq!(session.questions()[0].correct_answer(), Some("A"));
        assert!(matches!(
            session.select_answer(QuestionId::new(1), "A"),
            Err(SessionError::ReadOnly)
        ));
        assert!(session.on_signal(&BrowserSignal::VisibilityHidden).ticket.is_none());

        assert_eq!(session.next().unwrap(), NavOutcome::Moved);
        assert_eq!(session.next().unwrap(), NavOutcome::Finished);
        assert_eq!(exit.exits(), vec![ExitReason::Finished]);
        assert!(!session.is_mounted());
    }

    #[test]
    fn failed_timeout_submit_keeps_the_attempt_locked() {
        let (mut session, notifier, _) = answering();
        session.select_answer(QuestionId::new(1), "A").unwrap();
        let ticket = (0..600).find_map(|_| session.on_tick()).unwrap();
        session
            .complete_submit(ticket, Err(ApiError::Network("offline".into())))
            .unwrap_err();

        assert_eq!(session.phase(), SessionPhase::Reviewing);
        assert_eq!(session.timer().and_then(QuizTimer::remaining_secs), Some(0));
        assert!(matches!(
            session.select_answer(QuestionId::new(2), "B"),
            Err(SessionError::Locked(ViolationCause::Timeout))
        ));
        assert!(session.close_review().is_err());
        assert!(session.jump_to(0).is_err());
        assert_eq!(session.answers().map(BTreeMap::len), Some(1));

        let mut resent = Vec::new();
        for _ in 0..OVERDUE_RESUBMIT_SECS {
            resent.extend(session.on_tick());
        }
        assert_eq!(resent.len(), 1);
        assert_eq!(resent[0].cause(), SubmitCause::Forced(ViolationCause::Timeout));
        assert_eq!(resent[0].payload().answers.len(), 1);
        assert_eq!(resent[0].payload().time_spent_secs, 600);
        assert_eq!(session.phase(), SessionPhase::Submitting);
        assert_eq!(
            notifier.count_of(violation_notice(ViolationCause::Timeout)),
            1
        );
    }

    #[test]
    fn resubmitting_a_locked_attempt_keeps_the_forced_cause() {
        let (mut session, notifier, _) = answering();
        let ticket = session
            .on_signal(&BrowserSignal::VisibilityHidden)
            .ticket
            .unwrap();
        session
            .complete_submit(ticket, Err(ApiError::Unavailable))
            .unwrap_err();
        assert_eq!(session.phase(), SessionPhase::Reviewing);
        assert!(session.on_signal(&BrowserSignal::VisibilityHidden).ticket.is_none());

        let ticket = session.begin_submit(SubmitCause::Manual).unwrap();
        assert_eq!(ticket.cause(), SubmitCause::Forced(ViolationCause::TabSwitch));
        session
            .complete_submit(ticket, Ok(AttemptResult::default()))
            .unwrap();
        assert_eq!(
            session.outcome().map(|outcome| outcome.cause),
            Some(SubmitCause::Forced(ViolationCause::TabSwitch))
        );
        assert_eq!(notifier.count_of(SUBMITTED_NOTICE), 0);
    }

    #[test]
    fn configured_low_water_and_capture_chords_apply() {
        let config = SessionConfig::new(StudentId::new(1))
            .with_low_water_secs(90)
            .with_capture_chords(vec![KeyChord::new("s").with_ctrl().with_shift()]);
        let (mut session, notifier, _) = session(config);
        session.apply_loaded(quiz(10), vec![question(1)]).unwrap();
        session.acknowledge().unwrap();

        for _ in 0..510 {
            assert!(session.on_tick().is_none());
        }
        assert_eq!(notifier.count_of(&low_water_notice(90)), 1);

        let print_screen = BrowserSignal::KeyUp(KeyChord::print_screen());
        assert!(session.on_signal(&print_screen).ticket.is_none());
        let chord = BrowserSignal::KeyUp(KeyChord::new("S").with_ctrl().with_shift());
        let ticket = session.on_signal(&chord).ticket.unwrap();
        assert_eq!(
            ticket.cause(),
            SubmitCause::Forced(ViolationCause::ScreenshotAttempt)
        );
    }

    #[tokio::test]
    async fn unset_quiz_id_is_rejected_before_fetching() {
        let notifier = RecordingNotifier::new();
        let mut session = QuizSession::new(
            QuizId::new(0),
            SessionConfig::new(StudentId::new(1)),
            Arc::new(notifier.clone()),
            Arc::new(RecordingExit::new()),
        );
        let err = session
            .load(&backend::InMemoryBackend::new())
            .await
            .unwrap_err();

        assert!(matches!(err, SessionError::MissingQuizId));
        assert_eq!(session.phase(), SessionPhase::Loading);
        assert!(session.load_error().is_some());
        assert_eq!(notifier.count_of(INVALID_QUIZ_NOTICE), 1);
        session.back();
        assert!(!session.is_mounted());
    }
}
