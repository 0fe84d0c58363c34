//! Runs a [`QuizSession`] on its own task.
//!
//! The task owns the controller and is the only place it is mutated. Learner
//! actions arrive as [`SessionCommand`]s, the attempt clock is a one-second
//! interval, and submissions run on spawned tasks whose results are fed back
//! through a channel. Every change is published as a [`SessionSnapshot`].

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::{self, MissedTickBehavior};

use backend::{ApiError, AttemptSubmitter, Backend};
use quiz_core::model::{AttemptResult, QuestionId, QuizId, SubmitCause};

use crate::exit::SessionExit;
use crate::notify::Notifier;

use super::config::SessionConfig;
use super::controller::QuizSession;
use super::integrity::BrowserSignal;
use super::snapshot::SessionSnapshot;
use super::submission::SubmitTicket;

const TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Acknowledge,
    Select {
        question_id: QuestionId,
        option_text: String,
    },
    Next,
    Prev,
    JumpTo(usize),
    OpenReview,
    CloseReview,
    Submit,
    Signal(BrowserSignal),
    Retry,
    /// Leave through the exit callback.
    Back,
    /// Detach silently, e.g. when the view unmounts.
    Close,
}

/// Cheap, cloneable access to a running session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<SessionCommand>,
    snapshots: watch::Receiver<SessionSnapshot>,
}

impl SessionHandle {
    /// Queues a command. Returns `false` once the session task has ended.
    pub fn send(&self, command: SessionCommand) -> bool {
        self.commands.send(command).is_ok()
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    pub fn close(&self) {
        let _ = self.commands.send(SessionCommand::Close);
    }
}

type Completion = (SubmitTicket, Result<AttemptResult, ApiError>);

/// Loads `quiz_id` and drives the session until it exits or every handle is
/// dropped.
///
/// Must be called from within a tokio runtime.
pub fn spawn_session(
    backend: Backend,
    quiz_id: QuizId,
    config: SessionConfig,
    notifier: Arc<dyn Notifier>,
    exit: Arc<dyn SessionExit>,
) -> SessionHandle {
    let session = QuizSession::new(quiz_id, config, notifier, exit);
    let (commands_tx, commands_rx) = mpsc::unbounded_channel();
    let (snapshots_tx, snapshots_rx) = watch::channel(session.snapshot());

    tokio::spawn(run(session, backend, commands_rx, snapshots_tx));

    SessionHandle {
        commands: commands_tx,
        snapshots: snapshots_rx,
    }
}

async fn run(
    mut session: QuizSession,
    backend: Backend,
    mut commands: mpsc::UnboundedReceiver<SessionCommand>,
    snapshots: watch::Sender<SessionSnapshot>,
) {
    let quiz_id = session.quiz_id();
    if let Err(err) = session.load(backend.catalog.as_ref()).await {
        tracing::debug!(%quiz_id, error = %err, "session load ended");
    }
    snapshots.send_replace(session.snapshot());

    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<Completion>();
    let mut ticker = time::interval(TICK);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker.reset();
    let mut was_live = session.phase().is_live();

    while session.is_mounted() {
        tokio::select! {
            command = commands.recv() => {
                let Some(command) = command else {
                    session.teardown();
                    break;
                };
                if let Some(ticket) = apply(&mut session, command) {
                    dispatch(&backend.attempts, &done_tx, ticket);
                }
            }
            _ = ticker.tick() => {
                if let Some(ticket) = session.on_tick() {
                    dispatch(&backend.attempts, &done_tx, ticket);
                }
            }
            Some((ticket, result)) = done_rx.recv() => {
                if let Err(err) = session.complete_submit(ticket, result) {
                    tracing::debug!(%quiz_id, error = %err, "submission completed with error");
                }
            }
        }

        let live = session.phase().is_live();
        if live && !was_live {
            ticker.reset();
        }
        was_live = live;
        snapshots.send_replace(session.snapshot());
    }

    tracing::debug!(%quiz_id, "session task finished");
}

fn apply(session: &mut QuizSession, command: SessionCommand) -> Option<SubmitTicket> {
    let outcome = match command {
        SessionCommand::Acknowledge => session.acknowledge(),
        SessionCommand::Select {
            question_id,
            option_text,
        } => session.select_answer(question_id, &option_text),
        SessionCommand::Next => session.next().map(drop),
        SessionCommand::Prev => session.prev().map(drop),
        SessionCommand::JumpTo(index) => session.jump_to(index).map(drop),
        SessionCommand::OpenReview => session.open_review(),
        SessionCommand::CloseReview => session.close_review(),
        SessionCommand::Submit => return session.begin_submit(SubmitCause::Manual),
        SessionCommand::Signal(signal) => return session.on_signal(&signal).ticket,
        SessionCommand::Retry => session.retry(),
        SessionCommand::Back => {
            session.back();
            Ok(())
        }
        SessionCommand::Close => {
            session.teardown();
            Ok(())
        }
    };
    if let Err(err) = outcome {
        tracing::debug!(error = %err, "session command rejected");
    }
    None
}

fn dispatch(
    attempts: &Arc<dyn AttemptSubmitter>,
    done: &mpsc::UnboundedSender<Completion>,
    ticket: SubmitTicket,
) {
    let attempts = Arc::clone(attempts);
    let done = done.clone();
    tokio::spawn(async move {
        let result = attempts
            .submit_attempt(ticket.quiz_id(), ticket.payload())
            .await;
        // The session may be gone; its result no longer matters.
        let _ = done.send((ticket, result));
    });
}
