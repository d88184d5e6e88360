//! Correlation of launched work with the window and id that requested it.
//!
//! A [`Completion`] is created for every request that carries a correlation
//! id. It is the only way to produce an outcome for that id, and it accepts
//! exactly one: the first `succeed` or `fail` wins and later attempts are
//! dropped. Outcomes are not pushed by the thread that produced them; they
//! are enqueued on a single-consumer channel and pushed to the window by one
//! delivery thread, so each push is a complete message.
//!
//! Work that may block (bound methods, file pickers) is started with
//! [`Correlator::launch`], which runs it on its own thread and guarantees an
//! outcome even if the work panics or forgets to report one.

mod failures;

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, error, warn};

use crate::registry::CallResult;
use crate::window::Window;

pub use self::failures::{CallFailure, DialogFailure, TaskFailure};

/// Tracing target for correlation events.
pub(crate) const CORRELATOR_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::correlator");

const DELIVERY_THREAD: &str = "conduit-outcomes";
const EMPTY_RESULT: &str = "{}";

/// Client-issued correlation token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallId(String);

impl CallId {
    /// Wraps a correlation token.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the token text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// Which pair of window pushes an outcome uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// `CallResponse` / `CallError`.
    Call,
    /// `DialogResponse` / `DialogError`.
    Dialog,
}

impl Channel {
    /// Returns the channel name used in logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Call => "call",
            Self::Dialog => "dialog",
        }
    }
}

/// Terminal result for one correlation id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The work completed with a payload.
    Success {
        /// Payload text.
        payload: String,
        /// Whether the payload is a JSON document.
        is_json: bool,
    },
    /// The work failed with a rendered message.
    Error {
        /// Human readable failure.
        message: String,
    },
}

/// Errors raised by the correlator itself.
#[derive(Debug, Error)]
pub enum CorrelatorError {
    /// The delivery thread could not be started.
    #[error("failed to start outcome delivery: {0}")]
    Startup(#[source] std::io::Error),

    /// The delivery thread is gone.
    #[error("outcome delivery has stopped")]
    DeliveryClosed,

    /// Work was still outstanding when the drain deadline passed.
    #[error("{pending} tasks still running after drain timeout")]
    DrainTimedOut { pending: usize },
}

struct Delivery {
    window: Arc<dyn Window>,
    channel: Channel,
    id: CallId,
    outcome: Outcome,
}

impl Delivery {
    fn push(&self) {
        let id = self.id.as_str();
        match (self.channel, &self.outcome) {
            (Channel::Call, Outcome::Success { payload, .. }) => {
                self.window.call_response(id, payload);
            }
            (Channel::Call, Outcome::Error { message }) => self.window.call_error(id, message),
            (Channel::Dialog, Outcome::Success { payload, is_json }) => {
                self.window.dialog_response(id, payload, *is_json);
            }
            (Channel::Dialog, Outcome::Error { message }) => {
                self.window.dialog_error(id, message);
            }
        }
    }
}

enum Envelope {
    Deliver(Delivery),
    Flush(Sender<()>),
}

/// Counts launched tasks that have not finished yet.
#[derive(Default)]
struct TaskTracker {
    running: Mutex<usize>,
    idle: Condvar,
}

impl TaskTracker {
    fn enter(self: &Arc<Self>) -> TaskGuard {
        *self.running.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        TaskGuard {
            tracker: Arc::clone(self),
        }
    }

    fn leave(&self) {
        let mut running = self.running.lock().unwrap_or_else(PoisonError::into_inner);
        *running = running.saturating_sub(1);
        if *running == 0 {
            self.idle.notify_all();
        }
    }

    /// Waits until no task is running. Returns the count still running.
    fn wait_idle(&self, timeout: Duration) -> usize {
        let running = self.running.lock().unwrap_or_else(PoisonError::into_inner);
        let (running, _) = self
            .idle
            .wait_timeout_while(running, timeout, |running| *running > 0)
            .unwrap_or_else(PoisonError::into_inner);
        *running
    }
}

struct TaskGuard {
    tracker: Arc<TaskTracker>,
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.tracker.leave();
    }
}

/// Single delivery handle for one correlation id.
pub struct Completion {
    window: Arc<dyn Window>,
    channel: Channel,
    id: CallId,
    delivered: AtomicBool,
    outbox: Sender<Envelope>,
}

impl Completion {
    /// Returns the correlation id.
    #[must_use]
    pub fn id(&self) -> &CallId {
        &self.id
    }

    /// Returns the push channel.
    #[must_use]
    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// Returns the window the outcome is addressed to.
    #[must_use]
    pub fn window(&self) -> &Arc<dyn Window> {
        &self.window
    }

    /// Returns whether an outcome has already been accepted.
    #[must_use]
    pub fn is_delivered(&self) -> bool {
        self.delivered.load(Ordering::Acquire)
    }

    /// Delivers a plain-text success payload.
    ///
    /// Returns `false` when an outcome was already delivered for this id.
    pub fn succeed(&self, payload: impl Into<String>) -> bool {
        self.deliver(Outcome::Success {
            payload: payload.into(),
            is_json: false,
        })
    }

    /// Delivers a success payload that is already a JSON document.
    pub fn succeed_json(&self, payload: impl Into<String>) -> bool {
        self.deliver(Outcome::Success {
            payload: payload.into(),
            is_json: true,
        })
    }

    /// Encodes a method result and delivers it.
    ///
    /// No result becomes `{}`. An encoding failure is delivered as an error
    /// outcome instead.
    pub fn succeed_with(&self, result: Option<&dyn CallResult>) -> bool {
        let Some(result) = result else {
            return self.succeed_json(EMPTY_RESULT);
        };
        match result.to_json() {
            Ok(payload) => self.succeed_json(payload),
            Err(source) => self.fail(&CallFailure::Encoding(source)),
        }
    }

    /// Delivers an error outcome and records it in the diagnostic log.
    ///
    /// Only the failure that becomes the outcome is logged as an error.
    pub fn fail(&self, failure: &dyn std::error::Error) -> bool {
        self.deliver(Outcome::Error {
            message: failure.to_string(),
        })
    }

    fn deliver(&self, outcome: Outcome) -> bool {
        if self.delivered.swap(true, Ordering::AcqRel) {
            warn!(
                target: CORRELATOR_TARGET,
                id = %self.id,
                channel = self.channel.as_str(),
                outcome = ?outcome,
                "dropping duplicate outcome"
            );
            return false;
        }
        if let Outcome::Error { message } = &outcome {
            error!(
                target: CORRELATOR_TARGET,
                id = %self.id,
                channel = self.channel.as_str(),
                window = %self.window.id(),
                "{message}"
            );
        }

        let delivery = Delivery {
            window: Arc::clone(&self.window),
            channel: self.channel,
            id: self.id.clone(),
            outcome,
        };
        if self.outbox.send(Envelope::Deliver(delivery)).is_err() {
            error!(
                target: CORRELATOR_TARGET,
                id = %self.id,
                channel = self.channel.as_str(),
                "outcome delivery has stopped; outcome lost"
            );
            return false;
        }
        true
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Completion")
            .field("window", &self.window.id())
            .field("channel", &self.channel)
            .field("id", &self.id)
            .field("delivered", &self.is_delivered())
            .finish_non_exhaustive()
    }
}

/// Handle to a launched background task.
#[derive(Debug)]
pub struct TaskHandle {
    id: CallId,
    join: JoinHandle<()>,
}

impl TaskHandle {
    /// Returns the correlation id the task reports to.
    #[must_use]
    pub fn call_id(&self) -> &CallId {
        &self.id
    }

    /// Returns whether the task has finished.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Waits for the task to finish.
    ///
    /// Task panics are already converted into error outcomes, so this only
    /// reports whether the thread itself exited cleanly.
    pub fn join(self) -> bool {
        self.join.join().is_ok()
    }
}

/// Starts background work and routes its outcomes to windows.
pub struct Correlator {
    outbox: Sender<Envelope>,
    tasks: Arc<TaskTracker>,
    sequence: AtomicU64,
}

impl Correlator {
    /// Starts the outcome delivery thread.
    ///
    /// # Errors
    ///
    /// Returns [`CorrelatorError::Startup`] if the thread cannot be spawned.
    pub fn new() -> Result<Self, CorrelatorError> {
        let (outbox, inbox) = mpsc::channel();
        thread::Builder::new()
            .name(DELIVERY_THREAD.to_owned())
            .spawn(move || deliver_outcomes(inbox))
            .map_err(CorrelatorError::Startup)?;
        Ok(Self {
            outbox,
            tasks: Arc::new(TaskTracker::default()),
            sequence: AtomicU64::new(0),
        })
    }

    /// Creates the delivery handle for one correlation id.
    #[must_use]
    pub fn completion(
        &self,
        window: Arc<dyn Window>,
        channel: Channel,
        id: CallId,
    ) -> Arc<Completion> {
        Arc::new(Completion {
            window,
            channel,
            id,
            delivered: AtomicBool::new(false),
            outbox: self.outbox.clone(),
        })
    }

    /// Runs `job` on a background thread and returns immediately.
    ///
    /// The job reports through the completion it is given. If it panics, or
    /// returns without reporting, an error outcome is delivered for it. When
    /// the thread cannot be started the failure is delivered as the outcome
    /// and `None` is returned.
    pub fn launch<F>(&self, completion: Arc<Completion>, job: F) -> Option<TaskHandle>
    where
        F: FnOnce(&Completion) + Send + 'static,
    {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        let guard = self.tasks.enter();
        let task_completion = Arc::clone(&completion);
        let spawned = thread::Builder::new()
            .name(format!("conduit-task-{sequence}"))
            .spawn(move || {
                let _guard = guard;
                run_job(&task_completion, job);
            });

        match spawned {
            Ok(join) => {
                debug!(
                    target: CORRELATOR_TARGET,
                    id = %completion.id(),
                    channel = completion.channel().as_str(),
                    "launched background task"
                );
                Some(TaskHandle {
                    id: completion.id().clone(),
                    join,
                })
            }
            Err(source) => {
                completion.fail(&TaskFailure::Spawn(source));
                None
            }
        }
    }

    /// Returns the number of launched tasks still running.
    #[must_use]
    pub fn running(&self) -> usize {
        *self
            .tasks
            .running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Waits for running tasks to finish and their outcomes to be pushed.
    ///
    /// Message dialogs waiting for a click are not tasks and are not waited
    /// for.
    ///
    /// # Errors
    ///
    /// Returns [`CorrelatorError::DrainTimedOut`] if tasks are still running
    /// at the deadline and [`CorrelatorError::DeliveryClosed`] if the
    /// delivery thread has stopped.
    pub fn drain(&self, timeout: Duration) -> Result<(), CorrelatorError> {
        let started = Instant::now();
        let pending = self.tasks.wait_idle(timeout);
        if pending > 0 {
            return Err(CorrelatorError::DrainTimedOut { pending });
        }

        let (ack, flushed) = mpsc::channel();
        self.outbox
            .send(Envelope::Flush(ack))
            .map_err(|_| CorrelatorError::DeliveryClosed)?;
        let remaining = timeout.saturating_sub(started.elapsed());
        flushed
            .recv_timeout(remaining)
            .map_err(|error| match error {
                mpsc::RecvTimeoutError::Timeout => CorrelatorError::DrainTimedOut { pending: 0 },
                mpsc::RecvTimeoutError::Disconnected => CorrelatorError::DeliveryClosed,
            })
    }
}

impl fmt::Debug for Correlator {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Correlator")
            .field("running", &self.running())
            .finish_non_exhaustive()
    }
}

fn run_job<F>(completion: &Completion, job: F)
where
    F: FnOnce(&Completion),
{
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| job(completion))) {
        completion.fail(&TaskFailure::Panicked {
            detail: panic_detail(payload.as_ref()),
        });
    } else if !completion.is_delivered() {
        completion.fail(&TaskFailure::Abandoned);
    }
}

fn panic_detail(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|text| (*text).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_owned())
}

fn deliver_outcomes(inbox: Receiver<Envelope>) {
    for envelope in inbox {
        match envelope {
            Envelope::Deliver(delivery) => {
                if panic::catch_unwind(AssertUnwindSafe(|| delivery.push())).is_err() {
                    error!(
                        target: CORRELATOR_TARGET,
                        id = %delivery.id,
                        channel = delivery.channel.as_str(),
                        "window push panicked; outcome lost"
                    );
                }
            }
            Envelope::Flush(ack) => {
                if ack.send(()).is_err() {
                    debug!(target: CORRELATOR_TARGET, "drain abandoned before flush");
                }
            }
        }
    }
    debug!(target: CORRELATOR_TARGET, "outcome delivery stopped");
}

#[cfg(test)]
mod tests;
