//! # Serialized Dispatch
//!
//! A single logical execution context that owns a piece of state `S` and runs
//! jobs against it one at a time. Callers on any thread hand a job to the
//! [`Executor`]; the job later runs with exclusive `&mut S` access, so the
//! state itself never needs a lock.
//!
//! ## Priority bands
//!
//! Jobs carry a [`Priority`]. Pending `Normal` jobs always run before pending
//! `Low` jobs; within a band, order is FIFO.
//!
//! ## Executors
//!
//! - [`DispatchQueue`]: a Tokio task draining two unbounded channels. This is
//!   the production executor.
//! - [`InlineExecutor`]: runs jobs on the dispatching thread, immediately,
//!   unless a job is already running (re-entrant dispatches are queued and
//!   drained by the outer call). Used by tests that want synchronous,
//!   deterministic behaviour.
//!
//! ```text
//!   engine thread ──┐
//!   timer task ─────┼── dispatch(priority, job) ──> [Normal | Low] ──> &mut S
//!   caller ─────────┘
//! ```

use crate::sync::{mpsc, oneshot, SyncMutex as Mutex};
use std::collections::VecDeque;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Weak};
use thiserror::Error;
use tracing::{error, trace};

/// Scheduling band for a dispatched job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    /// High-frequency periodic updates (clock refresh, time ticks).
    Low,
    /// User-triggered operations and state transitions.
    Normal,
}

/// A unit of work executed against the queue-owned state.
pub type Job<S> = Box<dyn FnOnce(&mut S) + Send + 'static>;

/// Errors raised when handing work to an executor.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The executor has shut down and no longer accepts jobs.
    #[error("Dispatch queue closed")]
    Closed,
}

/// Something that can run jobs against a state `S`, one at a time.
pub trait Executor<S>: Send + Sync {
    /// Enqueue `job`. Never runs the job concurrently with another job.
    fn dispatch(&self, priority: Priority, job: Job<S>) -> Result<(), DispatchError>;

    /// Whether the executor has stopped accepting jobs.
    fn is_closed(&self) -> bool {
        false
    }
}

// ============================================================================
// Dispatcher handles
// ============================================================================

/// Cloneable strong handle to an executor.
pub struct Dispatcher<S> {
    executor: Arc<dyn Executor<S>>,
}

impl<S> Clone for Dispatcher<S> {
    fn clone(&self) -> Self {
        Self {
            executor: Arc::clone(&self.executor),
        }
    }
}

impl<S> fmt::Debug for Dispatcher<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("closed", &self.executor.is_closed())
            .finish()
    }
}

impl<S: 'static> Dispatcher<S> {
    /// Wrap an executor.
    pub fn new(executor: Arc<dyn Executor<S>>) -> Self {
        Self { executor }
    }

    /// Fire-and-forget dispatch.
    pub fn dispatch<F>(&self, priority: Priority, job: F) -> Result<(), DispatchError>
    where
        F: FnOnce(&mut S) + Send + 'static,
    {
        self.executor.dispatch(priority, Box::new(job))
    }

    /// Dispatch `job` and wait for its result.
    ///
    /// This is the suspension point used by operations that must observe the
    /// outcome of a state transition.
    pub async fn call<F, R>(&self, priority: Priority, job: F) -> Result<R, DispatchError>
    where
        F: FnOnce(&mut S) -> R + Send + 'static,
        R: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        self.dispatch(priority, move |state| {
            let _ = tx.send(job(state));
        })?;
        rx.await.map_err(|_| DispatchError::Closed)
    }

    /// Create a weak handle that does not keep the executor alive.
    pub fn downgrade(&self) -> WeakDispatcher<S> {
        WeakDispatcher {
            executor: Arc::downgrade(&self.executor),
        }
    }

    /// Whether the underlying executor stopped accepting jobs.
    pub fn is_closed(&self) -> bool {
        self.executor.is_closed()
    }
}

/// Non-owning handle to an executor.
///
/// State living on a queue holds this to post follow-up work to itself
/// without creating a reference cycle.
pub struct WeakDispatcher<S> {
    executor: Weak<dyn Executor<S>>,
}

impl<S> Clone for WeakDispatcher<S> {
    fn clone(&self) -> Self {
        Self {
            executor: Weak::clone(&self.executor),
        }
    }
}

impl<S> fmt::Debug for WeakDispatcher<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakDispatcher")
            .field("alive", &(self.executor.strong_count() > 0))
            .finish()
    }
}

impl<S: 'static> WeakDispatcher<S> {
    /// Upgrade to a strong handle if the executor is still alive.
    pub fn upgrade(&self) -> Option<Dispatcher<S>> {
        self.executor.upgrade().map(Dispatcher::new)
    }

    /// Dispatch through the weak handle; fails with `Closed` once the
    /// executor is gone.
    pub fn dispatch<F>(&self, priority: Priority, job: F) -> Result<(), DispatchError>
    where
        F: FnOnce(&mut S) + Send + 'static,
    {
        match self.executor.upgrade() {
            Some(executor) => executor.dispatch(priority, Box::new(job)),
            None => Err(DispatchError::Closed),
        }
    }
}

fn run_job<S>(job: Job<S>, state: &mut S) {
    if catch_unwind(AssertUnwindSafe(|| job(state))).is_err() {
        error!("Dispatched job panicked; state kept, queue continues");
    }
}

// ============================================================================
// Tokio-backed queue
// ============================================================================

/// Production executor: a Tokio task that owns the state and drains a
/// normal-priority and a low-priority channel, preferring the former.
///
/// The task exits, dropping the state, once every handle is gone.
pub struct DispatchQueue<S> {
    normal: mpsc::UnboundedSender<Job<S>>,
    low: mpsc::UnboundedSender<Job<S>>,
}

impl<S: Send + 'static> DispatchQueue<S> {
    /// Move `state` onto a new queue task. Must be called within a runtime.
    pub fn spawn(state: S) -> Arc<Self> {
        let (normal, mut normal_rx) = mpsc::unbounded_channel::<Job<S>>();
        let (low, mut low_rx) = mpsc::unbounded_channel::<Job<S>>();

        crate::task::spawn(async move {
            let mut state = state;
            loop {
                let job = tokio::select! {
                    biased;
                    Some(job) = normal_rx.recv() => job,
                    Some(job) = low_rx.recv() => job,
                    else => break,
                };
                run_job(job, &mut state);
            }
            trace!("Dispatch queue closed");
        });

        Arc::new(Self { normal, low })
    }
}

impl<S: Send + 'static> Executor<S> for DispatchQueue<S> {
    fn dispatch(&self, priority: Priority, job: Job<S>) -> Result<(), DispatchError> {
        let sender = match priority {
            Priority::Normal => &self.normal,
            Priority::Low => &self.low,
        };
        sender.send(job).map_err(|_| DispatchError::Closed)
    }

    fn is_closed(&self) -> bool {
        self.normal.is_closed()
    }
}

// ============================================================================
// Inline executor
// ============================================================================

struct Pending<S> {
    normal: VecDeque<Job<S>>,
    low: VecDeque<Job<S>>,
    closed: bool,
}

impl<S> Pending<S> {
    fn pop(&mut self) -> Option<Job<S>> {
        self.normal.pop_front().or_else(|| self.low.pop_front())
    }

    fn is_empty(&self) -> bool {
        self.normal.is_empty() && self.low.is_empty()
    }
}

/// Synchronous executor that runs jobs on the caller's thread.
///
/// A dispatch made while another job is running (from inside that job, or
/// from another thread) is queued and executed by whichever call currently
/// drains the queue, so jobs still never overlap.
pub struct InlineExecutor<S> {
    state: Mutex<S>,
    pending: Mutex<Pending<S>>,
}

impl<S> InlineExecutor<S> {
    pub fn new(state: S) -> Self {
        Self {
            state: Mutex::new(state),
            pending: Mutex::new(Pending {
                normal: VecDeque::new(),
                low: VecDeque::new(),
                closed: false,
            }),
        }
    }

    /// Stop accepting jobs; anything still pending is dropped.
    pub fn close(&self) {
        let mut pending = self.pending.lock();
        pending.closed = true;
        pending.normal.clear();
        pending.low.clear();
    }

    /// Read the state outside of a job.
    ///
    /// Must not be called from inside a job.
    pub fn with_state<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        let result = {
            let state = self.state.lock();
            f(&state)
        };
        self.drain();
        result
    }

    fn drain(&self) {
        loop {
            let Some(mut state) = self.state.try_lock() else {
                return;
            };
            loop {
                let next = self.pending.lock().pop();
                match next {
                    Some(job) => run_job(job, &mut state),
                    None => break,
                }
            }
            drop(state);
            if self.pending.lock().is_empty() {
                return;
            }
        }
    }
}

impl<S: Send + 'static> Executor<S> for InlineExecutor<S> {
    fn dispatch(&self, priority: Priority, job: Job<S>) -> Result<(), DispatchError> {
        {
            let mut pending = self.pending.lock();
            if pending.closed {
                return Err(DispatchError::Closed);
            }
            match priority {
                Priority::Normal => pending.normal.push_back(job),
                Priority::Low => pending.low.push_back(job),
            }
        }
        self.drain();
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.pending.lock().closed
    }
}
