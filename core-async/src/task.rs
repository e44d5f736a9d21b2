//! Task spawning and cancellation.
//!
//! Thin wrappers over `tokio::task` plus the cooperative cancellation token
//! from `tokio-util`, which periodic workers (timers) observe to shut down.
//!
//! # Examples
//!
//! ```rust
//! use core_async::task;
//!
//! async fn example() {
//!     let handle = task::spawn(async { 42 });
//!     assert_eq!(handle.await.unwrap(), 42);
//! }
//! ```

pub use tokio::task::{spawn_blocking, yield_now, JoinError, JoinHandle};
pub use tokio_util::sync::CancellationToken;

/// Spawns a new asynchronous task on the Tokio runtime.
///
/// The spawned task may run on a different thread. Panics when called
/// outside a runtime context, as `tokio::spawn` does.
pub fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
    F: std::future::Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::task::spawn(future)
}

/// A spawned worker paired with the token that stops it.
///
/// Cancelling is cooperative: the worker observes the token at its next
/// suspension point. Dropping the handle cancels the worker as well.
#[derive(Debug)]
pub struct WorkerHandle {
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl WorkerHandle {
    /// Spawn `make(token)` as a worker task.
    pub fn spawn<F, Fut>(make: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        let token = CancellationToken::new();
        let handle = spawn(make(token.clone()));
        Self {
            token,
            handle: Some(handle),
        }
    }

    /// Spawn `make(token)` on a specific runtime.
    ///
    /// Usable from threads that are not inside a runtime context.
    pub fn spawn_on<F, Fut>(runtime: &crate::runtime::Handle, make: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        let token = CancellationToken::new();
        let handle = runtime.spawn(make(token.clone()));
        Self {
            token,
            handle: Some(handle),
        }
    }

    /// Request the worker to stop. Idempotent.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether the worker has been asked to stop.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Cancel and wait for the worker to exit.
    pub async fn shutdown(mut self) {
        self.token.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Result type for task operations.
pub type Result<T> = std::result::Result<T, JoinError>;
