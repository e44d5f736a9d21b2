//! Synchronization primitives.
//!
//! Async-aware primitives come from `tokio::sync`; the short, never-awaited
//! critical sections inside the dispatch layer use `parking_lot`.
//!
//! # Examples
//!
//! ```rust
//! use core_async::sync::{mpsc, oneshot};
//!
//! async fn example() {
//!     let (tx, rx) = oneshot::channel();
//!     tx.send(7).unwrap();
//!     assert_eq!(rx.await.unwrap(), 7);
//!
//!     let (tx, mut rx) = mpsc::unbounded_channel();
//!     tx.send("job").unwrap();
//!     assert_eq!(rx.recv().await, Some("job"));
//! }
//! ```

pub use tokio::sync::{
    broadcast, mpsc, oneshot, watch, Mutex, MutexGuard, Notify, RwLock, RwLockReadGuard,
    RwLockWriteGuard,
};

/// Blocking lock for state that is only held across synchronous code.
pub use parking_lot::Mutex as SyncMutex;
