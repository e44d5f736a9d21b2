//! Runtime abstraction layer for the playback core.
//!
//! Downstream crates depend on this crate instead of reaching for Tokio
//! directly. Besides thin re-exports of task spawning, timers and
//! synchronization primitives, it owns the [`dispatch`] module: the single
//! logical execution context that every piece of controller state lives on.
//!
//! # Modules
//!
//! - `task`: Task spawning and cancellation
//! - `time`: Sleep, intervals and instants
//! - `sync`: Channels and async-aware locks
//! - `runtime`: Runtime handles and `block_on`
//! - `dispatch`: Serialized, priority-banded job execution
//!
//! # Examples
//!
//! ```rust
//! use core_async::dispatch::{Dispatcher, InlineExecutor, Priority};
//! use std::sync::Arc;
//!
//! # core_async::runtime::block_on(async {
//! let dispatcher = Dispatcher::new(Arc::new(InlineExecutor::new(0u32)));
//! let value = dispatcher
//!     .call(Priority::Normal, |counter| {
//!         *counter += 1;
//!         *counter
//!     })
//!     .await
//!     .unwrap();
//! assert_eq!(value, 1);
//! # });
//! ```

pub mod dispatch;
pub mod runtime;
pub mod sync;
pub mod task;
pub mod time;

pub use dispatch::{Dispatcher, Priority, WeakDispatcher};
pub use tokio::select;
pub use task::spawn;
pub use time::{sleep, Duration, Instant};
