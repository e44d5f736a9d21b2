//! Time-related abstractions.
//!
//! Re-exports `tokio::time` so that timers elsewhere in the workspace stay
//! runtime-agnostic at the import level.
//!
//! # Examples
//!
//! ```rust
//! use core_async::time::{sleep, Duration, Instant};
//!
//! async fn example() {
//!     let start = Instant::now();
//!     sleep(Duration::from_millis(10)).await;
//!     assert!(start.elapsed() >= Duration::from_millis(10));
//! }
//! ```

pub use tokio::time::{
    interval, sleep, sleep_until, timeout, Interval, MissedTickBehavior, Sleep, Timeout,
};

pub use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Build an interval that skips missed ticks instead of bursting.
pub fn steady_interval(period: Duration) -> Interval {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker
}

/// Convert a millisecond count coming from an engine into a `Duration`,
/// treating negative values as zero.
pub fn duration_from_millis(ms: i64) -> Duration {
    Duration::from_millis(ms.max(0) as u64)
}
