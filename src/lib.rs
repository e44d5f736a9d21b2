//! Workspace facade crate.
//!
//! Re-exports the workspace crates under short names so host applications
//! can depend on a single package. The `desktop-shims` feature (on by
//! default) lets `CoreConfig` fall back to the desktop implementations of
//! the optional host services.

pub use bridge_traits as bridge;
pub use core_async as runtime_async;
pub use core_playback as playback;
pub use core_runtime as runtime;

pub use core_playback::{MediaDescriptor, PlaybackConfig, PlaybackController, PlaybackError};
pub use core_runtime::config::CoreConfig;
