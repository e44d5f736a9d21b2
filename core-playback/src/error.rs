//! # Playback Error Types
//!
//! Errors raised by the playback control layer. Argument and capability
//! errors reach the caller directly; engine failures and transient query
//! failures are absorbed by the controller and only show up as state.

use bridge_traits::BridgeError;
use core_async::dispatch::DispatchError;
use thiserror::Error;

/// Errors that can occur during playback control operations.
#[derive(Error, Debug)]
pub enum PlaybackError {
    // ========================================================================
    // Caller Errors
    // ========================================================================
    /// Input rejected before any engine was touched.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Operation issued before an engine is bound, or after disposal.
    #[error("Playback engine not initialized: {0}")]
    NotInitialized(String),

    /// The active engine does not implement the operation.
    #[error("Operation '{operation}' not supported by the {engine} engine")]
    NotSupported {
        operation: &'static str,
        engine: bridge_traits::EngineKind,
    },

    // ========================================================================
    // Engine Errors
    // ========================================================================
    /// Engine could not be created, bound or loaded.
    #[error("Engine failure: {0}")]
    EngineFailure(String),

    /// A state query against a constrained engine failed this time round.
    #[error("Transient query failure: {0}")]
    TransientQueryFailure(String),

    // ========================================================================
    // Plumbing
    // ========================================================================
    #[error("Invalid playback configuration: {0}")]
    Config(String),

    /// The controller's execution context has shut down.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),
}

impl PlaybackError {
    /// Returns `true` if the failure is expected to clear up on its own.
    pub fn is_transient(&self) -> bool {
        matches!(self, PlaybackError::TransientQueryFailure(_))
    }

    /// Returns `true` if the caller can fix the failure by changing the call.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            PlaybackError::InvalidArgument(_)
                | PlaybackError::NotInitialized(_)
                | PlaybackError::NotSupported { .. }
        )
    }

    pub(crate) fn not_supported(operation: &'static str, engine: bridge_traits::EngineKind) -> Self {
        PlaybackError::NotSupported { operation, engine }
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
