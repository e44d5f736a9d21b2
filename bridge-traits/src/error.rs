//! Failures reported by host implementations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    /// The host does not ship this engine or service.
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    /// The host attempted the call and it failed.
    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    /// The backend object exists but is not attached to a host surface yet.
    #[error("Backend not bound: {0}")]
    NotBound(String),
}

impl BridgeError {
    /// Whether retrying later, once the host is ready, can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BridgeError::OperationFailed(_) | BridgeError::NotBound(_))
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_engines_are_not_retryable() {
        assert!(!BridgeError::NotAvailable("background audio player".into()).is_retryable());
        assert!(BridgeError::NotBound("media element".into()).is_retryable());
        assert_eq!(
            BridgeError::NotBound("media element".into()).to_string(),
            "Backend not bound: media element"
        );
    }
}
