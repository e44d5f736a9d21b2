//! Errors raised while assembling the runtime: host service wiring,
//! configuration checks and logging setup.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Invalid or inconsistent settings.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required host service was not provided to the builder.
    #[error("Capability missing: {capability} - {message}")]
    CapabilityMissing { capability: String, message: String },

    /// The global tracing subscriber could not be installed.
    #[error("Logging setup failed: {0}")]
    Logging(String),
}

impl Error {
    /// Whether the host forgot to inject a service, as opposed to passing
    /// bad values.
    pub fn is_missing_capability(&self) -> bool {
        matches!(self, Error::CapabilityMissing { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
