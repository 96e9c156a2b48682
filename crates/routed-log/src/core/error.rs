//! Error handling for routed-log
//!
//! Assembling a logger can only fail in one place: when the backend rejects a
//! derived destination. Setters on [`LoggerBuilder`](crate::LoggerBuilder) are
//! total and never produce an error.

use std::io;

use tracing::dispatcher::SetGlobalDefaultError;

/// Type alias for results of logger operations
pub type LogResult<T> = Result<T, LogError>;

/// Errors returned while building or installing a logger
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum LogError {
    /// The backend rejected the derived configuration
    #[error("failed to build logger config: cannot open output path '{destination}'")]
    Backend {
        /// Output path that could not be opened
        destination: String,
        /// Underlying cause
        #[source]
        source: io::Error,
    },

    /// The level could not be swapped because the backend is gone
    #[error("failed to reload log level: {0}")]
    Reload(#[from] tracing_subscriber::reload::Error),

    /// A process-wide default dispatcher is already installed
    #[error("a global logger is already installed")]
    AlreadyInitialized(#[from] SetGlobalDefaultError),
}

impl LogError {
    /// Create a backend construction error for `destination`
    pub(crate) fn backend(destination: impl Into<String>, source: io::Error) -> Self {
        Self::Backend {
            destination: destination.into(),
            source,
        }
    }

    /// Returns `true` if the error came from building the backend
    #[must_use]
    pub fn is_backend(&self) -> bool {
        matches!(self, Self::Backend { .. })
    }
}
