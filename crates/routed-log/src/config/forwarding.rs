//! External error forwarding configuration

use serde::{Deserialize, Serialize};

/// Sentry client settings
///
/// The default is a non-functional placeholder: an empty DSN produces a
/// disabled client, so enabling forwarding without configuring it sends
/// nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForwardingConfig {
    /// Project DSN
    pub dsn: String,
    /// Deployment environment
    pub environment: String,
    /// Release / code version
    pub release: String,
}

impl Default for ForwardingConfig {
    fn default() -> Self {
        Self {
            dsn: String::new(),
            environment: "production".to_string(),
            release: "1".to_string(),
        }
    }
}

impl ForwardingConfig {
    /// Create a config for `dsn` with the default environment and release
    #[must_use]
    pub fn new(dsn: impl Into<String>) -> Self {
        Self {
            dsn: dsn.into(),
            ..Self::default()
        }
    }

    /// Set the environment
    #[must_use]
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    /// Set the release
    #[must_use]
    pub fn with_release(mut self, release: impl Into<String>) -> Self {
        self.release = release.into();
        self
    }

    /// Returns `true` if the DSN is empty or explicitly disabled
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.dsn.is_empty() || self.dsn == "disabled"
    }
}
