//! Configuration loaded from the environment

use super::{Config, ForwardingConfig};

impl Config {
    /// Create configuration from environment variables
    ///
    /// | variable | field |
    /// |---|---|
    /// | `ROUTED_LOG_LEVEL` | `level` |
    /// | `ROUTED_LOG_OUTPUT` | `output_paths` (comma separated) |
    /// | `ROUTED_LOG_SERVICE` | `service_name` |
    /// | `ROUTED_LOG_SPLIT` | `split_error_stream` |
    /// | `SENTRY_DSN` | `forwarding.dsn`, enables forwarding |
    /// | `SENTRY_ENV` | `forwarding.environment` |
    /// | `SENTRY_RELEASE` | `forwarding.release` |
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(level) = lookup("ROUTED_LOG_LEVEL") {
            config.level = level;
        }
        if let Some(paths) = lookup("ROUTED_LOG_OUTPUT") {
            config.output_paths = paths
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(service) = lookup("ROUTED_LOG_SERVICE") {
            config.service_name = service;
        }
        if let Some(v) = lookup("ROUTED_LOG_SPLIT") {
            config.split_error_stream = v != "0" && v != "false";
        }

        let mut forwarding = ForwardingConfig::default();
        if let Some(env) = lookup("SENTRY_ENV") {
            forwarding.environment = env;
        }
        if let Some(release) = lookup("SENTRY_RELEASE") {
            forwarding.release = release;
        }
        if let Some(dsn) = lookup("SENTRY_DSN") {
            forwarding.dsn = dsn;
            config.forward_errors = !forwarding.is_placeholder();
        }
        config.forwarding = forwarding;

        config
    }
}
