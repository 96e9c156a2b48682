//! Core configuration types

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing_subscriber::filter::LevelFilter;

use super::ForwardingConfig;

/// Service name used when none is configured
pub const DEFAULT_SERVICE_NAME: &str = "not/set";

/// Logger configuration
///
/// Every field has a default, so a config file only needs the settings it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (`"debug"` or anything else, which means `"info"`)
    pub level: String,

    /// Output destinations: `"stdout"`, `"stderr"` or file paths
    pub output_paths: Vec<String>,

    /// Service name attached to every record
    pub service_name: String,

    /// Key/value pairs attached to every record, in order
    pub context_fields: Vec<(String, Value)>,

    /// Route error records to stderr and everything else to stdout
    pub split_error_stream: bool,

    /// Forward error records to Sentry
    pub forward_errors: bool,

    /// Sentry client settings
    pub forwarding: ForwardingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            output_paths: vec!["stdout".to_string()],
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            context_fields: Vec::new(),
            split_error_stream: false,
            forward_errors: false,
            forwarding: ForwardingConfig::default(),
        }
    }
}

impl Config {
    /// Level filter derived from [`Config::level`]
    #[must_use]
    pub fn level_filter(&self) -> LevelFilter {
        level_filter(&self.level)
    }
}

/// Map a level string to a filter.
///
/// Only `"debug"` is recognized. Every other value, including unknown
/// strings, maps to `INFO` without an error.
#[must_use]
pub fn level_filter(level: &str) -> LevelFilter {
    match level {
        "debug" => LevelFilter::DEBUG,
        _ => LevelFilter::INFO,
    }
}
