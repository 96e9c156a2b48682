//! # routed-log
//!
//! Opinionated assembly of a structured JSON logger on top of `tracing`.
//!
//! A [`LoggerBuilder`] collects a handful of settings (level, output paths,
//! service name, context fields) and two switches:
//!
//! - **error stream splitting**: error records go to stderr and everything
//!   else to stdout, through the same encoder ([`StreamRouter`]);
//! - **error forwarding**: error records are also sent to Sentry, tagged with
//!   the service name.
//!
//! ## Quick Start
//!
//! ```rust
//! use routed_log::{LoggerBuilder, fields};
//!
//! fn main() -> routed_log::LogResult<()> {
//!     let logger = LoggerBuilder::new()
//!         .service_name("billing")
//!         .split_error_stream(true)
//!         .build()?;
//!
//!     logger.info("invoice sent", &fields! { "invoice" => 42 });
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod builder;
mod config;
mod core;
mod format;
mod logger;
mod macros;
mod router;
mod utils;
mod writer;

#[cfg(test)]
mod testing;

// Public API
pub use builder::{LevelHandle, LoggerBuilder};
pub use config::{Config, DEFAULT_SERVICE_NAME, ForwardingConfig, level_filter};
pub use crate::core::{LogError, LogResult};
pub use format::JsonFormat;
pub use logger::{Backend, Field, Logger};
pub use router::{StreamRouter, Tier};
pub use utils::dedupe;

#[doc(hidden)]
pub mod __private {
    pub use serde_json::json;
}

/// Build a logger with every setting at its default
pub fn build() -> LogResult<Logger> {
    LoggerBuilder::new().build()
}

/// Build a logger from the environment and install it globally
///
/// See [`Config::from_env`] for the variables read.
pub fn init() -> LogResult<Logger> {
    init_with(Config::from_env())
}

/// Build a logger from `config` and install it globally
pub fn init_with(config: Config) -> LogResult<Logger> {
    let logger = LoggerBuilder::from_config(config).build()?;
    logger.backend().install_global()?;
    Ok(logger)
}
