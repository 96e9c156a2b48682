//! Configuration types
//!
//! This module provides the configuration for logger assembly, organized into:
//! - `base`: The [`Config`] struct and level mapping
//! - `forwarding`: External error forwarding configuration
//! - `presets`: Environment loading

mod base;
mod forwarding;
mod presets;

pub use base::{Config, DEFAULT_SERVICE_NAME, level_filter};
pub use forwarding::ForwardingConfig;
