//! Core types shared across the crate.
//!
//! ### [`error`] - Error handling
//! The [`LogError`] enum and the [`LogResult`] alias returned by every
//! fallible operation.

pub mod error;

pub use error::{LogError, LogResult};
