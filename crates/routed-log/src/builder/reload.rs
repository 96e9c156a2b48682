//! Runtime level changes
//!
//! While the error stream is split, the router's two tiers decide where every
//! record goes and no level gate sits in front of them. The handle still
//! records the configured level string in that mode.

use arc_swap::ArcSwap;
use std::sync::Arc;
use tracing_subscriber::{Registry, filter::LevelFilter, reload};

use crate::config::level_filter;
use crate::core::LogResult;

/// Handle for changing a built logger's level
#[derive(Clone)]
pub struct LevelHandle {
    filter: reload::Handle<LevelFilter, Registry>,
    /// Level string last applied
    current: Arc<ArcSwap<String>>,
    gated: bool,
}

impl std::fmt::Debug for LevelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LevelHandle")
            .field("current", &self.current.load())
            .field("gated", &self.gated)
            .finish_non_exhaustive()
    }
}

impl LevelHandle {
    /// Swap the level, using the same mapping as the initial configuration.
    ///
    /// Ungated handles only record the new string.
    ///
    /// # Errors
    /// Returns error if the backend has been dropped
    pub fn set(&self, level: &str) -> LogResult<()> {
        if self.gated {
            self.filter.reload(level_filter(level))?;
        }
        self.current.store(Arc::new(level.to_string()));
        Ok(())
    }

    /// The level string last applied
    pub fn current(&self) -> Arc<String> {
        self.current.load_full()
    }

    /// The filter currently in effect
    pub fn filter(&self) -> LevelFilter {
        self.filter
            .clone_current()
            .unwrap_or_else(|| self.initial(&self.current.load()))
    }

    /// Whether the level string filters records
    pub fn is_gated(&self) -> bool {
        self.gated
    }

    fn initial(&self, level: &str) -> LevelFilter {
        if self.gated {
            level_filter(level)
        } else {
            LevelFilter::TRACE
        }
    }
}

/// Create the reloadable level layer and its handle.
///
/// An ungated layer lets every record through whatever `level` says.
pub(super) fn create_level_layer(
    level: &str,
    gated: bool,
) -> (reload::Layer<LevelFilter, Registry>, LevelHandle) {
    let filter = if gated {
        level_filter(level)
    } else {
        LevelFilter::TRACE
    };
    let (layer, handle) = reload::Layer::new(filter);
    let handle = LevelHandle {
        filter: handle,
        current: Arc::new(ArcSwap::from_pointee(level.to_string())),
        gated,
    };
    (layer, handle)
}
