//! Facade and backend loggers
//!
//! [`Backend`] owns the assembled `tracing` dispatcher. [`Logger`] is the
//! leveled facade over it: each call emits one record through the backend
//! carrying the logger's accumulated key/value pairs.

use std::fmt;
use std::panic::Location;
use std::sync::Arc;
#[cfg(feature = "sentry")]
use std::time::Duration;

use serde_json::Value;
use tracing::{Dispatch, Level};
use tracing_subscriber::filter::LevelFilter;

use crate::builder::LevelHandle;
use crate::core::LogResult;
use crate::format::{TARGET, encode_fields};

/// A key/value pair attached to a record
pub type Field = (String, Value);

/// The assembled backend
///
/// Cloning is cheap; clones share the dispatcher and the forwarding client.
/// The forwarding client is flushed and closed when the last clone drops.
#[derive(Clone)]
pub struct Backend {
    dispatch: Dispatch,
    inner: Arc<Inner>,
}

pub(crate) struct Inner {
    pub(crate) destinations: Vec<String>,
    pub(crate) split: bool,
    pub(crate) level: LevelHandle,
    #[cfg(feature = "sentry")]
    pub(crate) sentry_guard: Option<sentry::ClientInitGuard>,
}

impl fmt::Debug for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Backend")
            .field("destinations", &self.inner.destinations)
            .field("split", &self.inner.split)
            .field("level", &self.inner.level)
            .field("forwarding", &self.is_forwarding())
            .finish_non_exhaustive()
    }
}

impl Backend {
    pub(crate) fn new(dispatch: Dispatch, inner: Inner) -> Self {
        Self {
            dispatch,
            inner: Arc::new(inner),
        }
    }

    /// The dispatcher every record goes through.
    ///
    /// Plain `tracing` macros can target it with
    /// [`tracing::dispatcher::with_default`]; those records do not carry the
    /// facade's context fields.
    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    /// Deduplicated output paths derived from the configuration.
    ///
    /// Ignored for writing while [`is_split`](Self::is_split) is `true`.
    pub fn destinations(&self) -> &[String] {
        &self.inner.destinations
    }

    /// Whether records are split between stdout and stderr
    pub fn is_split(&self) -> bool {
        self.inner.split
    }

    /// Filter currently in effect; `TRACE` while the error stream is split
    pub fn level(&self) -> LevelFilter {
        self.inner.level.filter()
    }

    /// Change the level at runtime.
    ///
    /// While the error stream is split only the level string is recorded.
    ///
    /// # Errors
    /// Returns error if the dispatcher is gone
    pub fn set_level(&self, level: &str) -> LogResult<()> {
        self.inner.level.set(level)
    }

    /// Handle for changing the level from elsewhere
    pub fn level_handle(&self) -> LevelHandle {
        self.inner.level.clone()
    }

    /// Whether error records are forwarded to an enabled Sentry client
    pub fn is_forwarding(&self) -> bool {
        #[cfg(feature = "sentry")]
        {
            self.inner
                .sentry_guard
                .as_ref()
                .is_some_and(|guard| guard.is_enabled())
        }

        #[cfg(not(feature = "sentry"))]
        {
            false
        }
    }

    /// Wait up to `timeout` for forwarded events to be delivered.
    ///
    /// Returns `true` if the queue drained; always `true` without forwarding.
    #[cfg(feature = "sentry")]
    pub fn flush(&self, timeout: Duration) -> bool {
        self.inner
            .sentry_guard
            .as_ref()
            .is_none_or(|guard| guard.flush(Some(timeout)))
    }

    /// Install the dispatcher as the process-wide default.
    ///
    /// With the `log-compat` feature, records from the `log` crate are
    /// bridged as well.
    ///
    /// # Errors
    /// Returns error if a global default is already set
    pub fn install_global(&self) -> LogResult<()> {
        tracing::dispatcher::set_global_default(self.dispatch.clone())?;

        #[cfg(feature = "log-compat")]
        {
            let _ = tracing_log::LogTracer::init();
        }

        Ok(())
    }
}

/// Leveled logging facade
///
/// Records carry, in order: the fields attached with
/// [`with_values`](Self::with_values), then the call's own fields. The
/// `caller` key holds the `file:line` of the logging call.
#[derive(Clone, Debug)]
pub struct Logger {
    backend: Backend,
    name: String,
    fields: Arc<Vec<Field>>,
}

macro_rules! emit {
    ($level:expr, $name:expr, $caller:expr, $kv:expr, $msg:expr) => {
        match $level {
            Level::ERROR => tracing::event!(
                target: TARGET, Level::ERROR,
                logger.name = $name, logger.caller = $caller, logger.kv = $kv, "{}", $msg
            ),
            Level::WARN => tracing::event!(
                target: TARGET, Level::WARN,
                logger.name = $name, logger.caller = $caller, logger.kv = $kv, "{}", $msg
            ),
            Level::INFO => tracing::event!(
                target: TARGET, Level::INFO,
                logger.name = $name, logger.caller = $caller, logger.kv = $kv, "{}", $msg
            ),
            Level::DEBUG => tracing::event!(
                target: TARGET, Level::DEBUG,
                logger.name = $name, logger.caller = $caller, logger.kv = $kv, "{}", $msg
            ),
            _ => tracing::event!(
                target: TARGET, Level::TRACE,
                logger.name = $name, logger.caller = $caller, logger.kv = $kv, "{}", $msg
            ),
        }
    };
}

impl Logger {
    pub(crate) fn new(backend: Backend) -> Self {
        Self {
            backend,
            name: String::new(),
            fields: Arc::new(Vec::new()),
        }
    }

    /// The backend this facade writes through
    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    /// Logger name, empty if unnamed
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Key/value pairs attached to every record
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Returns a logger that also attaches `fields` to every record.
    ///
    /// Pairs are appended after the existing ones; keys are not deduplicated.
    #[must_use]
    pub fn with_values<I, K>(&self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let mut all = Vec::clone(&self.fields);
        all.extend(fields.into_iter().map(|(k, v)| (k.into(), v)));
        Self {
            backend: self.backend.clone(),
            name: self.name.clone(),
            fields: Arc::new(all),
        }
    }

    /// Returns a logger whose name has `name` appended, dot separated
    #[must_use]
    pub fn with_name(&self, name: &str) -> Self {
        let name = if self.name.is_empty() {
            name.to_string()
        } else {
            format!("{}.{name}", self.name)
        };
        Self {
            backend: self.backend.clone(),
            name,
            fields: Arc::clone(&self.fields),
        }
    }

    /// Whether records at `level` are written
    pub fn enabled(&self, level: Level) -> bool {
        level <= self.backend.level()
    }

    /// Log at debug level
    #[track_caller]
    pub fn debug(&self, msg: impl fmt::Display, fields: &[Field]) {
        self.log(Level::DEBUG, Location::caller(), &msg, fields, None);
    }

    /// Log at info level
    #[track_caller]
    pub fn info(&self, msg: impl fmt::Display, fields: &[Field]) {
        self.log(Level::INFO, Location::caller(), &msg, fields, None);
    }

    /// Log at warn level
    #[track_caller]
    pub fn warn(&self, msg: impl fmt::Display, fields: &[Field]) {
        self.log(Level::WARN, Location::caller(), &msg, fields, None);
    }

    /// Log at error level
    #[track_caller]
    pub fn error(&self, msg: impl fmt::Display, fields: &[Field]) {
        self.log(Level::ERROR, Location::caller(), &msg, fields, None);
    }

    /// Log at error level with the cause under the `error` key
    #[track_caller]
    pub fn error_cause(
        &self,
        err: &(dyn std::error::Error + 'static),
        msg: impl fmt::Display,
        fields: &[Field],
    ) {
        let cause = ("error".to_string(), Value::from(err.to_string()));
        self.log(Level::ERROR, Location::caller(), &msg, fields, Some(cause));
    }

    fn log(
        &self,
        level: Level,
        caller: &Location<'_>,
        msg: &dyn fmt::Display,
        fields: &[Field],
        extra: Option<Field>,
    ) {
        if !self.enabled(level) {
            return;
        }
        let kv = encode_fields(self.fields.iter().chain(fields).chain(extra.as_ref()));
        let caller = format!("{}:{}", caller.file(), caller.line());
        let name = self.name.as_str();
        tracing::dispatcher::with_default(&self.backend.dispatch, || {
            emit!(level, name, caller.as_str(), kv.as_str(), msg);
        });
    }
}
