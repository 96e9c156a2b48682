//! Logger builder implementation
//!
//! This module is organized into:
//! - `reload`: Runtime level changes
//! - `telemetry`: Sentry forwarding setup
//!
//! [`LoggerBuilder::build`] is a one-shot pipeline: derive the level filter
//! and destinations from the finished [`Config`], pick the writer (output
//! paths or the stream router), assemble the subscriber, optionally layer on
//! error forwarding, then wrap everything in the facade with the context
//! fields and a trailing `service` pair.
//!
//! With the error stream split, the router alone decides where records go:
//! every record lands on one of the two streams whatever the level says.

mod reload;
#[cfg(feature = "sentry")]
mod telemetry;

// Re-export public types
pub use reload::LevelHandle;

// Standard library
use std::io;
#[cfg(feature = "sentry")]
use std::sync::Arc;
use std::sync::Mutex;

// External dependencies
use serde_json::Value;
use tracing::Dispatch;
use tracing_subscriber::{Registry, fmt::writer::BoxMakeWriter, layer::SubscriberExt};

// Internal crates
use crate::{
    config::{Config, ForwardingConfig},
    core::LogResult,
    format::JsonFormat,
    logger::{Backend, Inner, Logger},
    router::StreamRouter,
    utils::dedupe,
    writer,
};

/// Logger builder
///
/// Each setter records one change; later calls override earlier ones, except
/// [`context_fields`](Self::context_fields), which appends.
pub struct LoggerBuilder {
    config: Config,
    split_writers: Option<(BoxMakeWriter, BoxMakeWriter)>,
    #[cfg(feature = "sentry")]
    transport: Option<Arc<dyn sentry::TransportFactory>>,
}

impl std::fmt::Debug for LoggerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggerBuilder")
            .field("config", &self.config)
            .field("custom_split_writers", &self.split_writers.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LoggerBuilder {
    /// Create a builder with the default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::from_config(Config::default())
    }

    /// Create builder from config
    #[must_use]
    pub fn from_config(config: Config) -> Self {
        Self {
            config,
            split_writers: None,
            #[cfg(feature = "sentry")]
            transport: None,
        }
    }

    /// Set the level; only `"debug"` is recognized, anything else means info
    pub fn level(mut self, level: impl Into<String>) -> Self {
        self.config.level = level.into();
        self
    }

    /// Set the output paths; duplicates are removed at build time
    pub fn output_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.output_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Set the service name attached to every record
    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.config.service_name = name.into();
        self
    }

    /// Append key/value pairs attached to every record
    pub fn context_fields<I, K>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        self.config
            .context_fields
            .extend(fields.into_iter().map(|(k, v)| (k.into(), v)));
        self
    }

    /// Send error records to stderr and everything else to stdout.
    ///
    /// Replaces the output paths for writing. The level no longer filters:
    /// every record reaches one of the two streams.
    pub fn split_error_stream(mut self, enable: bool) -> Self {
        self.config.split_error_stream = enable;
        self
    }

    /// Use custom streams instead of stdout/stderr when splitting.
    ///
    /// Each writer is placed behind its own lock. Has no effect unless
    /// [`split_error_stream`](Self::split_error_stream) is enabled.
    pub fn split_writers<N, E>(mut self, normal: N, error: E) -> Self
    where
        N: io::Write + Send + 'static,
        E: io::Write + Send + 'static,
    {
        self.split_writers = Some((
            BoxMakeWriter::new(Mutex::new(normal)),
            BoxMakeWriter::new(Mutex::new(error)),
        ));
        self
    }

    /// Forward error records to Sentry
    pub fn forward_errors(mut self, enable: bool) -> Self {
        self.config.forward_errors = enable;
        self
    }

    /// Set the Sentry DSN, environment and release
    pub fn forwarding(mut self, forwarding: ForwardingConfig) -> Self {
        self.config.forwarding = forwarding;
        self
    }

    /// Use a custom Sentry transport
    #[cfg(feature = "sentry")]
    pub fn forwarding_transport(mut self, factory: impl sentry::TransportFactory + 'static) -> Self {
        self.transport = Some(Arc::new(factory));
        self
    }

    /// The configuration as it stands
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build the logger
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Backend`](crate::LogError::Backend) if an output
    /// path cannot be opened. Output paths are opened even when the error
    /// stream is split, so a bad path is reported either way.
    pub fn build(self) -> LogResult<Logger> {
        let Self {
            config,
            split_writers,
            #[cfg(feature = "sentry")]
            transport,
        } = self;

        let destinations = dedupe(config.output_paths.iter().map(String::as_str));
        let path_writer = writer::make_writer(&destinations)?;

        let writer = if config.split_error_stream {
            match split_writers {
                Some((normal, error)) => BoxMakeWriter::new(StreamRouter::new(normal, error)),
                None => BoxMakeWriter::new(StreamRouter::stdio()),
            }
        } else {
            path_writer
        };

        let (level_layer, level) =
            reload::create_level_layer(&config.level, !config.split_error_stream);
        let fmt_layer = tracing_subscriber::fmt::layer()
            .event_format(JsonFormat::new())
            .with_writer(writer);
        let subscriber = Registry::default().with(level_layer).with(fmt_layer);

        #[cfg(feature = "sentry")]
        let (subscriber, sentry_guard) = if config.forward_errors {
            let guard =
                telemetry::init_forwarding(&config.forwarding, &config.service_name, transport);
            (subscriber.with(Some(telemetry::forwarding_layer())), Some(guard))
        } else {
            (subscriber.with(None), None)
        };

        let dispatch = Dispatch::new(subscriber);

        #[cfg(not(feature = "sentry"))]
        {
            if config.forward_errors {
                tracing::dispatcher::with_default(&dispatch, || {
                    tracing::warn!("error forwarding requested but the `sentry` feature is disabled");
                });
            }
        }

        let backend = Backend::new(
            dispatch,
            Inner {
                destinations,
                split: config.split_error_stream,
                level,
                #[cfg(feature = "sentry")]
                sentry_guard,
            },
        );

        let mut fields = config.context_fields;
        fields.push(("service".to_string(), Value::from(config.service_name)));

        Ok(Logger::new(backend).with_values(fields))
    }
}
