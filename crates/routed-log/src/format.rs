//! JSON record encoding
//!
//! [`JsonFormat`] is the one encoder every destination shares. A record is a
//! single JSON object per line:
//!
//! ```text
//! {"ts":"2024-05-01T12:00:00.000000Z","level":"info","logger":"api","caller":"src/main.rs:12","msg":"started","port":8080,"service":"billing"}
//! ```
//!
//! Fields recorded on the event come first, followed by the key/value pairs a
//! [`Logger`](crate::Logger) carries. Keys are never deduplicated.

use std::fmt;

use serde::ser::{SerializeMap, Serializer as _};
use serde_json::Value;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tracing::{
    Event, Level, Subscriber,
    field::{Field, Visit},
};
use tracing_subscriber::{
    fmt::{FmtContext, FormatEvent, FormatFields, format::Writer},
    registry::LookupSpan,
};

/// Target of every record emitted by the facade
pub(crate) const TARGET: &str = "routed_log";

/// Event field carrying the facade logger's name
pub(crate) const NAME_FIELD: &str = "logger.name";

/// Event field carrying the facade caller's `file:line`
pub(crate) const CALLER_FIELD: &str = "logger.caller";

/// Event field carrying the facade key/value pairs, encoded by [`encode_fields`]
pub(crate) const KV_FIELD: &str = "logger.kv";

const TIME_KEY: &str = "ts";
const LEVEL_KEY: &str = "level";
const NAME_KEY: &str = "logger";
const CALLER_KEY: &str = "caller";
const MESSAGE_KEY: &str = "msg";

/// Line-delimited JSON event format
#[derive(Debug, Clone, Copy)]
pub struct JsonFormat {
    timestamp: bool,
}

impl Default for JsonFormat {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonFormat {
    /// Create the format with timestamps enabled
    #[must_use]
    pub const fn new() -> Self {
        Self { timestamp: true }
    }

    /// Omit the `ts` key
    #[must_use]
    pub const fn without_timestamp(mut self) -> Self {
        self.timestamp = false;
        self
    }

    fn encode(&self, event: &Event<'_>) -> Result<Vec<u8>, serde_json::Error> {
        let meta = event.metadata();
        let mut visitor = JsonVisitor::new(meta.target() == TARGET);
        event.record(&mut visitor);

        let caller = visitor.caller.take().or_else(|| {
            meta.file()
                .zip(meta.line())
                .map(|(file, line)| format!("{file}:{line}"))
        });

        let mut buf = Vec::new();
        let mut serializer = serde_json::Serializer::new(&mut buf);
        let mut map = (&mut serializer).serialize_map(None)?;

        if self.timestamp {
            let now = OffsetDateTime::now_utc()
                .format(&Rfc3339)
                .map_err(<serde_json::Error as serde::ser::Error>::custom)?;
            map.serialize_entry(TIME_KEY, &now)?;
        }
        map.serialize_entry(LEVEL_KEY, level_name(meta.level()))?;
        if let Some(name) = visitor.name.as_deref().filter(|n| !n.is_empty()) {
            map.serialize_entry(NAME_KEY, name)?;
        }
        if let Some(caller) = &caller {
            map.serialize_entry(CALLER_KEY, caller)?;
        }
        map.serialize_entry(MESSAGE_KEY, visitor.message.as_deref().unwrap_or_default())?;
        for (key, value) in visitor.fields.iter().chain(&visitor.kv) {
            map.serialize_entry(key, value)?;
        }
        map.end()?;

        Ok(buf)
    }
}

impl<S, N> FormatEvent<S, N> for JsonFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let buf = self.encode(event).map_err(|_| fmt::Error)?;
        let line = String::from_utf8(buf).map_err(|_| fmt::Error)?;
        writeln!(writer, "{line}")
    }
}

/// Encode key/value pairs for the [`KV_FIELD`] event field.
///
/// Pairs are kept as an ordered list so duplicate keys survive the trip
/// through the event.
pub(crate) fn encode_fields<'a, I>(fields: I) -> String
where
    I: IntoIterator<Item = &'a (String, Value)>,
{
    let pairs: Vec<_> = fields.into_iter().collect();
    if pairs.is_empty() {
        return String::new();
    }
    serde_json::to_string(&pairs).unwrap_or_default()
}

fn level_name(level: &Level) -> &'static str {
    match *level {
        Level::TRACE => "trace",
        Level::DEBUG => "debug",
        Level::INFO => "info",
        Level::WARN => "warn",
        _ => "error",
    }
}

struct JsonVisitor {
    facade: bool,
    message: Option<String>,
    name: Option<String>,
    caller: Option<String>,
    kv: Vec<(String, Value)>,
    fields: Vec<(String, Value)>,
}

impl JsonVisitor {
    fn new(facade: bool) -> Self {
        Self {
            facade,
            message: None,
            name: None,
            caller: None,
            kv: Vec::new(),
            fields: Vec::new(),
        }
    }

    fn insert(&mut self, field: &Field, value: Value) {
        match field.name() {
            "message" => {
                self.message = Some(match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                });
            }
            // bridged `log` records carry their metadata as fields
            name if name.starts_with("log.") => {}
            name => self.fields.push((name.to_string(), value)),
        }
    }
}

impl Visit for JsonVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if !self.facade {
            self.insert(field, Value::from(value));
            return;
        }
        match field.name() {
            NAME_FIELD => self.name = Some(value.to_string()),
            CALLER_FIELD => self.caller = Some(value.to_string()),
            KV_FIELD if value.is_empty() => {}
            KV_FIELD => match serde_json::from_str(value) {
                Ok(kv) => self.kv = kv,
                Err(_) => self.insert(field, Value::from(value)),
            },
            _ => self.insert(field, Value::from(value)),
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, Value::from(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.insert(field, Value::from(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.insert(field, Value::from(format!("{value:?}")));
    }
}
