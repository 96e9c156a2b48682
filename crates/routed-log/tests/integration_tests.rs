//! Integration tests for routed-log
//!
//! These tests drive the public builder end to end and inspect what lands on
//! each destination.

use std::io;
use std::sync::{Arc, Mutex};

use routed_log::{Config, LogError, LoggerBuilder, fields};
use serde_json::Value;
use tracing_subscriber::filter::LevelFilter;

/// Cloneable in-memory stream
#[derive(Clone, Default)]
struct Stream(Arc<Mutex<Vec<u8>>>);

impl Stream {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    fn records(&self) -> Vec<Value> {
        self.contents()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }
}

impl io::Write for Stream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn read_records(path: &std::path::Path) -> Vec<Value> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn default_logger_tags_records_with_placeholder_service() {
    let logger = routed_log::build().unwrap();

    assert_eq!(logger.backend().level(), LevelFilter::INFO);
    assert_eq!(logger.backend().destinations(), ["stdout".to_string()]);
    assert_eq!(logger.fields().last().unwrap().1, "not/set");
}

#[test]
fn file_destination_receives_context_and_service() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.log");

    let logger = LoggerBuilder::new()
        .output_paths([path.display().to_string()])
        .service_name("x")
        .context_fields([("a", Value::from(1))])
        .build()
        .unwrap();

    logger.info("first", &[]);
    logger.warn("second", &fields! { "attempt" => 2 });
    logger.debug("dropped at info", &[]);

    let records = read_records(&path);
    assert_eq!(records.len(), 2);
    for record in &records {
        assert_eq!(record["a"], 1);
        assert_eq!(record["service"], "x");
        assert!(record["ts"].is_string());
    }
    assert_eq!(records[0]["level"], "info");
    assert_eq!(records[0]["msg"], "first");
    assert_eq!(records[1]["level"], "warn");
    assert_eq!(records[1]["attempt"], 2);

    let line = std::fs::read_to_string(&path).unwrap();
    let first = line.lines().next().unwrap();
    assert!(first.find("\"a\":1").unwrap() < first.find("\"service\":\"x\"").unwrap());
}

#[test]
fn duplicate_paths_write_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("once.log").display().to_string();

    let logger = LoggerBuilder::new()
        .output_paths([path.clone(), path.clone()])
        .build()
        .unwrap();
    logger.info("single", &[]);

    assert_eq!(logger.backend().destinations(), [path.clone()]);
    assert_eq!(read_records(std::path::Path::new(&path)).len(), 1);
}

#[test]
fn split_stream_ignores_output_paths() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("unused.log");
    let normal = Stream::default();
    let error = Stream::default();

    let logger = LoggerBuilder::new()
        .output_paths([path.display().to_string()])
        .split_error_stream(true)
        .split_writers(normal.clone(), error.clone())
        .build()
        .unwrap();

    logger.info("to normal", &[]);
    logger.warn("also normal", &[]);
    logger.error("to error", &[]);

    let normal = normal.records();
    let error = error.records();
    assert_eq!(normal.len(), 2);
    assert!(normal.iter().all(|r| r["level"] != "error"));
    assert_eq!(error.len(), 1);
    assert_eq!(error[0]["msg"], "to error");
    assert_eq!(error[0]["service"], "not/set");

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
}

#[test]
fn with_values_and_with_name_layer_on_top() {
    let normal = Stream::default();
    let logger = LoggerBuilder::new()
        .output_paths(Vec::<String>::new())
        .split_error_stream(true)
        .split_writers(normal.clone(), io::sink())
        .service_name("svc")
        .build()
        .unwrap();

    let request = logger
        .with_name("http")
        .with_name("server")
        .with_values(fields! { "request_id" => "r-1" });
    request.info("handled", &fields! { "status" => 200 });

    let line = normal.contents();
    assert_eq!(
        serde_json::from_str::<Value>(line.trim_end()).unwrap()["logger"],
        "http.server"
    );
    let service = line.find("\"service\":\"svc\"").unwrap();
    let request_id = line.find("\"request_id\":\"r-1\"").unwrap();
    let status = line.find("\"status\":200").unwrap();
    assert!(service < request_id && request_id < status, "{line}");

    // the parent logger is unchanged
    assert_eq!(logger.fields().len(), 1);
    assert_eq!(logger.name(), "");
}

#[test]
fn error_cause_and_log_error_macro() {
    let error = Stream::default();
    let logger = LoggerBuilder::new()
        .output_paths(Vec::<String>::new())
        .split_error_stream(true)
        .split_writers(io::sink(), error.clone())
        .build()
        .unwrap();

    let cause = io::Error::new(io::ErrorKind::ConnectionRefused, "db unreachable");
    logger.error_cause(&cause, "query failed", &fields! { "table" => "users" });

    let returned = routed_log::log_error!(
        logger,
        io::Error::other("disk full"),
        "write failed",
        "path" => "/var/data"
    );
    assert_eq!(returned.to_string(), "disk full");

    let records = error.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["error"], "db unreachable");
    assert_eq!(records[0]["table"], "users");
    assert_eq!(records[1]["msg"], "write failed");
    assert_eq!(records[1]["error"], "disk full");
    assert_eq!(records[1]["path"], "/var/data");
}

#[test]
fn runtime_level_change() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("levels.log");
    let logger = LoggerBuilder::new()
        .output_paths([path.display().to_string()])
        .build()
        .unwrap();

    logger.debug("before", &[]);
    logger.backend().set_level("debug").unwrap();
    assert_eq!(logger.backend().level(), LevelFilter::DEBUG);
    assert_eq!(logger.backend().level_handle().current().as_str(), "debug");
    logger.debug("after", &[]);
    logger.backend().set_level("nonsense").unwrap();
    logger.debug("hidden again", &[]);

    let msgs: Vec<_> = read_records(&path).into_iter().map(|r| r["msg"].clone()).collect();
    assert_eq!(msgs, vec!["after"]);
}

#[test]
fn split_stream_writes_every_level() {
    let normal = Stream::default();
    let error = Stream::default();
    let logger = LoggerBuilder::new()
        .output_paths(Vec::<String>::new())
        .level("info")
        .split_error_stream(true)
        .split_writers(normal.clone(), error.clone())
        .build()
        .unwrap();

    logger.debug("debug at info level", &[]);
    logger.backend().set_level("info").unwrap();
    logger.debug("still written", &[]);
    logger.error("failed", &[]);

    let levels: Vec<_> = normal.records().into_iter().map(|r| r["level"].clone()).collect();
    assert_eq!(levels, vec!["debug", "debug"]);
    assert_eq!(error.records().len(), 1);
}

#[test]
fn caller_points_at_the_logging_call() {
    let error = Stream::default();
    let logger = LoggerBuilder::new()
        .output_paths(Vec::<String>::new())
        .split_error_stream(true)
        .split_writers(io::sink(), error.clone())
        .build()
        .unwrap();

    let first = line!() + 1;
    logger.with_name("db").error("lost connection", &[]);
    let second = line!() + 1;
    routed_log::log_error!(logger, io::Error::other("timeout"), "retry failed");

    let records = error.records();
    assert_eq!(records[0]["caller"], format!("{}:{first}", file!()));
    assert_eq!(records[1]["caller"], format!("{}:{second}", file!()));
    assert!(records[0]["caller"].as_str().unwrap().contains("integration_tests.rs"));
}

#[test]
fn plain_tracing_events_through_backend_skip_context() {
    let normal = Stream::default();
    let logger = LoggerBuilder::new()
        .output_paths(Vec::<String>::new())
        .split_error_stream(true)
        .split_writers(normal.clone(), io::sink())
        .service_name("svc")
        .build()
        .unwrap();

    tracing::dispatcher::with_default(logger.backend().dispatch(), || {
        tracing::info!(port = 8080, "direct");
    });

    let records = normal.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["port"], 8080);
    assert!(records[0].get("service").is_none());
    assert!(records[0]["caller"].as_str().unwrap().contains("integration_tests.rs"));
}

#[test]
fn invalid_destination_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "").unwrap();
    let bad = blocker.join("app.log").display().to_string();

    let err = LoggerBuilder::new()
        .output_paths(["stdout".to_string(), bad.clone()])
        .build()
        .unwrap_err();

    match &err {
        LogError::Backend { destination, .. } => assert_eq!(destination, &bad),
        other => panic!("unexpected error: {other}"),
    }
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn builder_from_config_matches_setters() {
    let config: Config = serde_json::from_value(serde_json::json!({
        "level": "debug",
        "output_paths": [],
        "service_name": "from-config",
        "context_fields": [["zone", "b"]],
    }))
    .unwrap();

    let logger = LoggerBuilder::from_config(config).build().unwrap();
    assert_eq!(logger.backend().level(), LevelFilter::DEBUG);
    assert!(logger.backend().destinations().is_empty());
    assert_eq!(
        logger.fields(),
        [
            ("zone".to_string(), Value::from("b")),
            ("service".to_string(), Value::from("from-config")),
        ]
    );
}

#[cfg(feature = "sentry")]
mod forwarding {
    use super::*;
    use routed_log::ForwardingConfig;
    use sentry::test::TestTransport;

    const DSN: &str = "https://public@sentry.invalid/1";

    #[test]
    fn errors_are_forwarded_with_service_tag() {
        let transport = TestTransport::new();
        let normal = Stream::default();
        let error = Stream::default();

        let logger = LoggerBuilder::new()
            .output_paths(Vec::<String>::new())
            .split_error_stream(true)
            .split_writers(normal.clone(), error.clone())
            .service_name("billing")
            .forward_errors(true)
            .forwarding(
                ForwardingConfig::new(DSN)
                    .with_environment("staging")
                    .with_release("2.0.0"),
            )
            .forwarding_transport(transport.clone())
            .build()
            .unwrap();
        assert!(logger.backend().is_forwarding());

        logger.info("fine", &[]);
        logger.error("payment failed", &fields! { "order" => 7 });

        let events = transport.fetch_and_clear_events();
        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.message.as_deref(), Some("payment failed"));
        assert_eq!(event.level, sentry::Level::Error);
        assert_eq!(event.tags.get("service").map(String::as_str), Some("billing"));
        assert_eq!(event.environment.as_deref(), Some("staging"));
        assert_eq!(event.release.as_deref(), Some("2.0.0"));

        // forwarding is additive
        assert_eq!(normal.records().len(), 1);
        assert_eq!(error.records().len(), 1);
        assert!(logger.backend().flush(std::time::Duration::from_secs(1)));
    }

    #[test]
    fn placeholder_config_forwards_nothing() {
        let logger = LoggerBuilder::new()
            .output_paths(Vec::<String>::new())
            .forward_errors(true)
            .build()
            .unwrap();

        assert!(!logger.backend().is_forwarding());
        logger.error("goes nowhere", &[]);
    }

    #[test]
    fn disabled_forwarding_sends_nothing() {
        let transport = TestTransport::new();
        let logger = LoggerBuilder::new()
            .output_paths(Vec::<String>::new())
            .forwarding(ForwardingConfig::new(DSN))
            .forwarding_transport(transport.clone())
            .build()
            .unwrap();

        logger.error("local only", &[]);
        assert!(!logger.backend().is_forwarding());
        assert!(transport.fetch_and_clear_events().is_empty());
    }
}
