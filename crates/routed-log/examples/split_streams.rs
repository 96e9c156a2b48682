//! Error records on stderr, everything else on stdout.
//!
//! ```sh
//! cargo run --example split_streams 2>/dev/null   # only info/warn
//! cargo run --example split_streams 1>/dev/null   # only errors
//! ```

use routed_log::{LoggerBuilder, fields};
use serde_json::Value;

fn main() -> routed_log::LogResult<()> {
    let logger = LoggerBuilder::new()
        .level("debug")
        .service_name("examples/split-streams")
        .context_fields([("region", Value::from("eu-west-1"))])
        .split_error_stream(true)
        .build()?;

    logger.debug("starting", &[]);
    logger.info("listening", &fields! { "port" => 8080 });
    logger
        .with_name("worker")
        .warn("queue is filling up", &fields! { "depth" => 950 });
    logger.error("upstream unavailable", &fields! { "upstream" => "payments" });

    Ok(())
}
