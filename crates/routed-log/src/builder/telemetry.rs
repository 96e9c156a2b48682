//! Error forwarding setup (Sentry)

use std::sync::Arc;

use sentry::{ClientInitGuard, TransportFactory, protocol::Event};
use sentry_tracing::{EventFilter, SentryLayer};
use tracing::Subscriber;
use tracing_subscriber::registry::LookupSpan;

use crate::config::ForwardingConfig;

/// Initialize the Sentry client for `service`.
///
/// A placeholder DSN yields a disabled client: the layer stays in place but
/// nothing leaves the process.
pub(super) fn init_forwarding(
    config: &ForwardingConfig,
    service: &str,
    transport: Option<Arc<dyn TransportFactory>>,
) -> ClientInitGuard {
    let tag = service.to_string();

    sentry::init(sentry::ClientOptions {
        dsn: config.dsn.parse().ok(),
        environment: Some(config.environment.clone().into()),
        release: Some(config.release.clone().into()),
        server_name: Some(service.to_string().into()),
        attach_stacktrace: true,
        send_default_pii: false,
        transport,
        before_send: Some(Arc::new(move |mut event: Event<'static>| {
            event.tags.insert("service".to_string(), tag.clone());
            Some(event)
        })),
        ..Default::default()
    })
}

/// Layer forwarding errors as events and warnings as breadcrumbs
pub(super) fn forwarding_layer<S>() -> SentryLayer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    sentry_tracing::layer().event_filter(|md| match *md.level() {
        tracing::Level::ERROR => EventFilter::Event,
        tracing::Level::WARN => EventFilter::Breadcrumb,
        _ => EventFilter::Ignore,
    })
}
