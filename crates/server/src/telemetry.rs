use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber: bunyan-style JSON lines on stdout, filtered by
/// `RUST_LOG` or `default_filter` when it is unset.
///
/// A second call is a no-op, so tests may install it freely.
pub fn init_subscriber(name: &str, default_filter: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let formatting_layer = BunyanFormattingLayer::new(name.to_string(), std::io::stdout);

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(formatting_layer)
        .try_init();
}
