//! Logging setup for the `wecsub` binary.
//!
//! Log lines always go to stderr; stdout carries rendered subscriptions and
//! JSON output only.

use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter directives used when `RUST_LOG` is not set.
pub fn default_filter(level: &str) -> String {
    format!("wecsub={level},wecsub_core={level}")
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `default_filter`. With `log_json` every event is
/// written as one JSON object per line.
pub fn init_tracing(default_filter: &str, log_json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let fmt = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);
    let fmt = if log_json {
        fmt.json().boxed()
    } else {
        fmt.compact().boxed()
    };
    // A second call (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::registry().with(filter).with(fmt).try_init();
}
