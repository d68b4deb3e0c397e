//! Telemetry logic.
//! Support logging and metrics.

use metrics::Unit;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over `default_filter`.
pub fn setup_tracing(default_filter: &str) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init()
}

/// Describe metrics emitted by the client.
pub fn describe_metrics() {
    metrics::describe_counter!(
        "session_operations_total",
        Unit::Count,
        "Login, logout and identity refresh calls by outcome."
    );
    metrics::describe_counter!(
        "navigation_verdicts_total",
        Unit::Count,
        "Guard decisions by verdict."
    );
}
