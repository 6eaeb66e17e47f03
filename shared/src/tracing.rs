//! Initializes the global `tracing` subscriber for the binary.
use tracing_subscriber::{fmt, EnvFilter};

/// Sets up a `tracing_subscriber` that writes formatted events to stdout, filtered by `filter`
/// (a `tracing_subscriber::EnvFilter` directive string, e.g. the value of `LOG_FILTER`).
///
/// Must be called exactly once, before any other part of the binary logs.
pub fn initialize(filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .event_format(fmt::format().with_target(true))
        .init();
}
