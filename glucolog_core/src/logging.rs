//! Logging infrastructure.
//!
//! Centralized tracing setup for embedding applications. The engine itself
//! only emits `tracing` events; installing a subscriber is the host's call.

use tracing_subscriber::EnvFilter;

/// Initialize logging at the default INFO level
pub fn init() {
    init_with_level("info")
}

/// Initialize logging with a specific default level
///
/// The `RUST_LOG` environment variable still takes precedence when set.
pub fn init_with_level(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .compact()
        .init();
}

/// Initialize logging for testing (captures logs for test output)
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}
