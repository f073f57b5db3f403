//! Tracing subscriber configuration for the controller.
//!
//! Log levels follow these conventions:
//! - WARN: rules loaded with a subnet that can never match
//! - INFO: switches configured, rule sets replaced
//! - DEBUG: per-packet dispatch decisions
//! - TRACE: per-rule evaluation
//!
//! Output goes to stderr so command output on stdout stays machine-readable.

use tracing_subscriber::EnvFilter;

fn filter_or(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Initialize the tracing subscriber.
///
/// Log level can be controlled via the `RUST_LOG` environment variable and
/// falls back to `level` (the config's `[logging] level`) if not set.
pub fn init_with_level(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(filter_or(level))
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize the tracing subscriber with JSON output.
///
/// Activated by setting `RUST_LOG_FORMAT=json`.
pub fn init_json(level: &str) {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter_or(level))
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize the tracing subscriber for tests.
///
/// Uses `try_init` to avoid panicking if called multiple times.
pub fn init_for_tests() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter_or("debug"))
        .with_test_writer()
        .try_init();
}
