//! Tracing subscriber setup for the Lambda binary.

use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

pub const DEFAULT_LOG_FILTER: &str = "info";

/// Builds the filter from `RUST_LOG`, falling back to `default_filter`.
pub fn env_filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
}

/// Initialize console logging for the Lambda runtime.
///
/// CloudWatch stamps every line itself, so timestamps and ANSI colors are
/// left out. Calling this more than once is harmless.
pub fn init() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .with_ansi(false)
                .with_target(true)
                .without_time(),
        )
        .with(env_filter(DEFAULT_LOG_FILTER))
        .try_init();
}
