//! Process-wide logging setup.

/// Subscriber configuration (filters, output format).
pub mod subscriber;

pub use subscriber::{LogFormat, ParseLogFormatError};

/// Initialize tracing/logging for the process.
///
/// Output format comes from `VOYAGE_LOG_FORMAT` (`json` by default,
/// `pretty` for humans); the filter from `RUST_LOG` (default `info`).
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    subscriber::init(LogFormat::from_env());
}
