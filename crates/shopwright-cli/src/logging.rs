//! `tracing` subscriber setup

use crate::config::{LogFormat, Verbosity};
use tracing_subscriber::EnvFilter;

/// Filter from `RUST_LOG`, or the verbosity default when unset or invalid
#[must_use]
pub fn env_filter(verbosity: Verbosity) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(verbosity.log_filter()))
}

/// Install the global subscriber. Logs go to stderr so stdout stays clean
/// for `list` and `config` output.
///
/// Calling it twice is harmless; the second call keeps the first subscriber.
pub fn init(verbosity: Verbosity, format: LogFormat) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbosity))
        .with_writer(std::io::stderr)
        .with_target(false);
    let installed = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
