//! `tracing` subscriber bootstrap for the binary.

use tracing_subscriber::EnvFilter;

/// Variable holding the log filter (`EnvFilter` syntax).
pub const LOG_ENV: &str = "FOURCUT_LOG";

/// Installs a stderr `fmt` subscriber filtered by [`LOG_ENV`], defaulting to
/// `info`.
///
/// # Errors
/// Fails when a global subscriber is already installed.
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
}
