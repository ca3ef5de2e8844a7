//! Log subscriber installation.

use tracing_subscriber::EnvFilter;

/// Installs a compact, timestamp-free `tracing` subscriber filtered by `RUST_LOG`
/// (default `warn`).
///
/// Does nothing when the host process already installed a global subscriber.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .without_time()
        .with_target(false)
        .with_ansi(true)
        .compact()
        .try_init();
    if installed.is_err() {
        tracing::debug!("global subscriber already installed");
    }
}
