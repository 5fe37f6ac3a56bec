//! Tracing subscriber setup

use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber, fmt, prelude::*};

/// Install the default subscriber.
///
/// Logs go to stderr so command output on stdout stays machine-readable.
/// The level comes from `RUST_LOG`, defaulting to "info".
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .compact();

    let filter_layer = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

/// Install a DEBUG-level subscriber for `--verbose`.
pub fn init_verbose() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .with_writer(std::io::stderr)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    tracing::debug!("Verbose mode enabled");
    Ok(())
}
