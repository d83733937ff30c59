//! Telemetry initialization: structured logging via `tracing`.
//!
//! Log verbosity is controlled with the standard `RUST_LOG` environment variable
//! (e.g. `RUST_LOG=ladle=debug,tower_http=debug`), defaulting to `info`.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber with console output.
///
/// Safe to call once per process; repeated initialization (e.g. across tests)
/// returns an error from `try_init` which is surfaced to the caller.
pub fn init_telemetry() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;

    tracing::info!("Telemetry initialized");

    Ok(())
}
