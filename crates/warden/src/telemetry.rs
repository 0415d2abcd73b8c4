//! Tracing subscriber setup.

use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins when set. Otherwise `verbose` selects `debug` for
/// everything and the default is `info,warden=debug`. `json` switches the
/// output to one JSON object per line.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_telemetry(verbose: bool, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info,warden=debug")
        }
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_target(false)))
        .try_init()?;

    info!(verbose, json, "Telemetry initialized");
    Ok(())
}
