use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::TelemetrySettings;

/// Install the global subscriber. `RUST_LOG`, when set, replaces the
/// configured level.
pub fn init(settings: &TelemetrySettings) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&settings.log_level)
            .with_context(|| format!("invalid log level {:?}", settings.log_level))?,
    };

    let registry = tracing_subscriber::registry().with(filter);
    if settings.json {
        registry
            .with(fmt::layer().json().with_current_span(true))
            .try_init()?;
    } else {
        registry
            .with(fmt::layer().compact().with_target(false))
            .try_init()?;
    }
    Ok(())
}
