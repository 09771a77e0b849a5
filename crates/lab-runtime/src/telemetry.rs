//! Logging setup.

use crate::config::LoggingConfig;
use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Builds the filter: `RUST_LOG` if set, otherwise the configured level.
pub fn env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .with_context(|| format!("invalid log filter {:?}", config.level))
}

/// Installs the global subscriber.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = env_filter(config)?;
    if config.json {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }
    Ok(())
}
