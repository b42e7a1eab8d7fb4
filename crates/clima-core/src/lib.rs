pub mod config;
pub mod error;
pub mod fetch_state;

pub use config::{Config, ConfigIssue, ValidationResult, WeatherConfig, API_KEY_ENV};
pub use error::{AppError, ConfigError, WeatherError};
pub use fetch_state::FetchState;

use anyhow::Result;

/// Initialize logging for the application
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    tracing::info!("Clima core initialized");
    Ok(())
}
