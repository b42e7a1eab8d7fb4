//! Centralized application services with mutable state support.
//!
//! `AppServices` holds the tokio runtime and the shared forecast client.
//! The client sits behind an RwLock so it can be rebuilt when settings
//! change without restarting the application.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;

use clima_core::{AppError, Config, ConfigError, WeatherConfig};
use clima_weather::{ForecastClient, ForecastClientConfig, GroupingZone};

use crate::services::ForecastServiceError;

/// Application services container.
pub struct AppServices {
    /// Owned runtime; `None` when embedded in a caller's runtime
    _runtime: Option<tokio::runtime::Runtime>,

    handle: tokio::runtime::Handle,

    /// Forecast API client (absent until configured)
    forecast_client: RwLock<Option<Arc<ForecastClient>>>,

    /// Timezone used to group entries into days
    grouping_zone: RwLock<GroupingZone>,
}

impl AppServices {
    /// Create services with a dedicated multi-threaded runtime.
    pub fn new() -> Result<Arc<Self>, AppError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("clima-tokio")
            .build()?;
        let handle = runtime.handle().clone();

        Ok(Arc::new(Self::build(Some(runtime), handle)))
    }

    /// Create services that spawn onto an existing runtime.
    pub fn with_handle(handle: tokio::runtime::Handle) -> Arc<Self> {
        Arc::new(Self::build(None, handle))
    }

    /// Create services and configure the forecast client from `config`.
    pub fn from_config(config: &Config) -> Result<Arc<Self>, AppError> {
        let services = Self::new()?;
        services.configure(&config.weather)?;
        Ok(services)
    }

    fn build(runtime: Option<tokio::runtime::Runtime>, handle: tokio::runtime::Handle) -> Self {
        Self {
            _runtime: runtime,
            handle,
            forecast_client: RwLock::new(None),
            grouping_zone: RwLock::new(GroupingZone::Local),
        }
    }

    /// (Re)build the forecast client and grouping zone from weather settings.
    pub fn configure(&self, weather: &WeatherConfig) -> Result<(), AppError> {
        let zone = GroupingZone::from_name(weather.timezone.as_deref())
            .map_err(|e| AppError::Config(ConfigError::Invalid(e)))?;

        let client_config = ForecastClientConfig {
            base_url: weather.base_url.clone(),
            api_key: weather.effective_api_key(),
            lang: weather.lang.clone(),
            timeout: Duration::from_secs(weather.timeout_secs),
        };
        let client = ForecastClient::new(client_config)
            .map_err(|e| AppError::from(ForecastServiceError::Fetch(e)))?;

        self.set_forecast_client(client);
        self.set_grouping_zone(zone);
        tracing::info!("Forecast services configured (grouping zone: {})", zone);
        Ok(())
    }

    /// Get the tokio runtime handle.
    pub fn runtime(&self) -> tokio::runtime::Handle {
        self.handle.clone()
    }

    pub fn forecast_client(&self) -> Option<Arc<ForecastClient>> {
        self.forecast_client.read().clone()
    }

    pub fn set_forecast_client(&self, client: ForecastClient) {
        *self.forecast_client.write() = Some(Arc::new(client));
    }

    pub fn grouping_zone(&self) -> GroupingZone {
        *self.grouping_zone.read()
    }

    pub fn set_grouping_zone(&self, zone: GroupingZone) {
        *self.grouping_zone.write() = zone;
    }

    /// Drop the forecast client; later fetches report NotInitialized.
    pub fn shutdown(&self) {
        tracing::info!("AppServices shutdown initiated");
        *self.forecast_client.write() = None;
    }
}
