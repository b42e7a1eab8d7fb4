//! OpenWeatherMap 5 day / 3 hour forecast client.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::instrument;

use crate::error::ForecastError;
use crate::types::{ApiForecast, Coordinates, ForecastEntry, ForecastQuery, ForecastResponse};

pub const DEFAULT_FORECAST_URL: &str = "https://api.openweathermap.org/data/2.5/forecast";
pub const DEFAULT_LANG: &str = "es";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
const UNITS: &str = "metric";
const USER_AGENT: &str = concat!("clima/", env!("CARGO_PKG_VERSION"));

/// Connection settings for [`ForecastClient`]
#[derive(Debug, Clone)]
pub struct ForecastClientConfig {
    /// Forecast endpoint, without query string
    pub base_url: String,
    pub api_key: String,
    /// Language for weather descriptions
    pub lang: String,
    pub timeout: Duration,
}

impl ForecastClientConfig {
    /// Default endpoint, language and timeout for the given key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_FORECAST_URL.to_string(),
            api_key: api_key.into(),
            lang: DEFAULT_LANG.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Debug, Clone)]
pub struct ForecastClient {
    client: Arc<Client>,
    config: ForecastClientConfig,
}

impl ForecastClient {
    pub fn new(config: ForecastClientConfig) -> Result<Self, ForecastError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            config,
        })
    }

    pub fn config(&self) -> &ForecastClientConfig {
        &self.config
    }

    /// Fetch the forecast for whichever form the query takes.
    pub async fn fetch(&self, query: &ForecastQuery) -> Result<ForecastResponse, ForecastError> {
        match query {
            ForecastQuery::Place(name) => self.fetch_by_place(name).await,
            ForecastQuery::Coordinates(c) => self.fetch_by_coordinates(c.latitude, c.longitude).await,
        }
    }

    /// Fetch the forecast for a free-text place name.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch_by_place(&self, name: &str) -> Result<ForecastResponse, ForecastError> {
        let url = format!(
            "{}?q={}&{}",
            self.config.base_url,
            urlencoding::encode(name),
            self.common_params(),
        );
        self.get(&url).await
    }

    /// Fetch the forecast for a point on the map.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch_by_coordinates(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<ForecastResponse, ForecastError> {
        let url = format!(
            "{}?lat={}&lon={}&{}",
            self.config.base_url,
            lat,
            lon,
            self.common_params(),
        );
        self.get(&url).await
    }

    fn common_params(&self) -> String {
        format!(
            "appid={}&units={}&lang={}",
            urlencoding::encode(&self.config.api_key),
            UNITS,
            urlencoding::encode(&self.config.lang),
        )
    }

    async fn get(&self, url: &str) -> Result<ForecastResponse, ForecastError> {
        tracing::debug!("GET {}", redact_key(url));

        let response = self.client.get(url).send().await?;
        let response = self.handle_response(response).await?;

        tracing::info!(
            "Fetched {} forecast entries for {}",
            response.entries.len(),
            response.city_name.as_deref().unwrap_or("unnamed location")
        );
        Ok(response)
    }

    async fn handle_response(
        &self,
        response: reqwest::Response,
    ) -> Result<ForecastResponse, ForecastError> {
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(ForecastError::NotFound);
        }
        if status != StatusCode::OK {
            return Err(ForecastError::UpstreamError {
                status: status.as_u16(),
            });
        }

        let body: ApiForecast = response
            .json()
            .await
            .map_err(|e| ForecastError::TransportError(format!("JSON parse error: {}", e)))?;

        decode(body)
    }
}

/// Turn the wire payload into a validated response.
pub(crate) fn decode(body: ApiForecast) -> Result<ForecastResponse, ForecastError> {
    let entries: Vec<ForecastEntry> = body
        .list
        .unwrap_or_default()
        .into_iter()
        .map(ForecastEntry::from)
        .collect();

    if entries.is_empty() {
        return Err(ForecastError::EmptyResult);
    }

    if entries.windows(2).any(|w| w[1].timestamp < w[0].timestamp) {
        tracing::warn!("Forecast entries are not in ascending timestamp order");
    }

    let (city_name, coordinates) = match body.city {
        Some(city) => (
            city.name.filter(|n| !n.trim().is_empty()),
            city.coord.map(|c| Coordinates {
                latitude: c.lat,
                longitude: c.lon,
            }),
        ),
        None => (None, None),
    };

    Ok(ForecastResponse {
        entries,
        city_name,
        coordinates,
    })
}

/// Hide the API key when a URL is logged.
fn redact_key(url: &str) -> String {
    match url.find("appid=") {
        Some(start) => {
            let value_start = start + "appid=".len();
            let value_end = url[value_start..]
                .find('&')
                .map(|i| value_start + i)
                .unwrap_or(url.len());
            format!("{}***{}", &url[..value_start], &url[value_end..])
        }
        None => url.to_string(),
    }
}
