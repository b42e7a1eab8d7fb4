use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::QueryError;

/// Geographic coordinate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// What to fetch a forecast for.
#[derive(Debug, Clone, PartialEq)]
pub enum ForecastQuery {
    /// Free-text place name, e.g. "San Sebastián"
    Place(String),
    /// A point picked on the map
    Coordinates(Coordinates),
}

impl ForecastQuery {
    /// Build a place query. The name is trimmed and must not be empty.
    pub fn place(name: &str) -> Result<Self, QueryError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(QueryError::EmptyPlace);
        }
        Ok(Self::Place(name.to_string()))
    }

    /// Build a coordinate query, rejecting points outside the globe.
    pub fn coordinates(latitude: f64, longitude: f64) -> Result<Self, QueryError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(QueryError::LatitudeOutOfRange(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(QueryError::LongitudeOutOfRange(longitude));
        }
        Ok(Self::Coordinates(Coordinates {
            latitude,
            longitude,
        }))
    }
}

impl std::fmt::Display for ForecastQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Place(name) => write!(f, "{}", name),
            Self::Coordinates(c) => write!(f, "{:.4}, {:.4}", c.latitude, c.longitude),
        }
    }
}

/// One 3-hour forecast point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    /// Epoch seconds (UTC)
    pub timestamp: i64,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: u8,
    /// Meters per second
    pub wind_speed: f64,
    pub description: String,
    pub icon: String,
}

/// Decoded forecast for a single query.
///
/// `entries` is never empty for a value returned by the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastResponse {
    pub entries: Vec<ForecastEntry>,
    pub city_name: Option<String>,
    pub coordinates: Option<Coordinates>,
}

/// All entries sharing one calendar date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayGroup {
    pub date: NaiveDate,
    pub entries: Vec<ForecastEntry>,
    pub min_temp: f64,
    pub max_temp: f64,
    pub icon: String,
    pub description: String,
}

/// One row of the hourly detail view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyRow {
    /// Local time of day, "HH:MM"
    pub time: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: u8,
    pub wind_speed: f64,
    pub description: String,
    pub icon: String,
}

// Wire format of the OpenWeatherMap 5 day / 3 hour forecast endpoint.

#[derive(Debug, Deserialize)]
pub(crate) struct ApiForecast {
    #[serde(default)]
    pub list: Option<Vec<ApiEntry>>,
    pub city: Option<ApiCity>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiEntry {
    pub dt: i64,
    pub main: ApiMain,
    #[serde(default)]
    pub weather: Vec<ApiWeather>,
    pub wind: Option<ApiWind>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiMain {
    pub temp: f64,
    pub feels_like: f64,
    #[serde(default)]
    pub humidity: u8,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiWeather {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiWind {
    #[serde(default)]
    pub speed: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiCity {
    pub name: Option<String>,
    pub coord: Option<ApiCoord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiCoord {
    pub lat: f64,
    pub lon: f64,
}

impl From<ApiEntry> for ForecastEntry {
    fn from(api: ApiEntry) -> Self {
        let (description, icon) = api
            .weather
            .into_iter()
            .next()
            .map(|w| (w.description, w.icon))
            .unwrap_or_default();

        Self {
            timestamp: api.dt,
            temperature: api.main.temp,
            feels_like: api.main.feels_like,
            humidity: api.main.humidity,
            wind_speed: api.wind.map(|w| w.speed).unwrap_or(0.0),
            description,
            icon,
        }
    }
}
