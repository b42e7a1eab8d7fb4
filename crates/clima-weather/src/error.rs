//! Forecast-specific error types.

use thiserror::Error;

/// Failure of a single forecast fetch. None of these are retried.
#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("Location not found")]
    NotFound,

    #[error("Forecast service returned HTTP {status}")]
    UpstreamError { status: u16 },

    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("Forecast service returned no forecast entries")]
    EmptyResult,
}

impl From<reqwest::Error> for ForecastError {
    fn from(e: reqwest::Error) -> Self {
        Self::TransportError(e.to_string())
    }
}

/// Rejected query input. Raised before any request is made.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("Place name is empty")]
    EmptyPlace,

    #[error("Latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("Longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),
}
