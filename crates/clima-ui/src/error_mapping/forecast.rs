use crate::services::ForecastServiceError;
use clima_core::{AppError, WeatherError};
use clima_weather::ForecastError;

impl From<ForecastServiceError> for AppError {
    fn from(e: ForecastServiceError) -> Self {
        let weather = match e {
            ForecastServiceError::InvalidQuery(q) => WeatherError::InvalidQuery(q.to_string()),
            ForecastServiceError::Fetch(ForecastError::NotFound) => WeatherError::LocationNotFound,
            ForecastServiceError::Fetch(ForecastError::UpstreamError { status: 401 }) => {
                WeatherError::InvalidApiKey
            }
            ForecastServiceError::Fetch(ForecastError::UpstreamError { status }) => {
                WeatherError::ApiError { status }
            }
            ForecastServiceError::Fetch(ForecastError::TransportError(msg)) => {
                WeatherError::ConnectionFailed(msg)
            }
            ForecastServiceError::Fetch(ForecastError::EmptyResult) => WeatherError::NoData,
            ForecastServiceError::NotInitialized => WeatherError::ServiceUnavailable,
        };
        AppError::Weather(weather)
    }
}
