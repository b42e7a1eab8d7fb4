//! Centralized error types for the Clima application.
//!
//! This module provides a typed error hierarchy that:
//! - Enables precise error handling throughout the codebase
//! - Provides user-friendly messages suitable for UI display
//! - Preserves full error context for debugging/logging

use thiserror::Error;

/// Top-level application error type.
///
/// Use `user_message()` to get a UI-appropriate message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Weather service error: {0}")]
    Weather(#[from] WeatherError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Returns a user-friendly message suitable for display in the UI.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Config(e) => e.user_message(),
            AppError::Weather(e) => e.user_message(),
            AppError::Io(_) => "A file operation failed. Please try again.",
            AppError::Other(_) => "An unexpected error occurred. Please try again.",
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
        }
    }
}

/// Weather service errors as seen by the application.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Location not found")]
    LocationNotFound,

    #[error("Weather API error: HTTP {status}")]
    ApiError { status: u16 },

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("No forecast data returned")]
    NoData,

    #[error("Invalid search: {0}")]
    InvalidQuery(String),

    #[error("Service unavailable")]
    ServiceUnavailable,
}

impl WeatherError {
    pub fn user_message(&self) -> &'static str {
        match self {
            WeatherError::LocationNotFound => "Location not found. Check and try again.",
            WeatherError::ApiError { status } if *status >= 500 => {
                "The weather service is experiencing issues. Please try again later."
            }
            WeatherError::ApiError { .. } => "Weather service error. Please try again.",
            WeatherError::InvalidApiKey => "Weather API key is invalid. Check settings.",
            WeatherError::ConnectionFailed(_) => {
                "Unable to connect. Check your internet connection."
            }
            WeatherError::NoData => "No forecast is available for this location.",
            WeatherError::InvalidQuery(_) => "Please enter a city or pick a point on the map.",
            WeatherError::ServiceUnavailable => {
                "Weather service unavailable. Please try again later."
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages_are_non_empty() {
        let errors = vec![
            AppError::Config(ConfigError::Invalid("test".into())),
            AppError::Weather(WeatherError::LocationNotFound),
            AppError::Weather(WeatherError::ApiError { status: 502 }),
            AppError::Weather(WeatherError::ApiError { status: 400 }),
            AppError::Weather(WeatherError::InvalidApiKey),
            AppError::Weather(WeatherError::ConnectionFailed("refused".into())),
            AppError::Weather(WeatherError::NoData),
            AppError::Weather(WeatherError::InvalidQuery("empty".into())),
            AppError::Weather(WeatherError::ServiceUnavailable),
            AppError::Other(anyhow::anyhow!("boom")),
        ];

        for err in errors {
            assert!(!err.user_message().is_empty(), "{:?} has empty message", err);
        }
    }

    #[test]
    fn test_app_error_conversion() {
        let weather_err = WeatherError::NoData;
        let app_err: AppError = weather_err.into();
        assert!(matches!(app_err, AppError::Weather(WeatherError::NoData)));
    }

    #[test]
    fn test_user_message_propagation() {
        let app_err = AppError::Weather(WeatherError::InvalidApiKey);
        assert_eq!(
            app_err.user_message(),
            "Weather API key is invalid. Check settings."
        );
    }

    #[test]
    fn test_server_errors_get_distinct_message() {
        assert_ne!(
            WeatherError::ApiError { status: 503 }.user_message(),
            WeatherError::ApiError { status: 429 }.user_message()
        );
    }
}
