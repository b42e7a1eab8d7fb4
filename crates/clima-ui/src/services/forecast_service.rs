//! Forecast backend: async forecast fetching.
//! All network work runs off the caller's thread; results sent via mpsc.

use clima_weather::{ForecastError, ForecastQuery, ForecastReport, QueryError};

use crate::app_services::AppServices;

/// Error type for forecast operations
#[derive(Debug)]
pub enum ForecastServiceError {
    InvalidQuery(QueryError),
    Fetch(ForecastError),
    NotInitialized,
}

impl std::fmt::Display for ForecastServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ForecastServiceError::InvalidQuery(e) => write!(f, "{}", e),
            ForecastServiceError::Fetch(e) => write!(f, "{}", e),
            ForecastServiceError::NotInitialized => write!(f, "Forecast service not initialized"),
        }
    }
}

impl std::error::Error for ForecastServiceError {}

/// Messages sent from async operations back to the presentation thread
#[derive(Debug)]
pub enum ForecastServiceMessage {
    /// Result of the fetch tagged `request_id`
    FetchDone {
        request_id: u64,
        result: Result<ForecastReport, ForecastServiceError>,
    },
}

/// Request a forecast asynchronously.
/// Sends `FetchDone` with the same `request_id` on the channel when complete.
pub fn request_fetch(
    tx: &std::sync::mpsc::Sender<ForecastServiceMessage>,
    services: &AppServices,
    request_id: u64,
    query: ForecastQuery,
) {
    let tx = tx.clone();
    let client = match services.forecast_client() {
        Some(c) => c,
        None => {
            let _ = tx.send(ForecastServiceMessage::FetchDone {
                request_id,
                result: Err(ForecastServiceError::NotInitialized),
            });
            return;
        }
    };
    let zone = services.grouping_zone();

    services.runtime().spawn(async move {
        tracing::info!("Fetching forecast #{} for {}", request_id, query);

        let result = client
            .fetch(&query)
            .await
            .map(|response| ForecastReport::from_response(&response, &zone))
            .map_err(ForecastServiceError::Fetch);

        if let Err(e) = &result {
            tracing::error!("Forecast #{} for {} failed: {}", request_id, query, e);
        }

        // Receiver is gone when the view closed; nothing to deliver to
        let _ = tx.send(ForecastServiceMessage::FetchDone { request_id, result });
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forecast_error_display_is_verbatim() {
        let err = ForecastServiceError::Fetch(ForecastError::NotFound);
        assert_eq!(err.to_string(), "Location not found");

        let err = ForecastServiceError::InvalidQuery(QueryError::EmptyPlace);
        assert_eq!(err.to_string(), "Place name is empty");

        assert!(ForecastServiceError::NotInitialized
            .to_string()
            .contains("not initialized"));
    }

    #[tokio::test]
    async fn uninitialized_services_reply_immediately() {
        let services = AppServices::with_handle(tokio::runtime::Handle::current());
        let (tx, rx) = std::sync::mpsc::channel();

        request_fetch(&tx, &services, 9, ForecastQuery::Place("Lima".to_string()));

        match rx.try_recv() {
            Ok(ForecastServiceMessage::FetchDone { request_id, result }) => {
                assert_eq!(request_id, 9);
                assert!(matches!(result, Err(ForecastServiceError::NotInitialized)));
            }
            Err(e) => unreachable!("expected an immediate reply: {}", e),
        }
    }
}
