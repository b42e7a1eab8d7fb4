//! Forecast retrieval for Clima
//!
//! Fetches the OpenWeatherMap 5 day / 3 hour forecast for a place name or a
//! coordinate and groups the entries into calendar days for display.

pub mod client;
pub mod error;
pub mod grouping;
pub mod report;
pub mod types;

pub use client::{ForecastClient, ForecastClientConfig};
pub use error::{ForecastError, QueryError};
pub use grouping::{group_by_day, group_by_day_in, GroupingZone, MAX_DAYS};
pub use report::ForecastReport;
pub use types::*;
