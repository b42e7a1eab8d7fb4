//! Presentation-side services for Clima.
//!
//! No UI toolkit lives here: a front end drives `ForecastModel` and renders
//! whatever it exposes.

pub mod app_services;
mod error_mapping;
pub mod models;
pub mod services;

pub use app_services::AppServices;
pub use models::ForecastModel;
