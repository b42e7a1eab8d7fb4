//! Maps UI service errors to clima_core::AppError for consistent user-facing messages.

mod forecast;
