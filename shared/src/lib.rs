//! Pilates Studio Shared Library
//!
//! Wire types, domain enums, field validation and the pure calculations
//! (BMI, ages, time windows, month bounds) used by the backend.

pub mod calendar;
pub mod errors;
pub mod health_metrics;
pub mod models;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use calendar::{DateRange, TimeWindow};
pub use errors::*;
pub use health_metrics::*;
pub use models::*;
pub use types::*;
