//! Database repositories
//!
//! Provides data access layer for database operations. Enum columns are
//! stored as text and decoded through the shared `FromStr` impls.

pub mod evaluations;
pub mod evolution;
pub mod instructors;
pub mod schedules;
pub mod students;

use anyhow::{anyhow, Result};
use std::str::FromStr;

pub use evaluations::{EvaluationInput, EvaluationRecord, EvaluationRepository};
pub use evolution::{EvolutionInput, EvolutionRecord, EvolutionRepository};
pub use instructors::{InstructorInput, InstructorRecord, InstructorRepository};
pub use schedules::{ScheduleFilter, ScheduleInput, ScheduleRecord, ScheduleRepository};
pub use students::{StudentInput, StudentRecord, StudentRepository};

/// Parse a text enum column, reporting the column on failure
pub(crate) fn decode_enum<T>(column: &str, value: &str) -> Result<T>
where
    T: FromStr<Err = String>,
{
    value
        .parse()
        .map_err(|e: String| anyhow!("Unexpected value in {}: {}", column, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pilates_studio_shared::{PaymentStatus, ScheduleStatus};

    #[test]
    fn test_decode_enum() {
        let status: ScheduleStatus = decode_enum("schedules.status", "no_show").unwrap();
        assert_eq!(status, ScheduleStatus::NoShow);

        let err = decode_enum::<PaymentStatus>("schedules.payment_status", "owed").unwrap_err();
        assert!(err.to_string().contains("schedules.payment_status"));
    }
}
