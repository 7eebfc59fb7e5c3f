//! Error types shared between the backend and any client of the domain rules

use crate::models::ScheduleStatus;
use thiserror::Error;

/// Rejected schedule status change
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Schedule is already {from}; it cannot move to {to}")]
    Terminal {
        from: ScheduleStatus,
        to: ScheduleStatus,
    },

    #[error("Status change from {from} to {to} is not allowed")]
    NotAllowed {
        from: ScheduleStatus,
        to: ScheduleStatus,
    },
}

/// Invalid time or date interval
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RangeError {
    #[error("End time must be after start time")]
    EmptyTimeWindow,

    #[error("Start date must not be after end date")]
    InvertedDateRange,

    #[error("Date range cannot exceed {max_days} days")]
    DateRangeTooLong { max_days: i64 },
}

impl RangeError {
    /// Request field the error is reported against
    pub fn field(&self) -> &'static str {
        match self {
            RangeError::EmptyTimeWindow => "end_time",
            RangeError::InvertedDateRange | RangeError::DateRangeTooLong { .. } => "end_date",
        }
    }
}
