//! Domain enums for the studio
//!
//! Every enum is stored as its `as_str()` form in the database and
//! serialized in snake_case on the wire. `FromStr` is lenient: it accepts
//! any casing plus the Portuguese labels used by the studio staff.

use crate::errors::TransitionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Student Status
// ============================================================================

/// Enrollment status of a student
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StudentStatus {
    #[default]
    Active,
    Inactive,
    Suspended,
}

impl StudentStatus {
    pub const ALL: [StudentStatus; 3] = [Self::Active, Self::Inactive, Self::Suspended];

    pub fn as_str(&self) -> &'static str {
        match self {
            StudentStatus::Active => "active",
            StudentStatus::Inactive => "inactive",
            StudentStatus::Suspended => "suspended",
        }
    }

    /// Human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            StudentStatus::Active => "Student active at the studio",
            StudentStatus::Inactive => "Student inactive",
            StudentStatus::Suspended => "Enrollment suspended",
        }
    }
}

impl fmt::Display for StudentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StudentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" | "ativo" => Ok(StudentStatus::Active),
            "inactive" | "inativo" => Ok(StudentStatus::Inactive),
            "suspended" | "suspenso" => Ok(StudentStatus::Suspended),
            _ => Err(format!("Unknown student status: {}", s)),
        }
    }
}

// ============================================================================
// Instructor Status
// ============================================================================

/// Employment status of an instructor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InstructorStatus {
    #[default]
    Active,
    Inactive,
    OnLeave,
    Dismissed,
}

impl InstructorStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstructorStatus::Active => "active",
            InstructorStatus::Inactive => "inactive",
            InstructorStatus::OnLeave => "on_leave",
            InstructorStatus::Dismissed => "dismissed",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            InstructorStatus::Active => "Instructor active",
            InstructorStatus::Inactive => "Instructor inactive",
            InstructorStatus::OnLeave => "Instructor on leave",
            InstructorStatus::Dismissed => "Instructor dismissed",
        }
    }
}

impl fmt::Display for InstructorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InstructorStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" | "ativo" => Ok(InstructorStatus::Active),
            "inactive" | "inativo" => Ok(InstructorStatus::Inactive),
            "on_leave" | "licenca" | "licença" => Ok(InstructorStatus::OnLeave),
            "dismissed" | "demitido" => Ok(InstructorStatus::Dismissed),
            _ => Err(format!("Unknown instructor status: {}", s)),
        }
    }
}

// ============================================================================
// Schedule Status
// ============================================================================

/// Lifecycle of a booked class
///
/// ```text
/// scheduled <-> confirmed
///     \            |
///      +--> completed | cancelled | no_show   (terminal)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    #[default]
    Scheduled,
    Confirmed,
    Completed,
    Cancelled,
    NoShow,
}

/// Outcome of applying a status change to a schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Requested status equals the current one; nothing to persist
    Unchanged,
    /// Status moves without side effects
    Moved,
    /// Class entered `completed` for the first time; counters must be bumped
    Completed,
}

impl ScheduleStatus {
    pub const ALL: [ScheduleStatus; 5] = [
        Self::Scheduled,
        Self::Confirmed,
        Self::Completed,
        Self::Cancelled,
        Self::NoShow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleStatus::Scheduled => "scheduled",
            ScheduleStatus::Confirmed => "confirmed",
            ScheduleStatus::Completed => "completed",
            ScheduleStatus::Cancelled => "cancelled",
            ScheduleStatus::NoShow => "no_show",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ScheduleStatus::Scheduled => "Class booked",
            ScheduleStatus::Confirmed => "Class confirmed",
            ScheduleStatus::Completed => "Class completed",
            ScheduleStatus::Cancelled => "Class cancelled",
            ScheduleStatus::NoShow => "Student did not show up",
        }
    }

    /// Terminal statuses accept no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ScheduleStatus::Completed | ScheduleStatus::Cancelled | ScheduleStatus::NoShow
        )
    }

    /// Whether a class in this status occupies the instructor's time slot
    pub fn blocks_slot(&self) -> bool {
        !matches!(self, ScheduleStatus::Cancelled)
    }

    /// Validate a move from `self` to `next`
    pub fn transition_to(self, next: ScheduleStatus) -> Result<Transition, TransitionError> {
        if self == next {
            return Ok(Transition::Unchanged);
        }
        if self.is_terminal() {
            return Err(TransitionError::Terminal { from: self, to: next });
        }
        match next {
            ScheduleStatus::Completed => Ok(Transition::Completed),
            ScheduleStatus::Confirmed | ScheduleStatus::Cancelled | ScheduleStatus::NoShow => {
                Ok(Transition::Moved)
            }
            // Only a confirmation can be rolled back to a plain booking
            ScheduleStatus::Scheduled if self == ScheduleStatus::Confirmed => Ok(Transition::Moved),
            ScheduleStatus::Scheduled => Err(TransitionError::NotAllowed { from: self, to: next }),
        }
    }
}

impl fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScheduleStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "scheduled" | "agendado" => Ok(ScheduleStatus::Scheduled),
            "confirmed" | "confirmado" => Ok(ScheduleStatus::Confirmed),
            "completed" | "concluido" | "concluído" => Ok(ScheduleStatus::Completed),
            "cancelled" | "canceled" | "cancelado" => Ok(ScheduleStatus::Cancelled),
            "no_show" | "falta" => Ok(ScheduleStatus::NoShow),
            _ => Err(format!("Unknown schedule status: {}", s)),
        }
    }
}

// ============================================================================
// Payment Status
// ============================================================================

/// Payment state of a booked class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Exempt,
}

impl PaymentStatus {
    pub const ALL: [PaymentStatus; 3] = [Self::Pending, Self::Paid, Self::Exempt];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Exempt => "exempt",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Payment pending",
            PaymentStatus::Paid => "Payment received",
            PaymentStatus::Exempt => "Exempt from payment",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" | "pendente" => Ok(PaymentStatus::Pending),
            "paid" | "pago" => Ok(PaymentStatus::Paid),
            "exempt" | "isento" => Ok(PaymentStatus::Exempt),
            _ => Err(format!("Unknown payment status: {}", s)),
        }
    }
}

// ============================================================================
// Evaluation Type
// ============================================================================

/// Kind of physical evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationType {
    #[default]
    Initial,
    Progress,
    Final,
    Medical,
}

impl EvaluationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvaluationType::Initial => "initial",
            EvaluationType::Progress => "progress",
            EvaluationType::Final => "final",
            EvaluationType::Medical => "medical",
        }
    }
}

impl fmt::Display for EvaluationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EvaluationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "initial" | "inicial" => Ok(EvaluationType::Initial),
            "progress" | "progresso" => Ok(EvaluationType::Progress),
            "final" => Ok(EvaluationType::Final),
            "medical" | "medica" | "médica" => Ok(EvaluationType::Medical),
            _ => Err(format!("Unknown evaluation type: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case(ScheduleStatus::Scheduled, ScheduleStatus::Confirmed, Transition::Moved)]
    #[case(ScheduleStatus::Scheduled, ScheduleStatus::Completed, Transition::Completed)]
    #[case(ScheduleStatus::Scheduled, ScheduleStatus::Cancelled, Transition::Moved)]
    #[case(ScheduleStatus::Scheduled, ScheduleStatus::NoShow, Transition::Moved)]
    #[case(ScheduleStatus::Confirmed, ScheduleStatus::Scheduled, Transition::Moved)]
    #[case(ScheduleStatus::Confirmed, ScheduleStatus::Completed, Transition::Completed)]
    #[case(ScheduleStatus::Completed, ScheduleStatus::Completed, Transition::Unchanged)]
    #[case(ScheduleStatus::Cancelled, ScheduleStatus::Cancelled, Transition::Unchanged)]
    fn test_allowed_transitions(
        #[case] from: ScheduleStatus,
        #[case] to: ScheduleStatus,
        #[case] expected: Transition,
    ) {
        assert_eq!(from.transition_to(to).unwrap(), expected);
    }

    #[rstest]
    #[case(ScheduleStatus::Completed, ScheduleStatus::Scheduled)]
    #[case(ScheduleStatus::Completed, ScheduleStatus::Cancelled)]
    #[case(ScheduleStatus::Cancelled, ScheduleStatus::Confirmed)]
    #[case(ScheduleStatus::NoShow, ScheduleStatus::Completed)]
    fn test_terminal_statuses_reject_changes(
        #[case] from: ScheduleStatus,
        #[case] to: ScheduleStatus,
    ) {
        assert!(from.transition_to(to).is_err());
    }

    #[test]
    fn test_status_parsing_accepts_aliases() {
        assert_eq!("CONCLUIDO".parse::<ScheduleStatus>().unwrap(), ScheduleStatus::Completed);
        assert_eq!("canceled".parse::<ScheduleStatus>().unwrap(), ScheduleStatus::Cancelled);
        assert_eq!("NO_SHOW".parse::<ScheduleStatus>().unwrap(), ScheduleStatus::NoShow);
        assert_eq!("Pago".parse::<PaymentStatus>().unwrap(), PaymentStatus::Paid);
        assert_eq!("licenca".parse::<InstructorStatus>().unwrap(), InstructorStatus::OnLeave);
        assert!("unknown".parse::<StudentStatus>().is_err());
    }

    #[test]
    fn test_only_cancelled_frees_the_slot() {
        for status in ScheduleStatus::ALL {
            assert_eq!(status.blocks_slot(), status != ScheduleStatus::Cancelled);
        }
    }

    fn any_status() -> impl Strategy<Value = ScheduleStatus> {
        prop::sample::select(ScheduleStatus::ALL.to_vec())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Counters can only be bumped by a move into `completed`
        #[test]
        fn prop_completed_transition_only_targets_completed(from in any_status(), to in any_status()) {
            if let Ok(Transition::Completed) = from.transition_to(to) {
                prop_assert_eq!(to, ScheduleStatus::Completed);
                prop_assert_ne!(from, ScheduleStatus::Completed);
            }
        }

        #[test]
        fn prop_as_str_round_trips(status in any_status()) {
            prop_assert_eq!(status.as_str().parse::<ScheduleStatus>().unwrap(), status);
        }
    }
}
