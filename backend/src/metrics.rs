//! Prometheus metrics
//!
//! Domain counters are recorded through the `metrics` facade. Without an
//! installed recorder the macros are no-ops, which is what tests run with.
//!
//! | Metric | Labels |
//! |--------|--------|
//! | `studio_schedules_booked_total` | - |
//! | `studio_schedule_conflicts_total` | `operation` |
//! | `studio_schedule_transitions_total` | `from`, `to` |
//! | `studio_classes_completed_total` | - |
//! | `studio_evolution_records_total` | - |

use anyhow::{Context, Result};
use ::metrics::{counter, describe_counter};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use pilates_studio_shared::ScheduleStatus;

const SCHEDULES_BOOKED: &str = "studio_schedules_booked_total";
const SCHEDULE_CONFLICTS: &str = "studio_schedule_conflicts_total";
const SCHEDULE_TRANSITIONS: &str = "studio_schedule_transitions_total";
const CLASSES_COMPLETED: &str = "studio_classes_completed_total";
const EVOLUTION_RECORDS: &str = "studio_evolution_records_total";

/// Install the global Prometheus recorder and describe the counters
///
/// Must be called at most once per process.
pub fn install_recorder() -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;

    describe_counter!(SCHEDULES_BOOKED, "Classes booked");
    describe_counter!(
        SCHEDULE_CONFLICTS,
        "Bookings rejected because the instructor was already booked"
    );
    describe_counter!(SCHEDULE_TRANSITIONS, "Schedule status changes");
    describe_counter!(CLASSES_COMPLETED, "Classes completed for the first time");
    describe_counter!(EVOLUTION_RECORDS, "Evolution records written");

    Ok(handle)
}

pub fn schedule_booked() {
    counter!(SCHEDULES_BOOKED).increment(1);
}

/// `operation` is `create` or `update`
pub fn schedule_conflict(operation: &'static str) {
    counter!(SCHEDULE_CONFLICTS, "operation" => operation).increment(1);
}

pub fn schedule_transition(from: ScheduleStatus, to: ScheduleStatus) {
    counter!(SCHEDULE_TRANSITIONS, "from" => from.as_str(), "to" => to.as_str()).increment(1);
    if to == ScheduleStatus::Completed {
        counter!(CLASSES_COMPLETED).increment(1);
    }
}

pub fn evolution_record_written() {
    counter!(EVOLUTION_RECORDS).increment(1);
}
