//! Schedule service
//!
//! Bookings run inside a transaction that first locks the instructor row,
//! so two concurrent requests for the same instructor cannot both pass the
//! overlap check. Status changes lock the schedule row and bump the
//! student/instructor counters in the same transaction the first time a
//! class becomes `completed`. A completed class keeps its student and
//! instructor, so the counters always match the schedule rows.

use super::{clean_list, normalize_search, trimmed};
use crate::config::StudioConfig;
use crate::error::ApiError;
use crate::metrics;
use crate::repositories::{
    InstructorRepository, ScheduleFilter, ScheduleInput, ScheduleRecord, ScheduleRepository,
    StudentRepository,
};
use chrono::{Duration, NaiveDate, NaiveTime};
use pilates_studio_shared::{
    CapacityResponse, CapacitySlot, DateRange, PaymentStatus, ScheduleListQuery, ScheduleRequest,
    ScheduleResponse, ScheduleStatus, TimeWindow, Transition,
};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

/// Schedule service for business logic
pub struct ScheduleService;

impl ScheduleService {
    /// Book a class
    ///
    /// A class created directly as `completed` counts towards the student
    /// and instructor totals just like one completed later.
    pub async fn create(
        pool: &PgPool,
        studio: &StudioConfig,
        request: ScheduleRequest,
    ) -> Result<ScheduleResponse, ApiError> {
        let status = request.status.unwrap_or_default();
        let (input, window) = prepare(studio, request, status, None)?;

        let mut tx = pool.begin().await?;
        ensure_participants(&mut tx, &input).await?;
        if status.blocks_slot() {
            ensure_slot_free(&mut tx, &input, window, None, "create").await?;
        }

        let id = ScheduleRepository::create(&mut *tx, &input)
            .await
            .map_err(ApiError::from_repository)?;
        if status == ScheduleStatus::Completed {
            record_completion(&mut tx, id, &input).await?;
        }
        let record = load(&mut tx, id).await?;
        tx.commit().await?;

        metrics::schedule_booked();
        info!(
            schedule_id = %id,
            instructor_id = %input.instructor_id,
            student_id = %input.student_id,
            date = %input.date,
            slot = %window,
            "Class booked"
        );
        to_response(record, studio.today())
    }

    /// Replace a booking; a status change goes through the transition rules
    pub async fn update(
        pool: &PgPool,
        studio: &StudioConfig,
        id: Uuid,
        request: ScheduleRequest,
    ) -> Result<ScheduleResponse, ApiError> {
        let mut tx = pool.begin().await?;
        let current = ScheduleRepository::find_for_update(&mut *tx, id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| not_found(id))?;

        let from = current.status()?;
        let to = request.status.unwrap_or(from);
        let transition = from.transition_to(to)?;
        let (input, window) = prepare(studio, request, to, Some(&current))?;
        if from == ScheduleStatus::Completed
            && (input.student_id != current.student_id
                || input.instructor_id != current.instructor_id)
        {
            return Err(ApiError::BadRequest(
                "A completed class cannot move to another student or instructor".to_string(),
            ));
        }

        ensure_participants(&mut tx, &input).await?;
        if to.blocks_slot() {
            ensure_slot_free(&mut tx, &input, window, Some(id), "update").await?;
        }

        ScheduleRepository::update(&mut *tx, id, &input)
            .await
            .map_err(ApiError::from_repository)?;
        if transition == Transition::Completed {
            record_completion(&mut tx, id, &input).await?;
        }
        let record = load(&mut tx, id).await?;
        tx.commit().await?;

        if transition != Transition::Unchanged {
            metrics::schedule_transition(from, to);
            info!(schedule_id = %id, from = %from, to = %to, "Schedule status changed");
        }
        info!(schedule_id = %id, slot = %window, "Schedule updated");
        to_response(record, studio.today())
    }

    /// Apply a status transition on its own
    pub async fn update_status(
        pool: &PgPool,
        studio: &StudioConfig,
        id: Uuid,
        to: ScheduleStatus,
    ) -> Result<ScheduleResponse, ApiError> {
        let mut tx = pool.begin().await?;
        let current = ScheduleRepository::find_for_update(&mut *tx, id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| not_found(id))?;

        let from = current.status()?;
        let transition = from.transition_to(to)?;
        if transition == Transition::Unchanged {
            tx.commit().await?;
            return to_response(current, studio.today());
        }

        ScheduleRepository::update_status(&mut *tx, id, to)
            .await
            .map_err(ApiError::Internal)?;
        if transition == Transition::Completed {
            let input = ScheduleInput::from(&current);
            record_completion(&mut tx, id, &input).await?;
        }
        let record = load(&mut tx, id).await?;
        tx.commit().await?;

        metrics::schedule_transition(from, to);
        info!(schedule_id = %id, from = %from, to = %to, "Schedule status changed");
        to_response(record, studio.today())
    }

    /// Remove a booking; counters of a completed class are left as they are
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), ApiError> {
        let deleted = ScheduleRepository::delete(pool, id)
            .await
            .map_err(ApiError::from_repository)?;

        if !deleted {
            return Err(not_found(id));
        }
        info!(schedule_id = %id, "Schedule deleted");
        Ok(())
    }

    pub async fn get(pool: &PgPool, studio: &StudioConfig, id: Uuid) -> Result<ScheduleResponse, ApiError> {
        let record = ScheduleRepository::find_by_id(pool, id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| not_found(id))?;
        to_response(record, studio.today())
    }

    pub async fn list(
        pool: &PgPool,
        studio: &StudioConfig,
        query: ScheduleListQuery,
    ) -> Result<Vec<ScheduleResponse>, ApiError> {
        if let (Some(start), Some(end)) = (query.start_date, query.end_date) {
            DateRange::new(start, end)?;
        }
        let filter = ScheduleFilter {
            search: normalize_search(query.search),
            status: query.status,
            student_id: query.student_id,
            instructor_id: query.instructor_id,
            date: query.date,
            start_date: query.start_date,
            end_date: query.end_date,
        };
        Self::filtered(pool, studio, &filter).await
    }

    pub async fn by_date(
        pool: &PgPool,
        studio: &StudioConfig,
        date: NaiveDate,
    ) -> Result<Vec<ScheduleResponse>, ApiError> {
        let filter = ScheduleFilter {
            date: Some(date),
            ..Default::default()
        };
        Self::filtered(pool, studio, &filter).await
    }

    /// Classes in `[start, end]`, chronological
    pub async fn by_date_range(
        pool: &PgPool,
        studio: &StudioConfig,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ScheduleResponse>, ApiError> {
        let range = DateRange::new(start, end)?;
        let records = ScheduleRepository::list_between(pool, range.start, range.end)
            .await
            .map_err(ApiError::Internal)?;
        to_responses(records, studio.today())
    }

    pub async fn by_student(
        pool: &PgPool,
        studio: &StudioConfig,
        student_id: Uuid,
    ) -> Result<Vec<ScheduleResponse>, ApiError> {
        let filter = ScheduleFilter {
            student_id: Some(student_id),
            ..Default::default()
        };
        Self::filtered(pool, studio, &filter).await
    }

    pub async fn by_instructor(
        pool: &PgPool,
        studio: &StudioConfig,
        instructor_id: Uuid,
    ) -> Result<Vec<ScheduleResponse>, ApiError> {
        let filter = ScheduleFilter {
            instructor_id: Some(instructor_id),
            ..Default::default()
        };
        Self::filtered(pool, studio, &filter).await
    }

    pub async fn by_status(
        pool: &PgPool,
        studio: &StudioConfig,
        status: ScheduleStatus,
    ) -> Result<Vec<ScheduleResponse>, ApiError> {
        let filter = ScheduleFilter {
            status: Some(status),
            ..Default::default()
        };
        Self::filtered(pool, studio, &filter).await
    }

    /// Every class on the studio's current date
    pub async fn today(pool: &PgPool, studio: &StudioConfig) -> Result<Vec<ScheduleResponse>, ApiError> {
        Self::by_date(pool, studio, studio.today()).await
    }

    /// Tomorrow's classes that are still booked or confirmed
    pub async fn upcoming(
        pool: &PgPool,
        studio: &StudioConfig,
    ) -> Result<Vec<ScheduleResponse>, ApiError> {
        let today = studio.today();
        let records = ScheduleRepository::list_pending_on(pool, today + Duration::days(1))
            .await
            .map_err(ApiError::Internal)?;
        to_responses(records, today)
    }

    /// Non-cancelled classes on `date` grouped by time slot
    pub async fn capacity(
        pool: &PgPool,
        studio: &StudioConfig,
        date: NaiveDate,
    ) -> Result<CapacityResponse, ApiError> {
        let records = ScheduleRepository::list_active_on(pool, date)
            .await
            .map_err(ApiError::Internal)?;
        let schedules = to_responses(records, studio.today())?;

        Ok(CapacityResponse {
            date,
            total: schedules.len(),
            slots: group_by_slot(schedules)?,
        })
    }

    pub async fn confirmed_today(pool: &PgPool, studio: &StudioConfig) -> Result<i64, ApiError> {
        let today = studio.today();
        ScheduleRepository::count_with_status(pool, ScheduleStatus::Confirmed, today, today)
            .await
            .map_err(ApiError::Internal)
    }

    pub async fn completed_between(
        pool: &PgPool,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<i64, ApiError> {
        let range = DateRange::new(start, end)?;
        ScheduleRepository::count_with_status(pool, ScheduleStatus::Completed, range.start, range.end)
            .await
            .map_err(ApiError::Internal)
    }

    /// Paid revenue in `[start, end]`
    pub async fn revenue_between(
        pool: &PgPool,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Decimal, ApiError> {
        let range = DateRange::new(start, end)?;
        ScheduleRepository::paid_revenue(pool, range.start, range.end)
            .await
            .map_err(ApiError::Internal)
    }

    async fn filtered(
        pool: &PgPool,
        studio: &StudioConfig,
        filter: &ScheduleFilter,
    ) -> Result<Vec<ScheduleResponse>, ApiError> {
        let records = ScheduleRepository::list(pool, filter)
            .await
            .map_err(ApiError::Internal)?;
        to_responses(records, studio.today())
    }
}

fn not_found(id: Uuid) -> ApiError {
    ApiError::NotFound(format!("Schedule {} not found", id))
}

impl From<&ScheduleRecord> for ScheduleInput {
    fn from(record: &ScheduleRecord) -> Self {
        Self {
            student_id: record.student_id,
            instructor_id: record.instructor_id,
            date: record.date,
            start_time: record.start_time,
            end_time: record.end_time,
            class_type: record.class_type.clone(),
            status: record.status().unwrap_or_default(),
            notes: record.notes.clone(),
            room: record.room.clone(),
            equipment: record.equipment.clone(),
            price: record.price,
            payment_status: record.payment_status().unwrap_or_default(),
        }
    }
}

/// Validate a request and fill omitted fields from `existing` or the studio defaults
fn prepare(
    studio: &StudioConfig,
    request: ScheduleRequest,
    status: ScheduleStatus,
    existing: Option<&ScheduleRecord>,
) -> Result<(ScheduleInput, TimeWindow), ApiError> {
    request.validate()?;
    let window = TimeWindow::new(request.start_time, request.end_time)?;

    let price = request
        .price
        .or(existing.map(|r| r.price))
        .unwrap_or(studio.default_class_price);
    if price <= Decimal::ZERO {
        return Err(ApiError::invalid_field("price", "Price must be greater than zero"));
    }

    let payment_status = match (request.payment_status, existing) {
        (Some(p), _) => p,
        (None, Some(r)) => r.payment_status()?,
        (None, None) => PaymentStatus::default(),
    };

    let input = ScheduleInput {
        student_id: request.student_id,
        instructor_id: request.instructor_id,
        date: request.date,
        start_time: window.start(),
        end_time: window.end(),
        class_type: trimmed(request.class_type)
            .or(existing.map(|r| r.class_type.clone()))
            .unwrap_or_else(|| studio.default_class_type.clone()),
        status,
        notes: trimmed(request.notes),
        room: trimmed(request.room)
            .or(existing.map(|r| r.room.clone()))
            .unwrap_or_else(|| studio.default_room.clone()),
        equipment: clean_list(request.equipment),
        price,
        payment_status,
    };
    Ok((input, window))
}

/// 404 unless both the student and the instructor exist; locks the instructor row
async fn ensure_participants(
    tx: &mut Transaction<'_, Postgres>,
    input: &ScheduleInput,
) -> Result<(), ApiError> {
    let student = StudentRepository::find_by_id(&mut **tx, input.student_id)
        .await
        .map_err(ApiError::Internal)?;
    if student.is_none() {
        return Err(ApiError::NotFound(format!(
            "Student {} not found",
            input.student_id
        )));
    }

    let locked = InstructorRepository::lock(&mut **tx, input.instructor_id)
        .await
        .map_err(ApiError::Internal)?;
    if !locked {
        return Err(ApiError::NotFound(format!(
            "Instructor {} not found",
            input.instructor_id
        )));
    }
    Ok(())
}

async fn ensure_slot_free(
    tx: &mut Transaction<'_, Postgres>,
    input: &ScheduleInput,
    window: TimeWindow,
    exclude_id: Option<Uuid>,
    operation: &'static str,
) -> Result<(), ApiError> {
    let clash = ScheduleRepository::find_overlapping(
        &mut **tx,
        input.instructor_id,
        input.date,
        window.start(),
        window.end(),
        exclude_id,
    )
    .await
    .map_err(ApiError::Internal)?;

    let Some(existing) = clash else {
        return Ok(());
    };

    metrics::schedule_conflict(operation);
    warn!(
        instructor_id = %input.instructor_id,
        date = %input.date,
        requested = %window,
        conflicting_schedule = %existing.id,
        operation,
        "Booking rejected: instructor already booked"
    );
    Err(ApiError::Conflict(format!(
        "Instructor already has a class from {} to {} on {}",
        existing.start_time.format("%H:%M"),
        existing.end_time.format("%H:%M"),
        input.date
    )))
}

/// Counter updates for a class entering `completed` for the first time
///
/// The instructor row lock serialises completions for one instructor, so
/// the first-pairing check below always sees the other commits.
async fn record_completion(
    tx: &mut Transaction<'_, Postgres>,
    schedule_id: Uuid,
    input: &ScheduleInput,
) -> Result<(), ApiError> {
    InstructorRepository::lock(&mut **tx, input.instructor_id)
        .await
        .map_err(ApiError::Internal)?;

    let returning = ScheduleRepository::has_completed_class(
        &mut **tx,
        input.student_id,
        input.instructor_id,
        schedule_id,
    )
    .await
    .map_err(ApiError::Internal)?;

    StudentRepository::record_completed_class(
        &mut **tx,
        input.student_id,
        input.date.and_time(input.start_time),
    )
    .await
    .map_err(ApiError::Internal)?;
    InstructorRepository::record_completed_class(&mut **tx, input.instructor_id, !returning)
        .await
        .map_err(ApiError::Internal)?;

    info!(
        schedule_id = %schedule_id,
        student_id = %input.student_id,
        instructor_id = %input.instructor_id,
        new_pairing = !returning,
        "Completion counters updated"
    );
    Ok(())
}

async fn load(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> Result<ScheduleRecord, ApiError> {
    ScheduleRepository::find_by_id(&mut **tx, id)
        .await
        .map_err(ApiError::Internal)?
        .ok_or_else(|| not_found(id))
}

fn to_responses(records: Vec<ScheduleRecord>, today: NaiveDate) -> Result<Vec<ScheduleResponse>, ApiError> {
    records.into_iter().map(|r| to_response(r, today)).collect()
}

/// Build the response; past/today/future compare the class date with `today`
pub fn to_response(record: ScheduleRecord, today: NaiveDate) -> Result<ScheduleResponse, ApiError> {
    let status = record.status()?;
    let payment_status = record.payment_status()?;
    Ok(ScheduleResponse {
        id: record.id,
        student_id: record.student_id,
        student_name: record.student_name,
        instructor_id: record.instructor_id,
        instructor_name: record.instructor_name,
        date: record.date,
        start_time: record.start_time,
        end_time: record.end_time,
        duration_minutes: minutes_between(record.start_time, record.end_time),
        class_type: record.class_type,
        status,
        status_description: status.description().to_string(),
        notes: record.notes,
        room: record.room,
        equipment: record.equipment,
        price: record.price,
        payment_status,
        payment_status_description: payment_status.description().to_string(),
        is_today: record.date == today,
        is_past: record.date < today,
        is_future: record.date > today,
        created_at: record.created_at,
        updated_at: record.updated_at,
    })
}

fn minutes_between(start: NaiveTime, end: NaiveTime) -> i64 {
    (end - start).num_minutes()
}

/// Group schedules by `HH:MM-HH:MM` slot, keeping the input order of slots
fn group_by_slot(schedules: Vec<ScheduleResponse>) -> Result<Vec<CapacitySlot>, ApiError> {
    let mut slots: Vec<CapacitySlot> = Vec::new();
    for schedule in schedules {
        let label = TimeWindow::new(schedule.start_time, schedule.end_time)
            .map_err(|e| ApiError::Internal(e.into()))?
            .slot_label();
        match slots.iter_mut().find(|s| s.slot == label) {
            Some(slot) => {
                slot.count += 1;
                slot.schedules.push(schedule);
            }
            None => slots.push(CapacitySlot {
                slot: label,
                count: 1,
                schedules: vec![schedule],
            }),
        }
    }
    Ok(slots)
}
