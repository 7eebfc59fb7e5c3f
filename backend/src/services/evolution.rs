//! Evolution record service
//!
//! Session numbers are sequential per student. When a request leaves the
//! number out it is assigned as `max + 1` while the student row is locked,
//! so concurrent writers for one student cannot draw the same number.

use super::{clean_list, normalize_search, trimmed};
use crate::config::StudioConfig;
use crate::error::ApiError;
use crate::metrics;
use crate::repositories::{
    EvolutionInput, EvolutionRecord, EvolutionRepository, InstructorRepository, StudentRepository,
};
use chrono::NaiveDate;
use pilates_studio_shared::{DateRange, EvolutionRecordRequest, EvolutionRecordResponse};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

/// Evolution record service for business logic
pub struct EvolutionService;

impl EvolutionService {
    pub async fn create(
        pool: &PgPool,
        studio: &StudioConfig,
        request: EvolutionRecordRequest,
    ) -> Result<EvolutionRecordResponse, ApiError> {
        request.validate()?;

        let mut tx = pool.begin().await?;
        lock_participants(&mut tx, request.student_id, request.instructor_id).await?;

        let session = match request.session {
            Some(session) => session,
            None => EvolutionRepository::next_session(&mut *tx, request.student_id)
                .await
                .map_err(ApiError::Internal)?,
        };
        let input = build_input(studio, request, session, None);

        let id = EvolutionRepository::create(&mut *tx, &input)
            .await
            .map_err(ApiError::from_repository)?;
        let record = load(&mut tx, id).await?;
        tx.commit().await?;

        metrics::evolution_record_written();
        info!(
            record_id = %id,
            student_id = %input.student_id,
            session = input.session,
            "Evolution record written"
        );
        Ok(to_response(record))
    }

    /// Replace a record; an omitted session number keeps the current one
    pub async fn update(
        pool: &PgPool,
        studio: &StudioConfig,
        id: Uuid,
        request: EvolutionRecordRequest,
    ) -> Result<EvolutionRecordResponse, ApiError> {
        request.validate()?;

        let mut tx = pool.begin().await?;
        let current = load(&mut tx, id).await?;
        lock_participants(&mut tx, request.student_id, request.instructor_id).await?;

        let session = match request.session {
            Some(session) => session,
            None if current.student_id == request.student_id => current.session,
            // Moved to another student: continue that student's numbering
            None => EvolutionRepository::next_session(&mut *tx, request.student_id)
                .await
                .map_err(ApiError::Internal)?,
        };
        let input = build_input(studio, request, session, Some(&current));

        EvolutionRepository::update(&mut *tx, id, &input)
            .await
            .map_err(ApiError::from_repository)?;
        let record = load(&mut tx, id).await?;
        tx.commit().await?;

        metrics::evolution_record_written();
        info!(record_id = %id, session = input.session, "Evolution record updated");
        Ok(to_response(record))
    }

    pub async fn get(pool: &PgPool, id: Uuid) -> Result<EvolutionRecordResponse, ApiError> {
        let record = EvolutionRepository::find_by_id(pool, id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| not_found(id))?;
        Ok(to_response(record))
    }

    pub async fn list(
        pool: &PgPool,
        search: Option<String>,
    ) -> Result<Vec<EvolutionRecordResponse>, ApiError> {
        let search = normalize_search(search);
        let records = EvolutionRepository::list(pool, search.as_deref())
            .await
            .map_err(ApiError::Internal)?;
        Ok(to_responses(records))
    }

    /// A student's records, newest first
    pub async fn by_student(
        pool: &PgPool,
        student_id: Uuid,
    ) -> Result<Vec<EvolutionRecordResponse>, ApiError> {
        let records = EvolutionRepository::list_for_student(pool, student_id)
            .await
            .map_err(ApiError::Internal)?;
        Ok(to_responses(records))
    }

    /// Like `by_student`, but 404 when the student does not exist
    pub async fn history(
        pool: &PgPool,
        student_id: Uuid,
    ) -> Result<Vec<EvolutionRecordResponse>, ApiError> {
        ensure_student(pool, student_id).await?;
        Self::by_student(pool, student_id).await
    }

    pub async fn by_instructor(
        pool: &PgPool,
        instructor_id: Uuid,
    ) -> Result<Vec<EvolutionRecordResponse>, ApiError> {
        let records = EvolutionRepository::list_for_instructor(pool, instructor_id)
            .await
            .map_err(ApiError::Internal)?;
        Ok(to_responses(records))
    }

    pub async fn by_date_range(
        pool: &PgPool,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<EvolutionRecordResponse>, ApiError> {
        let range = DateRange::new(start, end)?;
        let records = EvolutionRepository::list_between(pool, range.start, range.end)
            .await
            .map_err(ApiError::Internal)?;
        Ok(to_responses(records))
    }

    /// Number the next record of the student would get
    pub async fn next_session(pool: &PgPool, student_id: Uuid) -> Result<i32, ApiError> {
        ensure_student(pool, student_id).await?;
        EvolutionRepository::next_session(pool, student_id)
            .await
            .map_err(ApiError::Internal)
    }

    pub async fn count_on(pool: &PgPool, date: NaiveDate) -> Result<i64, ApiError> {
        EvolutionRepository::count_on(pool, date)
            .await
            .map_err(ApiError::Internal)
    }

    /// Mean overall rating rounded to two decimals; 0 when nothing is rated
    pub async fn average_rating(pool: &PgPool, student_id: Uuid) -> Result<f64, ApiError> {
        ensure_student(pool, student_id).await?;
        let average = EvolutionRepository::average_rating(pool, student_id)
            .await
            .map_err(ApiError::Internal)?;
        Ok(round2(average.unwrap_or(0.0)))
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), ApiError> {
        let deleted = EvolutionRepository::delete(pool, id)
            .await
            .map_err(ApiError::from_repository)?;
        if !deleted {
            return Err(not_found(id));
        }
        info!(record_id = %id, "Evolution record deleted");
        Ok(())
    }
}

fn not_found(id: Uuid) -> ApiError {
    ApiError::NotFound(format!("Evolution record {} not found", id))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

async fn ensure_student(pool: &PgPool, student_id: Uuid) -> Result<(), ApiError> {
    StudentRepository::find_by_id(pool, student_id)
        .await
        .map_err(ApiError::Internal)?
        .map(|_| ())
        .ok_or_else(|| ApiError::NotFound(format!("Student {} not found", student_id)))
}

/// 404 unless both exist; the student row stays locked until commit
async fn lock_participants(
    tx: &mut Transaction<'_, Postgres>,
    student_id: Uuid,
    instructor_id: Uuid,
) -> Result<(), ApiError> {
    let locked = StudentRepository::lock(&mut **tx, student_id)
        .await
        .map_err(ApiError::Internal)?;
    if !locked {
        return Err(ApiError::NotFound(format!("Student {} not found", student_id)));
    }

    let instructor = InstructorRepository::find_by_id(&mut **tx, instructor_id)
        .await
        .map_err(ApiError::Internal)?;
    if instructor.is_none() {
        return Err(ApiError::NotFound(format!(
            "Instructor {} not found",
            instructor_id
        )));
    }
    Ok(())
}

async fn load(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> Result<EvolutionRecord, ApiError> {
    EvolutionRepository::find_by_id(&mut **tx, id)
        .await
        .map_err(ApiError::Internal)?
        .ok_or_else(|| not_found(id))
}

fn build_input(
    studio: &StudioConfig,
    request: EvolutionRecordRequest,
    session: i32,
    existing: Option<&EvolutionRecord>,
) -> EvolutionInput {
    let duration_minutes = request
        .duration_minutes
        .or(existing.map(|r| r.duration_minutes))
        .unwrap_or(studio.default_session_minutes);

    EvolutionInput {
        student_id: request.student_id,
        instructor_id: request.instructor_id,
        date: request.date,
        session,
        focus: request.focus.trim().to_string(),
        exercises_performed: clean_list(request.exercises_performed),
        progress_notes: trimmed(request.progress_notes),
        difficulties_observed: trimmed(request.difficulties_observed),
        improvements: trimmed(request.improvements),
        next_session_goals: trimmed(request.next_session_goals),
        overall_rating: request.overall_rating,
        pain_level: request.pain_level,
        mobility_level: request.mobility_level,
        strength_level: request.strength_level,
        balance_level: request.balance_level,
        endurance_level: request.endurance_level,
        observations: trimmed(request.observations),
        equipment: clean_list(request.equipment),
        duration_minutes,
    }
}

fn to_responses(records: Vec<EvolutionRecord>) -> Vec<EvolutionRecordResponse> {
    records.into_iter().map(to_response).collect()
}

pub fn to_response(record: EvolutionRecord) -> EvolutionRecordResponse {
    EvolutionRecordResponse {
        id: record.id,
        student_id: record.student_id,
        student_name: record.student_name,
        instructor_id: record.instructor_id,
        instructor_name: record.instructor_name,
        date: record.date,
        session: record.session,
        focus: record.focus,
        exercises_performed: record.exercises_performed,
        progress_notes: record.progress_notes,
        difficulties_observed: record.difficulties_observed,
        improvements: record.improvements,
        next_session_goals: record.next_session_goals,
        overall_rating: record.overall_rating,
        pain_level: record.pain_level,
        mobility_level: record.mobility_level,
        strength_level: record.strength_level,
        balance_level: record.balance_level,
        endurance_level: record.endurance_level,
        observations: record.observations,
        equipment: record.equipment,
        duration_minutes: record.duration_minutes,
        created_at: record.created_at,
        updated_at: record.updated_at,
    }
}
