//! Instructor service
//!
//! CRUD with email and CPF uniqueness. CPFs are stored as 11 bare digits
//! whatever punctuation the request carried.

use super::{clean_list, normalize_email, normalize_search, trimmed};
use crate::config::StudioConfig;
use crate::error::ApiError;
use crate::repositories::{InstructorInput, InstructorRecord, InstructorRepository};
use chrono::NaiveDate;
use pilates_studio_shared::calendar::{average_per_month, days_since, years_since};
use pilates_studio_shared::validation::{normalize_cpf, validate_birth_date, validate_cpf};
use pilates_studio_shared::{InstructorRequest, InstructorResponse, InstructorStatus};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

/// Instructor service for business logic
pub struct InstructorService;

impl InstructorService {
    pub async fn create(
        pool: &PgPool,
        studio: &StudioConfig,
        request: InstructorRequest,
    ) -> Result<InstructorResponse, ApiError> {
        let today = studio.today();
        let input = prepare(request, today, None)?;
        Self::ensure_unique(pool, &input, None).await?;

        let record = InstructorRepository::create(pool, &input)
            .await
            .map_err(ApiError::from_repository)?;

        info!(instructor_id = %record.id, "Instructor registered");
        to_response(record, today)
    }

    pub async fn update(
        pool: &PgPool,
        studio: &StudioConfig,
        id: Uuid,
        request: InstructorRequest,
    ) -> Result<InstructorResponse, ApiError> {
        let today = studio.today();
        let existing = Self::find(pool, id).await?;
        let input = prepare(request, today, Some(&existing))?;
        Self::ensure_unique(pool, &input, Some(id)).await?;

        let record = InstructorRepository::update(pool, id, &input)
            .await
            .map_err(ApiError::from_repository)?
            .ok_or_else(|| not_found(id))?;

        to_response(record, today)
    }

    pub async fn get(
        pool: &PgPool,
        studio: &StudioConfig,
        id: Uuid,
    ) -> Result<InstructorResponse, ApiError> {
        let record = Self::find(pool, id).await?;
        to_response(record, studio.today())
    }

    pub async fn get_by_email(
        pool: &PgPool,
        studio: &StudioConfig,
        email: &str,
    ) -> Result<InstructorResponse, ApiError> {
        let record = InstructorRepository::find_by_email(pool, &normalize_email(email))
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| {
                ApiError::NotFound(format!("Instructor with email {} not found", email))
            })?;
        to_response(record, studio.today())
    }

    /// Lookup accepting the CPF with or without punctuation
    pub async fn get_by_cpf(
        pool: &PgPool,
        studio: &StudioConfig,
        cpf: &str,
    ) -> Result<InstructorResponse, ApiError> {
        let record = InstructorRepository::find_by_cpf(pool, &normalize_cpf(cpf))
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound(format!("Instructor with CPF {} not found", cpf)))?;
        to_response(record, studio.today())
    }

    pub async fn list(
        pool: &PgPool,
        studio: &StudioConfig,
        search: Option<String>,
        status: Option<InstructorStatus>,
    ) -> Result<Vec<InstructorResponse>, ApiError> {
        let search = normalize_search(search);
        let records = InstructorRepository::list(pool, search.as_deref(), status)
            .await
            .map_err(ApiError::Internal)?;

        let today = studio.today();
        records.into_iter().map(|r| to_response(r, today)).collect()
    }

    pub async fn active_count(pool: &PgPool) -> Result<i64, ApiError> {
        InstructorRepository::count_by_status(pool, InstructorStatus::Active)
            .await
            .map_err(ApiError::Internal)
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), ApiError> {
        let deleted = InstructorRepository::delete(pool, id)
            .await
            .map_err(|e| match ApiError::from_repository(e) {
                ApiError::Conflict(_) => ApiError::Conflict(
                    "Instructor has schedules, evaluations or evolution records".to_string(),
                ),
                other => other,
            })?;

        if !deleted {
            return Err(not_found(id));
        }
        info!(instructor_id = %id, "Instructor deleted");
        Ok(())
    }

    /// Load an instructor or fail with 404
    pub async fn find(pool: &PgPool, id: Uuid) -> Result<InstructorRecord, ApiError> {
        InstructorRepository::find_by_id(pool, id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| not_found(id))
    }

    async fn ensure_unique(
        pool: &PgPool,
        input: &InstructorInput,
        except: Option<Uuid>,
    ) -> Result<(), ApiError> {
        let by_email = InstructorRepository::find_by_email(pool, &input.email)
            .await
            .map_err(ApiError::Internal)?;
        if by_email.is_some_and(|other| Some(other.id) != except) {
            return Err(ApiError::Conflict("Email already in use".to_string()));
        }

        let by_cpf = InstructorRepository::find_by_cpf(pool, &input.cpf)
            .await
            .map_err(ApiError::Internal)?;
        if by_cpf.is_some_and(|other| Some(other.id) != except) {
            return Err(ApiError::Conflict("CPF already registered".to_string()));
        }
        Ok(())
    }
}

fn not_found(id: Uuid) -> ApiError {
    ApiError::NotFound(format!("Instructor {} not found", id))
}

fn non_negative(field: &str, value: Option<Decimal>) -> Result<Option<Decimal>, ApiError> {
    match value {
        Some(v) if v < Decimal::ZERO => {
            Err(ApiError::invalid_field(field, "Must not be negative"))
        }
        other => Ok(other),
    }
}

/// Validate and normalize a request; omitted fields fall back to the
/// existing row on update
fn prepare(
    request: InstructorRequest,
    today: NaiveDate,
    existing: Option<&InstructorRecord>,
) -> Result<InstructorInput, ApiError> {
    request.validate()?;
    validate_birth_date(request.birth_date, today)
        .map_err(|m| ApiError::invalid_field("birth_date", m))?;
    validate_cpf(&request.cpf).map_err(|m| ApiError::invalid_field("cpf", m))?;

    let hire_date = request
        .hire_date
        .or(existing.map(|r| r.hire_date))
        .unwrap_or(today);
    if hire_date < request.birth_date {
        return Err(ApiError::invalid_field(
            "hire_date",
            "Hire date cannot precede the birth date",
        ));
    }

    let current_status = existing.map(|r| r.status()).transpose()?;

    Ok(InstructorInput {
        name: request.name.trim().to_string(),
        email: normalize_email(&request.email),
        phone: request.phone.trim().to_string(),
        birth_date: request.birth_date,
        address: trimmed(request.address),
        cpf: normalize_cpf(&request.cpf),
        rg: request.rg.trim().to_string(),
        cref_number: trimmed(request.cref_number),
        specializations: clean_list(request.specializations),
        hire_date,
        salary: non_negative("salary", request.salary)?,
        hourly_rate: non_negative("hourly_rate", request.hourly_rate)?,
        status: request.status.or(current_status).unwrap_or_default(),
        notes: trimmed(request.notes),
    })
}

pub fn to_response(
    record: InstructorRecord,
    today: NaiveDate,
) -> Result<InstructorResponse, ApiError> {
    let status = record.status()?;
    let days_working = days_since(record.hire_date, today);
    Ok(InstructorResponse {
        id: record.id,
        age: years_since(record.birth_date, today),
        average_classes_per_month: average_per_month(record.total_classes, days_working),
        days_working,
        name: record.name,
        email: record.email,
        phone: record.phone,
        birth_date: record.birth_date,
        address: record.address,
        cpf: record.cpf,
        rg: record.rg,
        cref_number: record.cref_number,
        specializations: record.specializations,
        hire_date: record.hire_date,
        salary: record.salary,
        hourly_rate: record.hourly_rate,
        status,
        status_description: status.description().to_string(),
        notes: record.notes,
        total_classes: record.total_classes,
        total_students: record.total_students,
        created_at: record.created_at,
        updated_at: record.updated_at,
    })
}
