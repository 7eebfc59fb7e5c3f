//! Student service
//!
//! CRUD with email uniqueness, lookups and the small counters shown on the
//! students screen.

use super::{normalize_email, normalize_search, trimmed};
use crate::config::StudioConfig;
use crate::error::ApiError;
use crate::repositories::{StudentInput, StudentRecord, StudentRepository};
use chrono::NaiveDate;
use pilates_studio_shared::calendar::{days_since, years_since};
use pilates_studio_shared::validation::validate_birth_date;
use pilates_studio_shared::{PlanCount, StudentRequest, StudentResponse, StudentStatus};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

/// Student service for business logic
pub struct StudentService;

impl StudentService {
    pub async fn create(
        pool: &PgPool,
        studio: &StudioConfig,
        request: StudentRequest,
    ) -> Result<StudentResponse, ApiError> {
        let today = studio.today();
        let input = Self::prepare(studio, request, today, None)?;
        Self::ensure_email_free(pool, &input.email, None).await?;

        let record = StudentRepository::create(pool, &input)
            .await
            .map_err(ApiError::from_repository)?;

        info!(student_id = %record.id, "Student registered");
        to_response(record, today)
    }

    pub async fn update(
        pool: &PgPool,
        studio: &StudioConfig,
        id: Uuid,
        request: StudentRequest,
    ) -> Result<StudentResponse, ApiError> {
        let today = studio.today();
        let existing = Self::find(pool, id).await?;
        let input = Self::prepare(studio, request, today, Some(&existing))?;
        Self::ensure_email_free(pool, &input.email, Some(id)).await?;

        let record = StudentRepository::update(pool, id, &input)
            .await
            .map_err(ApiError::from_repository)?
            .ok_or_else(|| not_found(id))?;

        to_response(record, today)
    }

    pub async fn get(pool: &PgPool, studio: &StudioConfig, id: Uuid) -> Result<StudentResponse, ApiError> {
        let record = Self::find(pool, id).await?;
        to_response(record, studio.today())
    }

    pub async fn get_by_email(
        pool: &PgPool,
        studio: &StudioConfig,
        email: &str,
    ) -> Result<StudentResponse, ApiError> {
        let record = StudentRepository::find_by_email(pool, &normalize_email(email))
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound(format!("Student with email {} not found", email)))?;
        to_response(record, studio.today())
    }

    pub async fn list(
        pool: &PgPool,
        studio: &StudioConfig,
        search: Option<String>,
        status: Option<StudentStatus>,
    ) -> Result<Vec<StudentResponse>, ApiError> {
        let search = normalize_search(search);
        let records = StudentRepository::list(pool, search.as_deref(), status)
            .await
            .map_err(ApiError::Internal)?;

        let today = studio.today();
        records.into_iter().map(|r| to_response(r, today)).collect()
    }

    pub async fn active_count(pool: &PgPool) -> Result<i64, ApiError> {
        StudentRepository::count_by_status(pool, StudentStatus::Active)
            .await
            .map_err(ApiError::Internal)
    }

    /// Active students per plan, largest group first
    pub async fn active_by_plan(pool: &PgPool) -> Result<Vec<PlanCount>, ApiError> {
        let rows = StudentRepository::count_active_by_plan(pool)
            .await
            .map_err(ApiError::Internal)?;

        Ok(rows
            .into_iter()
            .map(|(plan, count)| PlanCount { plan, count })
            .collect())
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), ApiError> {
        let deleted = StudentRepository::delete(pool, id)
            .await
            .map_err(|e| match ApiError::from_repository(e) {
                ApiError::Conflict(_) => ApiError::Conflict(
                    "Student has schedules, evaluations or evolution records".to_string(),
                ),
                other => other,
            })?;

        if !deleted {
            return Err(not_found(id));
        }
        info!(student_id = %id, "Student deleted");
        Ok(())
    }

    /// Load a student or fail with 404
    pub async fn find(pool: &PgPool, id: Uuid) -> Result<StudentRecord, ApiError> {
        StudentRepository::find_by_id(pool, id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| not_found(id))
    }

    /// Validate and normalize a request; omitted fields fall back to the
    /// existing row on update and to the studio defaults on create
    fn prepare(
        studio: &StudioConfig,
        request: StudentRequest,
        today: NaiveDate,
        existing: Option<&StudentRecord>,
    ) -> Result<StudentInput, ApiError> {
        request.validate()?;
        validate_birth_date(request.birth_date, today)
            .map_err(|m| ApiError::invalid_field("birth_date", m))?;

        let current_status = existing.map(|r| r.status()).transpose()?;

        Ok(StudentInput {
            name: request.name.trim().to_string(),
            email: normalize_email(&request.email),
            phone: request.phone.trim().to_string(),
            birth_date: request.birth_date,
            address: trimmed(request.address),
            emergency_contact: request.emergency_contact.trim().to_string(),
            emergency_phone: request.emergency_phone.trim().to_string(),
            medical_history: trimmed(request.medical_history),
            objectives: trimmed(request.objectives),
            plan: trimmed(request.plan)
                .or_else(|| existing.map(|r| r.plan.clone()))
                .unwrap_or_else(|| studio.default_plan.clone()),
            status: request.status.or(current_status).unwrap_or_default(),
            registration_date: request
                .registration_date
                .or(existing.map(|r| r.registration_date))
                .unwrap_or(today),
        })
    }

    async fn ensure_email_free(pool: &PgPool, email: &str, except: Option<Uuid>) -> Result<(), ApiError> {
        let existing = StudentRepository::find_by_email(pool, email)
            .await
            .map_err(ApiError::Internal)?;

        match existing {
            Some(other) if Some(other.id) != except => {
                Err(ApiError::Conflict("Email already in use".to_string()))
            }
            _ => Ok(()),
        }
    }
}

fn not_found(id: Uuid) -> ApiError {
    ApiError::NotFound(format!("Student {} not found", id))
}

/// Build the response with the fields derived from "today"
pub fn to_response(record: StudentRecord, today: NaiveDate) -> Result<StudentResponse, ApiError> {
    let status = record.status()?;
    Ok(StudentResponse {
        id: record.id,
        age: years_since(record.birth_date, today),
        days_since_last_class: record.last_class.map(|at| days_since(at.date(), today)),
        name: record.name,
        email: record.email,
        phone: record.phone,
        birth_date: record.birth_date,
        address: record.address,
        emergency_contact: record.emergency_contact,
        emergency_phone: record.emergency_phone,
        medical_history: record.medical_history,
        objectives: record.objectives,
        plan: record.plan,
        status,
        status_description: status.description().to_string(),
        registration_date: record.registration_date,
        last_class: record.last_class,
        total_classes: record.total_classes,
        created_at: record.created_at,
        updated_at: record.updated_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDateTime, Utc};

    fn record() -> StudentRecord {
        StudentRecord {
            id: Uuid::new_v4(),
            name: "Ana Souza".to_string(),
            email: "ana@studio.com".to_string(),
            phone: "11987654321".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1990, 6, 15).unwrap(),
            address: None,
            emergency_contact: "Carlos".to_string(),
            emergency_phone: "11987654320".to_string(),
            medical_history: None,
            objectives: None,
            plan: "Mensal - 8 aulas".to_string(),
            status: "active".to_string(),
            registration_date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            last_class: NaiveDateTime::parse_from_str("2024-06-10 08:00:00", "%Y-%m-%d %H:%M:%S").ok(),
            total_classes: 12,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_to_response_derives_age_and_gap() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 14).unwrap();
        let response = to_response(record(), today).unwrap();
        assert_eq!(response.age, 33);
        assert_eq!(response.days_since_last_class, Some(4));
        assert_eq!(response.status, StudentStatus::Active);
        assert_eq!(response.status_description, "Student active at the studio");
    }

    #[test]
    fn test_to_response_rejects_unknown_status() {
        let mut bad = record();
        bad.status = "archived".to_string();
        assert!(to_response(bad, Utc::now().date_naive()).is_err());
    }

    #[test]
    fn test_prepare_applies_defaults() {
        let studio = StudioConfig::default();
        let today = NaiveDate::from_ymd_opt(2024, 6, 14).unwrap();
        let request: StudentRequest = serde_json::from_value(serde_json::json!({
            "name": "  Ana Souza ",
            "email": "Ana@Studio.com",
            "phone": "(11) 98765-4321",
            "birth_date": "1990-06-15",
            "emergency_contact": "Carlos",
            "emergency_phone": "11987654320",
            "address": "   ",
        }))
        .unwrap();

        let input = StudentService::prepare(&studio, request, today, None).unwrap();
        assert_eq!(input.name, "Ana Souza");
        assert_eq!(input.email, "ana@studio.com");
        assert_eq!(input.plan, "Mensal - 8 aulas");
        assert_eq!(input.status, StudentStatus::Active);
        assert_eq!(input.registration_date, today);
        assert_eq!(input.address, None);
    }

    #[test]
    fn test_prepare_keeps_existing_values_on_update() {
        let studio = StudioConfig::default();
        let today = NaiveDate::from_ymd_opt(2024, 6, 14).unwrap();
        let mut existing = record();
        existing.plan = "Trimestral".to_string();
        existing.status = "suspended".to_string();
        let request: StudentRequest = serde_json::from_value(serde_json::json!({
            "name": "Ana Souza",
            "email": "ana@studio.com",
            "phone": "(11) 98765-4321",
            "birth_date": "1990-06-15",
            "emergency_contact": "Carlos",
            "emergency_phone": "11987654320",
        }))
        .unwrap();

        let input = StudentService::prepare(&studio, request, today, Some(&existing)).unwrap();
        assert_eq!(input.plan, "Trimestral");
        assert_eq!(input.status, StudentStatus::Suspended);
        assert_eq!(input.registration_date, existing.registration_date);
    }

    #[test]
    fn test_prepare_rejects_future_birth_date() {
        let studio = StudioConfig::default();
        let today = NaiveDate::from_ymd_opt(2024, 6, 14).unwrap();
        let request: StudentRequest = serde_json::from_value(serde_json::json!({
            "name": "Ana Souza",
            "email": "ana@studio.com",
            "phone": "(11) 98765-4321",
            "birth_date": "2030-01-01",
            "emergency_contact": "Carlos",
            "emergency_phone": "11987654320",
        }))
        .unwrap();

        match StudentService::prepare(&studio, request, today, None) {
            Err(ApiError::InvalidField { field, .. }) => assert_eq!(field, "birth_date"),
            other => panic!("unexpected result: {:?}", other.map(|i| i.name)),
        }
    }
}
