//! Student repository for database operations

use super::decode_enum;
use anyhow::Result;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use pilates_studio_shared::StudentStatus;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

/// Student record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StudentRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub birth_date: NaiveDate,
    pub address: Option<String>,
    pub emergency_contact: String,
    pub emergency_phone: String,
    pub medical_history: Option<String>,
    pub objectives: Option<String>,
    pub plan: String,
    pub status: String,
    pub registration_date: NaiveDate,
    pub last_class: Option<NaiveDateTime>,
    pub total_classes: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StudentRecord {
    pub fn status(&self) -> Result<StudentStatus> {
        decode_enum("students.status", &self.status)
    }
}

/// Column values written on create and update
#[derive(Debug, Clone)]
pub struct StudentInput {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub birth_date: NaiveDate,
    pub address: Option<String>,
    pub emergency_contact: String,
    pub emergency_phone: String,
    pub medical_history: Option<String>,
    pub objectives: Option<String>,
    pub plan: String,
    pub status: StudentStatus,
    pub registration_date: NaiveDate,
}

/// Student repository for database operations
pub struct StudentRepository;

impl StudentRepository {
    pub async fn create(pool: &PgPool, input: &StudentInput) -> Result<StudentRecord> {
        let record = sqlx::query_as::<_, StudentRecord>(
            r#"
            INSERT INTO students (
                name, email, phone, birth_date, address, emergency_contact, emergency_phone,
                medical_history, objectives, plan, status, registration_date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING id, name, email, phone, birth_date, address, emergency_contact,
                      emergency_phone, medical_history, objectives, plan, status,
                      registration_date, last_class, total_classes, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(input.birth_date)
        .bind(&input.address)
        .bind(&input.emergency_contact)
        .bind(&input.emergency_phone)
        .bind(&input.medical_history)
        .bind(&input.objectives)
        .bind(&input.plan)
        .bind(input.status.as_str())
        .bind(input.registration_date)
        .fetch_one(pool)
        .await?;

        Ok(record)
    }

    /// Replace the editable columns; counters and `last_class` are untouched
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        input: &StudentInput,
    ) -> Result<Option<StudentRecord>> {
        let record = sqlx::query_as::<_, StudentRecord>(
            r#"
            UPDATE students SET
                name = $2, email = $3, phone = $4, birth_date = $5, address = $6,
                emergency_contact = $7, emergency_phone = $8, medical_history = $9,
                objectives = $10, plan = $11, status = $12, registration_date = $13,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, email, phone, birth_date, address, emergency_contact,
                      emergency_phone, medical_history, objectives, plan, status,
                      registration_date, last_class, total_classes, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(input.birth_date)
        .bind(&input.address)
        .bind(&input.emergency_contact)
        .bind(&input.emergency_phone)
        .bind(&input.medical_history)
        .bind(&input.objectives)
        .bind(&input.plan)
        .bind(input.status.as_str())
        .bind(input.registration_date)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    pub async fn find_by_id<'e, E: PgExecutor<'e>>(
        executor: E,
        id: Uuid,
    ) -> Result<Option<StudentRecord>> {
        let record = sqlx::query_as::<_, StudentRecord>(
            r#"
            SELECT id, name, email, phone, birth_date, address, emergency_contact,
                   emergency_phone, medical_history, objectives, plan, status,
                   registration_date, last_class, total_classes, created_at, updated_at
            FROM students
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(record)
    }

    /// Case-insensitive email lookup
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<StudentRecord>> {
        let record = sqlx::query_as::<_, StudentRecord>(
            r#"
            SELECT id, name, email, phone, birth_date, address, emergency_contact,
                   emergency_phone, medical_history, objectives, plan, status,
                   registration_date, last_class, total_classes, created_at, updated_at
            FROM students
            WHERE LOWER(email) = LOWER($1)
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    /// List students, optionally matching `search` against name, email or phone
    pub async fn list(
        pool: &PgPool,
        search: Option<&str>,
        status: Option<StudentStatus>,
    ) -> Result<Vec<StudentRecord>> {
        let records = sqlx::query_as::<_, StudentRecord>(
            r#"
            SELECT id, name, email, phone, birth_date, address, emergency_contact,
                   emergency_phone, medical_history, objectives, plan, status,
                   registration_date, last_class, total_classes, created_at, updated_at
            FROM students
            WHERE ($1::text IS NULL
                   OR name ILIKE '%' || $1 || '%'
                   OR email ILIKE '%' || $1 || '%'
                   OR phone ILIKE '%' || $1 || '%')
              AND ($2::text IS NULL OR status = $2)
            ORDER BY name ASC
            "#,
        )
        .bind(search)
        .bind(status.map(|s| s.as_str()))
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    pub async fn count_by_status(pool: &PgPool, status: StudentStatus) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM students WHERE status = $1")
            .bind(status.as_str())
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    pub async fn count_all(pool: &PgPool) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM students")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Students whose registration date falls in `[start, end]`
    pub async fn count_registered_between(
        pool: &PgPool,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM students WHERE registration_date BETWEEN $1 AND $2",
        )
        .bind(start)
        .bind(end)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }

    /// Active students grouped by plan, largest group first
    pub async fn count_active_by_plan(pool: &PgPool) -> Result<Vec<(String, i64)>> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT plan, COUNT(*)
            FROM students
            WHERE status = 'active'
            GROUP BY plan
            ORDER BY COUNT(*) DESC, plan ASC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }

    /// Lock the student row for the rest of the transaction; `false` if missing
    pub async fn lock<'e, E: PgExecutor<'e>>(executor: E, id: Uuid) -> Result<bool> {
        let locked: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM students WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(executor)
                .await?;

        Ok(locked.is_some())
    }

    /// Count one more completed class and move `last_class` forward
    pub async fn record_completed_class<'e, E: PgExecutor<'e>>(
        executor: E,
        id: Uuid,
        class_start: NaiveDateTime,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE students SET
                total_classes = total_classes + 1,
                last_class = GREATEST(last_class, $2),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(class_start)
        .execute(executor)
        .await?;

        Ok(())
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
