//! Instructor repository for database operations

use super::decode_enum;
use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use pilates_studio_shared::InstructorStatus;
use rust_decimal::Decimal;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

/// Instructor record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct InstructorRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub birth_date: NaiveDate,
    pub address: Option<String>,
    pub cpf: String,
    pub rg: String,
    pub cref_number: Option<String>,
    pub specializations: Vec<String>,
    pub hire_date: NaiveDate,
    pub salary: Option<Decimal>,
    pub hourly_rate: Option<Decimal>,
    pub status: String,
    pub notes: Option<String>,
    pub total_classes: i32,
    pub total_students: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InstructorRecord {
    pub fn status(&self) -> Result<InstructorStatus> {
        decode_enum("instructors.status", &self.status)
    }
}

/// Column values written on create and update
#[derive(Debug, Clone)]
pub struct InstructorInput {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub birth_date: NaiveDate,
    pub address: Option<String>,
    /// Digits only
    pub cpf: String,
    pub rg: String,
    pub cref_number: Option<String>,
    pub specializations: Vec<String>,
    pub hire_date: NaiveDate,
    pub salary: Option<Decimal>,
    pub hourly_rate: Option<Decimal>,
    pub status: InstructorStatus,
    pub notes: Option<String>,
}

/// Instructor repository for database operations
pub struct InstructorRepository;

impl InstructorRepository {
    pub async fn create(pool: &PgPool, input: &InstructorInput) -> Result<InstructorRecord> {
        let record = sqlx::query_as::<_, InstructorRecord>(
            r#"
            INSERT INTO instructors (
                name, email, phone, birth_date, address, cpf, rg, cref_number,
                specializations, hire_date, salary, hourly_rate, status, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING id, name, email, phone, birth_date, address, cpf, rg, cref_number,
                      specializations, hire_date, salary, hourly_rate, status, notes,
                      total_classes, total_students, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(input.birth_date)
        .bind(&input.address)
        .bind(&input.cpf)
        .bind(&input.rg)
        .bind(&input.cref_number)
        .bind(&input.specializations)
        .bind(input.hire_date)
        .bind(input.salary)
        .bind(input.hourly_rate)
        .bind(input.status.as_str())
        .bind(&input.notes)
        .fetch_one(pool)
        .await?;

        Ok(record)
    }

    /// Replace the editable columns; counters are untouched
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        input: &InstructorInput,
    ) -> Result<Option<InstructorRecord>> {
        let record = sqlx::query_as::<_, InstructorRecord>(
            r#"
            UPDATE instructors SET
                name = $2, email = $3, phone = $4, birth_date = $5, address = $6,
                cpf = $7, rg = $8, cref_number = $9, specializations = $10,
                hire_date = $11, salary = $12, hourly_rate = $13, status = $14,
                notes = $15, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, email, phone, birth_date, address, cpf, rg, cref_number,
                      specializations, hire_date, salary, hourly_rate, status, notes,
                      total_classes, total_students, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(input.birth_date)
        .bind(&input.address)
        .bind(&input.cpf)
        .bind(&input.rg)
        .bind(&input.cref_number)
        .bind(&input.specializations)
        .bind(input.hire_date)
        .bind(input.salary)
        .bind(input.hourly_rate)
        .bind(input.status.as_str())
        .bind(&input.notes)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    pub async fn find_by_id<'e, E: PgExecutor<'e>>(
        executor: E,
        id: Uuid,
    ) -> Result<Option<InstructorRecord>> {
        let record = sqlx::query_as::<_, InstructorRecord>(
            r#"
            SELECT id, name, email, phone, birth_date, address, cpf, rg, cref_number,
                   specializations, hire_date, salary, hourly_rate, status, notes,
                   total_classes, total_students, created_at, updated_at
            FROM instructors
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(record)
    }

    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<InstructorRecord>> {
        let record = sqlx::query_as::<_, InstructorRecord>(
            r#"
            SELECT id, name, email, phone, birth_date, address, cpf, rg, cref_number,
                   specializations, hire_date, salary, hourly_rate, status, notes,
                   total_classes, total_students, created_at, updated_at
            FROM instructors
            WHERE LOWER(email) = LOWER($1)
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    /// `cpf` must already be normalized to digits
    pub async fn find_by_cpf(pool: &PgPool, cpf: &str) -> Result<Option<InstructorRecord>> {
        let record = sqlx::query_as::<_, InstructorRecord>(
            r#"
            SELECT id, name, email, phone, birth_date, address, cpf, rg, cref_number,
                   specializations, hire_date, salary, hourly_rate, status, notes,
                   total_classes, total_students, created_at, updated_at
            FROM instructors
            WHERE cpf = $1
            "#,
        )
        .bind(cpf)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    /// List instructors, optionally matching `search` against name, email, phone or CPF
    pub async fn list(
        pool: &PgPool,
        search: Option<&str>,
        status: Option<InstructorStatus>,
    ) -> Result<Vec<InstructorRecord>> {
        let records = sqlx::query_as::<_, InstructorRecord>(
            r#"
            SELECT id, name, email, phone, birth_date, address, cpf, rg, cref_number,
                   specializations, hire_date, salary, hourly_rate, status, notes,
                   total_classes, total_students, created_at, updated_at
            FROM instructors
            WHERE ($1::text IS NULL
                   OR name ILIKE '%' || $1 || '%'
                   OR email ILIKE '%' || $1 || '%'
                   OR phone ILIKE '%' || $1 || '%'
                   OR cpf LIKE '%' || $1 || '%')
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

    pub async fn count_by_status(pool: &PgPool, status: InstructorStatus) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM instructors WHERE status = $1")
            .bind(status.as_str())
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Lock the instructor row for the rest of the transaction; `false` if missing
    ///
    /// Bookings for one instructor serialize on this lock, so the overlap
    /// check and the insert that follows it see the same schedule set.
    pub async fn lock<'e, E: PgExecutor<'e>>(executor: E, id: Uuid) -> Result<bool> {
        let locked: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM instructors WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(executor)
                .await?;

        Ok(locked.is_some())
    }

    /// Count one more completed class, and one more student when it is a new pairing
    pub async fn record_completed_class<'e, E: PgExecutor<'e>>(
        executor: E,
        id: Uuid,
        first_with_student: bool,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE instructors SET
                total_classes = total_classes + 1,
                total_students = total_students + $2,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(i32::from(first_with_student))
        .execute(executor)
        .await?;

        Ok(())
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM instructors WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
