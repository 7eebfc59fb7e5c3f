//! Schedule repository for database operations
//!
//! Reads always join the student and instructor names so responses can be
//! built without a second round trip.

use super::decode_enum;
use anyhow::Result;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use pilates_studio_shared::{PaymentStatus, ScheduleStatus};
use rust_decimal::Decimal;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

const SELECT_SCHEDULE: &str = r#"
    SELECT sc.id, sc.student_id, st.name AS student_name,
           sc.instructor_id, i.name AS instructor_name,
           sc.date, sc.start_time, sc.end_time, sc.class_type, sc.status, sc.notes,
           sc.room, sc.equipment, sc.price, sc.payment_status,
           sc.created_at, sc.updated_at
    FROM schedules sc
    JOIN students st ON st.id = sc.student_id
    JOIN instructors i ON i.id = sc.instructor_id
"#;

/// Schedule record joined with participant names
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ScheduleRecord {
    pub id: Uuid,
    pub student_id: Uuid,
    pub student_name: String,
    pub instructor_id: Uuid,
    pub instructor_name: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub class_type: String,
    pub status: String,
    pub notes: Option<String>,
    pub room: String,
    pub equipment: Vec<String>,
    pub price: Decimal,
    pub payment_status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ScheduleRecord {
    pub fn status(&self) -> Result<ScheduleStatus> {
        decode_enum("schedules.status", &self.status)
    }

    pub fn payment_status(&self) -> Result<PaymentStatus> {
        decode_enum("schedules.payment_status", &self.payment_status)
    }
}

/// Column values written on create and update
#[derive(Debug, Clone)]
pub struct ScheduleInput {
    pub student_id: Uuid,
    pub instructor_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub class_type: String,
    pub status: ScheduleStatus,
    pub notes: Option<String>,
    pub room: String,
    pub equipment: Vec<String>,
    pub price: Decimal,
    pub payment_status: PaymentStatus,
}

/// Optional filters for listing schedules; `None` means "any"
#[derive(Debug, Clone, Default)]
pub struct ScheduleFilter {
    pub search: Option<String>,
    pub status: Option<ScheduleStatus>,
    pub student_id: Option<Uuid>,
    pub instructor_id: Option<Uuid>,
    pub date: Option<NaiveDate>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Schedule repository for database operations
pub struct ScheduleRepository;

impl ScheduleRepository {
    /// Insert and return the new id
    pub async fn create<'e, E: PgExecutor<'e>>(executor: E, input: &ScheduleInput) -> Result<Uuid> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO schedules (
                student_id, instructor_id, date, start_time, end_time, class_type,
                status, notes, room, equipment, price, payment_status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING id
            "#,
        )
        .bind(input.student_id)
        .bind(input.instructor_id)
        .bind(input.date)
        .bind(input.start_time)
        .bind(input.end_time)
        .bind(&input.class_type)
        .bind(input.status.as_str())
        .bind(&input.notes)
        .bind(&input.room)
        .bind(&input.equipment)
        .bind(input.price)
        .bind(input.payment_status.as_str())
        .fetch_one(executor)
        .await?;

        Ok(id)
    }

    /// Overwrite every column, status included; callers validate the transition
    pub async fn update<'e, E: PgExecutor<'e>>(
        executor: E,
        id: Uuid,
        input: &ScheduleInput,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE schedules SET
                student_id = $2, instructor_id = $3, date = $4, start_time = $5,
                end_time = $6, class_type = $7, status = $8, notes = $9, room = $10,
                equipment = $11, price = $12, payment_status = $13, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(input.student_id)
        .bind(input.instructor_id)
        .bind(input.date)
        .bind(input.start_time)
        .bind(input.end_time)
        .bind(&input.class_type)
        .bind(input.status.as_str())
        .bind(&input.notes)
        .bind(&input.room)
        .bind(&input.equipment)
        .bind(input.price)
        .bind(input.payment_status.as_str())
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn update_status<'e, E: PgExecutor<'e>>(
        executor: E,
        id: Uuid,
        status: ScheduleStatus,
    ) -> Result<()> {
        sqlx::query("UPDATE schedules SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .execute(executor)
            .await?;

        Ok(())
    }

    pub async fn find_by_id<'e, E: PgExecutor<'e>>(
        executor: E,
        id: Uuid,
    ) -> Result<Option<ScheduleRecord>> {
        let sql = format!("{} WHERE sc.id = $1", SELECT_SCHEDULE);
        let record = sqlx::query_as::<_, ScheduleRecord>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(record)
    }

    /// Lock the schedule row and return it, for read-modify-write of its status
    pub async fn find_for_update<'e, E: PgExecutor<'e>>(
        executor: E,
        id: Uuid,
    ) -> Result<Option<ScheduleRecord>> {
        let sql = format!("{} WHERE sc.id = $1 FOR UPDATE OF sc", SELECT_SCHEDULE);
        let record = sqlx::query_as::<_, ScheduleRecord>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(record)
    }

    /// First non-cancelled class of the instructor that overlaps `[start, end)` on `date`
    pub async fn find_overlapping<'e, E: PgExecutor<'e>>(
        executor: E,
        instructor_id: Uuid,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
        exclude_id: Option<Uuid>,
    ) -> Result<Option<ScheduleRecord>> {
        let sql = format!(
            r#"{}
            WHERE sc.instructor_id = $1
              AND sc.date = $2
              AND sc.status <> 'cancelled'
              AND sc.start_time < $4
              AND sc.end_time > $3
              AND ($5::uuid IS NULL OR sc.id <> $5)
            ORDER BY sc.start_time ASC
            LIMIT 1
            "#,
            SELECT_SCHEDULE
        );
        let record = sqlx::query_as::<_, ScheduleRecord>(&sql)
            .bind(instructor_id)
            .bind(date)
            .bind(start)
            .bind(end)
            .bind(exclude_id)
            .fetch_optional(executor)
            .await?;

        Ok(record)
    }

    /// Whether the pair already shares a completed class other than `exclude_id`
    pub async fn has_completed_class<'e, E: PgExecutor<'e>>(
        executor: E,
        student_id: Uuid,
        instructor_id: Uuid,
        exclude_id: Uuid,
    ) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM schedules
                WHERE student_id = $1 AND instructor_id = $2
                  AND status = 'completed' AND id <> $3
            )
            "#,
        )
        .bind(student_id)
        .bind(instructor_id)
        .bind(exclude_id)
        .fetch_one(executor)
        .await?;

        Ok(exists)
    }

    /// Filtered list ordered by date (newest first), then start time
    pub async fn list(pool: &PgPool, filter: &ScheduleFilter) -> Result<Vec<ScheduleRecord>> {
        let sql = format!(
            r#"{}
            WHERE ($1::text IS NULL
                   OR st.name ILIKE '%' || $1 || '%'
                   OR i.name ILIKE '%' || $1 || '%'
                   OR sc.class_type ILIKE '%' || $1 || '%'
                   OR sc.room ILIKE '%' || $1 || '%'
                   OR sc.notes ILIKE '%' || $1 || '%')
              AND ($2::text IS NULL OR sc.status = $2)
              AND ($3::uuid IS NULL OR sc.student_id = $3)
              AND ($4::uuid IS NULL OR sc.instructor_id = $4)
              AND ($5::date IS NULL OR sc.date = $5)
              AND ($6::date IS NULL OR sc.date >= $6)
              AND ($7::date IS NULL OR sc.date <= $7)
            ORDER BY sc.date DESC, sc.start_time ASC
            "#,
            SELECT_SCHEDULE
        );
        let records = sqlx::query_as::<_, ScheduleRecord>(&sql)
            .bind(filter.search.as_deref())
            .bind(filter.status.map(|s| s.as_str()))
            .bind(filter.student_id)
            .bind(filter.instructor_id)
            .bind(filter.date)
            .bind(filter.start_date)
            .bind(filter.end_date)
            .fetch_all(pool)
            .await?;

        Ok(records)
    }

    /// Every class in `[start, end]` in chronological order, for reports
    pub async fn list_between(
        pool: &PgPool,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ScheduleRecord>> {
        let sql = format!(
            "{} WHERE sc.date BETWEEN $1 AND $2 ORDER BY sc.date ASC, sc.start_time ASC",
            SELECT_SCHEDULE
        );
        let records = sqlx::query_as::<_, ScheduleRecord>(&sql)
            .bind(start)
            .bind(end)
            .fetch_all(pool)
            .await?;

        Ok(records)
    }

    /// Classes on `date` that are still expected to happen
    pub async fn list_pending_on(pool: &PgPool, date: NaiveDate) -> Result<Vec<ScheduleRecord>> {
        let sql = format!(
            r#"{}
            WHERE sc.date = $1 AND sc.status IN ('scheduled', 'confirmed')
            ORDER BY sc.start_time ASC
            "#,
            SELECT_SCHEDULE
        );
        let records = sqlx::query_as::<_, ScheduleRecord>(&sql)
            .bind(date)
            .fetch_all(pool)
            .await?;

        Ok(records)
    }

    /// Non-cancelled classes on `date`, ordered by slot
    pub async fn list_active_on(pool: &PgPool, date: NaiveDate) -> Result<Vec<ScheduleRecord>> {
        let sql = format!(
            r#"{}
            WHERE sc.date = $1 AND sc.status <> 'cancelled'
            ORDER BY sc.start_time ASC, sc.end_time ASC
            "#,
            SELECT_SCHEDULE
        );
        let records = sqlx::query_as::<_, ScheduleRecord>(&sql)
            .bind(date)
            .fetch_all(pool)
            .await?;

        Ok(records)
    }

    pub async fn count_with_status(
        pool: &PgPool,
        status: ScheduleStatus,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM schedules WHERE status = $1 AND date BETWEEN $2 AND $3",
        )
        .bind(status.as_str())
        .bind(start)
        .bind(end)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }

    /// Sum of prices of paid classes in `[start, end]`
    pub async fn paid_revenue(pool: &PgPool, start: NaiveDate, end: NaiveDate) -> Result<Decimal> {
        let revenue: Decimal = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(price), 0)
            FROM schedules
            WHERE payment_status = 'paid' AND date BETWEEN $1 AND $2
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_one(pool)
        .await?;

        Ok(revenue)
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM schedules WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
