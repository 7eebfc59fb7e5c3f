//! Evolution record repository for database operations

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

const SELECT_RECORD: &str = r#"
    SELECT r.id, r.student_id, st.name AS student_name,
           r.instructor_id, i.name AS instructor_name,
           r.date, r.session, r.focus, r.exercises_performed, r.progress_notes,
           r.difficulties_observed, r.improvements, r.next_session_goals,
           r.overall_rating, r.pain_level, r.mobility_level, r.strength_level,
           r.balance_level, r.endurance_level, r.observations, r.equipment,
           r.duration_minutes, r.created_at, r.updated_at
    FROM evolution_records r
    JOIN students st ON st.id = r.student_id
    JOIN instructors i ON i.id = r.instructor_id
"#;

/// Evolution record joined with participant names
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EvolutionRecord {
    pub id: Uuid,
    pub student_id: Uuid,
    pub student_name: String,
    pub instructor_id: Uuid,
    pub instructor_name: String,
    pub date: NaiveDate,
    pub session: i32,
    pub focus: String,
    pub exercises_performed: Vec<String>,
    pub progress_notes: Option<String>,
    pub difficulties_observed: Option<String>,
    pub improvements: Option<String>,
    pub next_session_goals: Option<String>,
    pub overall_rating: Option<i32>,
    pub pain_level: Option<i32>,
    pub mobility_level: Option<i32>,
    pub strength_level: Option<i32>,
    pub balance_level: Option<i32>,
    pub endurance_level: Option<i32>,
    pub observations: Option<String>,
    pub equipment: Vec<String>,
    pub duration_minutes: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Column values written on create and update, session already resolved
#[derive(Debug, Clone)]
pub struct EvolutionInput {
    pub student_id: Uuid,
    pub instructor_id: Uuid,
    pub date: NaiveDate,
    pub session: i32,
    pub focus: String,
    pub exercises_performed: Vec<String>,
    pub progress_notes: Option<String>,
    pub difficulties_observed: Option<String>,
    pub improvements: Option<String>,
    pub next_session_goals: Option<String>,
    pub overall_rating: Option<i32>,
    pub pain_level: Option<i32>,
    pub mobility_level: Option<i32>,
    pub strength_level: Option<i32>,
    pub balance_level: Option<i32>,
    pub endurance_level: Option<i32>,
    pub observations: Option<String>,
    pub equipment: Vec<String>,
    pub duration_minutes: i32,
}

/// Evolution record repository for database operations
pub struct EvolutionRepository;

impl EvolutionRepository {
    pub async fn create<'e, E: PgExecutor<'e>>(executor: E, input: &EvolutionInput) -> Result<Uuid> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO evolution_records (
                student_id, instructor_id, date, session, focus, exercises_performed,
                progress_notes, difficulties_observed, improvements, next_session_goals,
                overall_rating, pain_level, mobility_level, strength_level, balance_level,
                endurance_level, observations, equipment, duration_minutes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            RETURNING id
            "#,
        )
        .bind(input.student_id)
        .bind(input.instructor_id)
        .bind(input.date)
        .bind(input.session)
        .bind(&input.focus)
        .bind(&input.exercises_performed)
        .bind(&input.progress_notes)
        .bind(&input.difficulties_observed)
        .bind(&input.improvements)
        .bind(&input.next_session_goals)
        .bind(input.overall_rating)
        .bind(input.pain_level)
        .bind(input.mobility_level)
        .bind(input.strength_level)
        .bind(input.balance_level)
        .bind(input.endurance_level)
        .bind(&input.observations)
        .bind(&input.equipment)
        .bind(input.duration_minutes)
        .fetch_one(executor)
        .await?;

        Ok(id)
    }

    pub async fn update<'e, E: PgExecutor<'e>>(
        executor: E,
        id: Uuid,
        input: &EvolutionInput,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE evolution_records SET
                student_id = $2, instructor_id = $3, date = $4, session = $5, focus = $6,
                exercises_performed = $7, progress_notes = $8, difficulties_observed = $9,
                improvements = $10, next_session_goals = $11, overall_rating = $12,
                pain_level = $13, mobility_level = $14, strength_level = $15,
                balance_level = $16, endurance_level = $17, observations = $18,
                equipment = $19, duration_minutes = $20, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(input.student_id)
        .bind(input.instructor_id)
        .bind(input.date)
        .bind(input.session)
        .bind(&input.focus)
        .bind(&input.exercises_performed)
        .bind(&input.progress_notes)
        .bind(&input.difficulties_observed)
        .bind(&input.improvements)
        .bind(&input.next_session_goals)
        .bind(input.overall_rating)
        .bind(input.pain_level)
        .bind(input.mobility_level)
        .bind(input.strength_level)
        .bind(input.balance_level)
        .bind(input.endurance_level)
        .bind(&input.observations)
        .bind(&input.equipment)
        .bind(input.duration_minutes)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn find_by_id<'e, E: PgExecutor<'e>>(
        executor: E,
        id: Uuid,
    ) -> Result<Option<EvolutionRecord>> {
        let sql = format!("{} WHERE r.id = $1", SELECT_RECORD);
        let record = sqlx::query_as::<_, EvolutionRecord>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(record)
    }

    /// `max(session) + 1` for the student, 1 when there are no records
    pub async fn next_session<'e, E: PgExecutor<'e>>(executor: E, student_id: Uuid) -> Result<i32> {
        let next: i32 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(session), 0) + 1 FROM evolution_records WHERE student_id = $1",
        )
        .bind(student_id)
        .fetch_one(executor)
        .await?;

        Ok(next)
    }

    pub async fn list(pool: &PgPool, search: Option<&str>) -> Result<Vec<EvolutionRecord>> {
        let sql = format!(
            r#"{}
            WHERE ($1::text IS NULL
                   OR st.name ILIKE '%' || $1 || '%'
                   OR i.name ILIKE '%' || $1 || '%'
                   OR r.focus ILIKE '%' || $1 || '%')
            ORDER BY r.date DESC, r.session DESC
            "#,
            SELECT_RECORD
        );
        let records = sqlx::query_as::<_, EvolutionRecord>(&sql)
            .bind(search)
            .fetch_all(pool)
            .await?;

        Ok(records)
    }

    /// A student's records, newest first
    pub async fn list_for_student(pool: &PgPool, student_id: Uuid) -> Result<Vec<EvolutionRecord>> {
        let sql = format!(
            "{} WHERE r.student_id = $1 ORDER BY r.date DESC, r.session DESC",
            SELECT_RECORD
        );
        let records = sqlx::query_as::<_, EvolutionRecord>(&sql)
            .bind(student_id)
            .fetch_all(pool)
            .await?;

        Ok(records)
    }

    pub async fn list_for_instructor(
        pool: &PgPool,
        instructor_id: Uuid,
    ) -> Result<Vec<EvolutionRecord>> {
        let sql = format!(
            "{} WHERE r.instructor_id = $1 ORDER BY r.date DESC, r.session DESC",
            SELECT_RECORD
        );
        let records = sqlx::query_as::<_, EvolutionRecord>(&sql)
            .bind(instructor_id)
            .fetch_all(pool)
            .await?;

        Ok(records)
    }

    pub async fn list_between(
        pool: &PgPool,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<EvolutionRecord>> {
        let sql = format!(
            "{} WHERE r.date BETWEEN $1 AND $2 ORDER BY r.date DESC, r.session DESC",
            SELECT_RECORD
        );
        let records = sqlx::query_as::<_, EvolutionRecord>(&sql)
            .bind(start)
            .bind(end)
            .fetch_all(pool)
            .await?;

        Ok(records)
    }

    pub async fn count_on(pool: &PgPool, date: NaiveDate) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM evolution_records WHERE date = $1")
            .bind(date)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Mean `overall_rating` over rated sessions; `None` when none are rated
    pub async fn average_rating(pool: &PgPool, student_id: Uuid) -> Result<Option<f64>> {
        let average: Option<f64> = sqlx::query_scalar(
            "SELECT AVG(overall_rating)::float8 FROM evolution_records WHERE student_id = $1",
        )
        .bind(student_id)
        .fetch_one(pool)
        .await?;

        Ok(average)
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM evolution_records WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
