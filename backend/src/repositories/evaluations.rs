//! Physical evaluation repository for database operations

use super::decode_enum;
use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use pilates_studio_shared::EvaluationType;
use rust_decimal::Decimal;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

const SELECT_EVALUATION: &str = r#"
    SELECT e.id, e.student_id, st.name AS student_name,
           e.instructor_id, i.name AS instructor_name,
           e.date, e.evaluation_type, e.weight_kg, e.height_m, e.bmi,
           e.blood_pressure, e.heart_rate, e.body_fat, e.muscle_mass,
           e.chest_cm, e.waist_cm, e.hip_cm, e.thigh_cm, e.arm_cm,
           e.flexibility_shoulder, e.flexibility_spinal, e.flexibility_hip, e.flexibility_ankle,
           e.strength_core, e.strength_upper_body, e.strength_lower_body, e.strength_grip,
           e.balance_static, e.balance_dynamic, e.balance_proprioception,
           e.posture_head, e.posture_shoulders, e.posture_spine,
           e.posture_pelvis, e.posture_knees, e.posture_feet,
           e.medical_observations, e.objectives, e.treatment_plan, e.recommendations,
           e.next_evaluation_date, e.photos, e.attachments, e.created_at, e.updated_at
    FROM physical_evaluations e
    JOIN students st ON st.id = e.student_id
    JOIN instructors i ON i.id = e.instructor_id
"#;

/// Physical evaluation record joined with participant names
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EvaluationRecord {
    pub id: Uuid,
    pub student_id: Uuid,
    pub student_name: String,
    pub instructor_id: Uuid,
    pub instructor_name: String,
    pub date: NaiveDate,
    pub evaluation_type: String,
    pub weight_kg: Decimal,
    pub height_m: Decimal,
    pub bmi: Decimal,
    pub blood_pressure: Option<String>,
    pub heart_rate: Option<i32>,
    pub body_fat: Option<Decimal>,
    pub muscle_mass: Option<Decimal>,
    pub chest_cm: Option<Decimal>,
    pub waist_cm: Option<Decimal>,
    pub hip_cm: Option<Decimal>,
    pub thigh_cm: Option<Decimal>,
    pub arm_cm: Option<Decimal>,
    pub flexibility_shoulder: Option<Decimal>,
    pub flexibility_spinal: Option<Decimal>,
    pub flexibility_hip: Option<Decimal>,
    pub flexibility_ankle: Option<Decimal>,
    pub strength_core: Option<i32>,
    pub strength_upper_body: Option<i32>,
    pub strength_lower_body: Option<i32>,
    pub strength_grip: Option<i32>,
    pub balance_static: Option<i32>,
    pub balance_dynamic: Option<i32>,
    pub balance_proprioception: Option<i32>,
    pub posture_head: Option<String>,
    pub posture_shoulders: Option<String>,
    pub posture_spine: Option<String>,
    pub posture_pelvis: Option<String>,
    pub posture_knees: Option<String>,
    pub posture_feet: Option<String>,
    pub medical_observations: Option<String>,
    pub objectives: Option<String>,
    pub treatment_plan: Option<String>,
    pub recommendations: Option<String>,
    pub next_evaluation_date: Option<NaiveDate>,
    pub photos: Vec<String>,
    pub attachments: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EvaluationRecord {
    pub fn evaluation_type(&self) -> Result<EvaluationType> {
        decode_enum("physical_evaluations.evaluation_type", &self.evaluation_type)
    }
}

/// Column values written on create and update, BMI already derived
#[derive(Debug, Clone)]
pub struct EvaluationInput {
    pub student_id: Uuid,
    pub instructor_id: Uuid,
    pub date: NaiveDate,
    pub evaluation_type: EvaluationType,
    pub weight_kg: Decimal,
    pub height_m: Decimal,
    pub bmi: Decimal,
    pub blood_pressure: Option<String>,
    pub heart_rate: Option<i32>,
    pub body_fat: Option<Decimal>,
    pub muscle_mass: Option<Decimal>,
    pub chest_cm: Option<Decimal>,
    pub waist_cm: Option<Decimal>,
    pub hip_cm: Option<Decimal>,
    pub thigh_cm: Option<Decimal>,
    pub arm_cm: Option<Decimal>,
    pub flexibility_shoulder: Option<Decimal>,
    pub flexibility_spinal: Option<Decimal>,
    pub flexibility_hip: Option<Decimal>,
    pub flexibility_ankle: Option<Decimal>,
    pub strength_core: Option<i32>,
    pub strength_upper_body: Option<i32>,
    pub strength_lower_body: Option<i32>,
    pub strength_grip: Option<i32>,
    pub balance_static: Option<i32>,
    pub balance_dynamic: Option<i32>,
    pub balance_proprioception: Option<i32>,
    pub posture_head: Option<String>,
    pub posture_shoulders: Option<String>,
    pub posture_spine: Option<String>,
    pub posture_pelvis: Option<String>,
    pub posture_knees: Option<String>,
    pub posture_feet: Option<String>,
    pub medical_observations: Option<String>,
    pub objectives: Option<String>,
    pub treatment_plan: Option<String>,
    pub recommendations: Option<String>,
    pub next_evaluation_date: Option<NaiveDate>,
    pub photos: Vec<String>,
    pub attachments: Vec<String>,
}

/// Physical evaluation repository for database operations
pub struct EvaluationRepository;

impl EvaluationRepository {
    pub async fn create(pool: &PgPool, input: &EvaluationInput) -> Result<Uuid> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO physical_evaluations (
                student_id, instructor_id, date, evaluation_type, weight_kg, height_m, bmi,
                blood_pressure, heart_rate, body_fat, muscle_mass,
                chest_cm, waist_cm, hip_cm, thigh_cm, arm_cm,
                flexibility_shoulder, flexibility_spinal, flexibility_hip, flexibility_ankle,
                strength_core, strength_upper_body, strength_lower_body, strength_grip,
                balance_static, balance_dynamic, balance_proprioception,
                posture_head, posture_shoulders, posture_spine,
                posture_pelvis, posture_knees, posture_feet,
                medical_observations, objectives, treatment_plan, recommendations,
                next_evaluation_date, photos, attachments
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, $28, $29, $30,
                $31, $32, $33, $34, $35, $36, $37, $38, $39, $40
            )
            RETURNING id
            "#,
        )
        .bind(input.student_id)
        .bind(input.instructor_id)
        .bind(input.date)
        .bind(input.evaluation_type.as_str())
        .bind(input.weight_kg)
        .bind(input.height_m)
        .bind(input.bmi)
        .bind(&input.blood_pressure)
        .bind(input.heart_rate)
        .bind(input.body_fat)
        .bind(input.muscle_mass)
        .bind(input.chest_cm)
        .bind(input.waist_cm)
        .bind(input.hip_cm)
        .bind(input.thigh_cm)
        .bind(input.arm_cm)
        .bind(input.flexibility_shoulder)
        .bind(input.flexibility_spinal)
        .bind(input.flexibility_hip)
        .bind(input.flexibility_ankle)
        .bind(input.strength_core)
        .bind(input.strength_upper_body)
        .bind(input.strength_lower_body)
        .bind(input.strength_grip)
        .bind(input.balance_static)
        .bind(input.balance_dynamic)
        .bind(input.balance_proprioception)
        .bind(&input.posture_head)
        .bind(&input.posture_shoulders)
        .bind(&input.posture_spine)
        .bind(&input.posture_pelvis)
        .bind(&input.posture_knees)
        .bind(&input.posture_feet)
        .bind(&input.medical_observations)
        .bind(&input.objectives)
        .bind(&input.treatment_plan)
        .bind(&input.recommendations)
        .bind(input.next_evaluation_date)
        .bind(&input.photos)
        .bind(&input.attachments)
        .fetch_one(pool)
        .await?;

        Ok(id)
    }

    pub async fn update(pool: &PgPool, id: Uuid, input: &EvaluationInput) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE physical_evaluations SET
                student_id = $2, instructor_id = $3, date = $4, evaluation_type = $5,
                weight_kg = $6, height_m = $7, bmi = $8,
                blood_pressure = $9, heart_rate = $10, body_fat = $11, muscle_mass = $12,
                chest_cm = $13, waist_cm = $14, hip_cm = $15, thigh_cm = $16, arm_cm = $17,
                flexibility_shoulder = $18, flexibility_spinal = $19,
                flexibility_hip = $20, flexibility_ankle = $21,
                strength_core = $22, strength_upper_body = $23,
                strength_lower_body = $24, strength_grip = $25,
                balance_static = $26, balance_dynamic = $27, balance_proprioception = $28,
                posture_head = $29, posture_shoulders = $30, posture_spine = $31,
                posture_pelvis = $32, posture_knees = $33, posture_feet = $34,
                medical_observations = $35, objectives = $36, treatment_plan = $37,
                recommendations = $38, next_evaluation_date = $39,
                photos = $40, attachments = $41, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(input.student_id)
        .bind(input.instructor_id)
        .bind(input.date)
        .bind(input.evaluation_type.as_str())
        .bind(input.weight_kg)
        .bind(input.height_m)
        .bind(input.bmi)
        .bind(&input.blood_pressure)
        .bind(input.heart_rate)
        .bind(input.body_fat)
        .bind(input.muscle_mass)
        .bind(input.chest_cm)
        .bind(input.waist_cm)
        .bind(input.hip_cm)
        .bind(input.thigh_cm)
        .bind(input.arm_cm)
        .bind(input.flexibility_shoulder)
        .bind(input.flexibility_spinal)
        .bind(input.flexibility_hip)
        .bind(input.flexibility_ankle)
        .bind(input.strength_core)
        .bind(input.strength_upper_body)
        .bind(input.strength_lower_body)
        .bind(input.strength_grip)
        .bind(input.balance_static)
        .bind(input.balance_dynamic)
        .bind(input.balance_proprioception)
        .bind(&input.posture_head)
        .bind(&input.posture_shoulders)
        .bind(&input.posture_spine)
        .bind(&input.posture_pelvis)
        .bind(&input.posture_knees)
        .bind(&input.posture_feet)
        .bind(&input.medical_observations)
        .bind(&input.objectives)
        .bind(&input.treatment_plan)
        .bind(&input.recommendations)
        .bind(input.next_evaluation_date)
        .bind(&input.photos)
        .bind(&input.attachments)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn find_by_id<'e, E: PgExecutor<'e>>(
        executor: E,
        id: Uuid,
    ) -> Result<Option<EvaluationRecord>> {
        let sql = format!("{} WHERE e.id = $1", SELECT_EVALUATION);
        let record = sqlx::query_as::<_, EvaluationRecord>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(record)
    }

    /// Filtered list, newest first
    pub async fn list(
        pool: &PgPool,
        search: Option<&str>,
        evaluation_type: Option<EvaluationType>,
    ) -> Result<Vec<EvaluationRecord>> {
        let sql = format!(
            r#"{}
            WHERE ($1::text IS NULL
                   OR st.name ILIKE '%' || $1 || '%'
                   OR i.name ILIKE '%' || $1 || '%')
              AND ($2::text IS NULL OR e.evaluation_type = $2)
            ORDER BY e.date DESC, e.created_at DESC
            "#,
            SELECT_EVALUATION
        );
        let records = sqlx::query_as::<_, EvaluationRecord>(&sql)
            .bind(search)
            .bind(evaluation_type.map(|t| t.as_str()))
            .fetch_all(pool)
            .await?;

        Ok(records)
    }

    /// A student's evaluations, newest first
    pub async fn list_for_student(pool: &PgPool, student_id: Uuid) -> Result<Vec<EvaluationRecord>> {
        let sql = format!(
            "{} WHERE e.student_id = $1 ORDER BY e.date DESC, e.created_at DESC",
            SELECT_EVALUATION
        );
        let records = sqlx::query_as::<_, EvaluationRecord>(&sql)
            .bind(student_id)
            .fetch_all(pool)
            .await?;

        Ok(records)
    }

    pub async fn list_for_instructor(
        pool: &PgPool,
        instructor_id: Uuid,
    ) -> Result<Vec<EvaluationRecord>> {
        let sql = format!(
            "{} WHERE e.instructor_id = $1 ORDER BY e.date DESC, e.created_at DESC",
            SELECT_EVALUATION
        );
        let records = sqlx::query_as::<_, EvaluationRecord>(&sql)
            .bind(instructor_id)
            .fetch_all(pool)
            .await?;

        Ok(records)
    }

    pub async fn list_between(
        pool: &PgPool,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<EvaluationRecord>> {
        let sql = format!(
            "{} WHERE e.date BETWEEN $1 AND $2 ORDER BY e.date DESC, e.created_at DESC",
            SELECT_EVALUATION
        );
        let records = sqlx::query_as::<_, EvaluationRecord>(&sql)
            .bind(start)
            .bind(end)
            .fetch_all(pool)
            .await?;

        Ok(records)
    }

    pub async fn count_by_type(pool: &PgPool, evaluation_type: EvaluationType) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM physical_evaluations WHERE evaluation_type = $1",
        )
        .bind(evaluation_type.as_str())
        .fetch_one(pool)
        .await?;

        Ok(count)
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM physical_evaluations WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
