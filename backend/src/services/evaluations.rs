//! Physical evaluation service
//!
//! BMI is derived from weight and height on every write; the request's
//! nested groups (measurements, flexibility, strength, balance, posture)
//! are flattened into columns and rebuilt on the way out.

use super::{clean_list, normalize_search, trimmed};
use crate::error::ApiError;
use crate::repositories::{
    EvaluationInput, EvaluationRecord, EvaluationRepository, InstructorRepository,
    StudentRepository,
};
use chrono::NaiveDate;
use pilates_studio_shared::{
    calculate_bmi, classify_bmi, BalanceScores, BodyMeasurements, DateRange, EvaluationType,
    Flexibility, PhysicalEvaluationRequest, PhysicalEvaluationResponse, PostureNotes,
    StrengthScores,
};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

/// Physical evaluation service for business logic
pub struct EvaluationService;

impl EvaluationService {
    pub async fn create(
        pool: &PgPool,
        request: PhysicalEvaluationRequest,
    ) -> Result<PhysicalEvaluationResponse, ApiError> {
        let input = prepare(request)?;
        ensure_participants(pool, &input).await?;

        let id = EvaluationRepository::create(pool, &input)
            .await
            .map_err(ApiError::from_repository)?;

        info!(
            evaluation_id = %id,
            student_id = %input.student_id,
            evaluation_type = %input.evaluation_type,
            bmi = %input.bmi,
            "Physical evaluation recorded"
        );
        Self::get(pool, id).await
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        request: PhysicalEvaluationRequest,
    ) -> Result<PhysicalEvaluationResponse, ApiError> {
        Self::find(pool, id).await?;
        let input = prepare(request)?;
        ensure_participants(pool, &input).await?;

        let updated = EvaluationRepository::update(pool, id, &input)
            .await
            .map_err(ApiError::from_repository)?;
        if !updated {
            return Err(not_found(id));
        }
        Self::get(pool, id).await
    }

    pub async fn get(pool: &PgPool, id: Uuid) -> Result<PhysicalEvaluationResponse, ApiError> {
        to_response(Self::find(pool, id).await?)
    }

    pub async fn list(
        pool: &PgPool,
        search: Option<String>,
        evaluation_type: Option<EvaluationType>,
    ) -> Result<Vec<PhysicalEvaluationResponse>, ApiError> {
        let search = normalize_search(search);
        let records = EvaluationRepository::list(pool, search.as_deref(), evaluation_type)
            .await
            .map_err(ApiError::Internal)?;
        to_responses(records)
    }

    /// A student's evaluations, newest first
    pub async fn by_student(
        pool: &PgPool,
        student_id: Uuid,
    ) -> Result<Vec<PhysicalEvaluationResponse>, ApiError> {
        let records = EvaluationRepository::list_for_student(pool, student_id)
            .await
            .map_err(ApiError::Internal)?;
        to_responses(records)
    }

    /// Like `by_student`, but 404 when the student does not exist
    pub async fn history(
        pool: &PgPool,
        student_id: Uuid,
    ) -> Result<Vec<PhysicalEvaluationResponse>, ApiError> {
        let student = StudentRepository::find_by_id(pool, student_id)
            .await
            .map_err(ApiError::Internal)?;
        if student.is_none() {
            return Err(ApiError::NotFound(format!("Student {} not found", student_id)));
        }
        Self::by_student(pool, student_id).await
    }

    pub async fn by_instructor(
        pool: &PgPool,
        instructor_id: Uuid,
    ) -> Result<Vec<PhysicalEvaluationResponse>, ApiError> {
        let records = EvaluationRepository::list_for_instructor(pool, instructor_id)
            .await
            .map_err(ApiError::Internal)?;
        to_responses(records)
    }

    pub async fn by_type(
        pool: &PgPool,
        evaluation_type: EvaluationType,
    ) -> Result<Vec<PhysicalEvaluationResponse>, ApiError> {
        Self::list(pool, None, Some(evaluation_type)).await
    }

    pub async fn by_date_range(
        pool: &PgPool,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PhysicalEvaluationResponse>, ApiError> {
        let range = DateRange::new(start, end)?;
        let records = EvaluationRepository::list_between(pool, range.start, range.end)
            .await
            .map_err(ApiError::Internal)?;
        to_responses(records)
    }

    pub async fn count_by_type(pool: &PgPool, evaluation_type: EvaluationType) -> Result<i64, ApiError> {
        EvaluationRepository::count_by_type(pool, evaluation_type)
            .await
            .map_err(ApiError::Internal)
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), ApiError> {
        let deleted = EvaluationRepository::delete(pool, id)
            .await
            .map_err(ApiError::from_repository)?;
        if !deleted {
            return Err(not_found(id));
        }
        info!(evaluation_id = %id, "Physical evaluation deleted");
        Ok(())
    }

    async fn find(pool: &PgPool, id: Uuid) -> Result<EvaluationRecord, ApiError> {
        EvaluationRepository::find_by_id(pool, id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| not_found(id))
    }
}

fn not_found(id: Uuid) -> ApiError {
    ApiError::NotFound(format!("Physical evaluation {} not found", id))
}

async fn ensure_participants(pool: &PgPool, input: &EvaluationInput) -> Result<(), ApiError> {
    let student = StudentRepository::find_by_id(pool, input.student_id)
        .await
        .map_err(ApiError::Internal)?;
    if student.is_none() {
        return Err(ApiError::NotFound(format!(
            "Student {} not found",
            input.student_id
        )));
    }

    let instructor = InstructorRepository::find_by_id(pool, input.instructor_id)
        .await
        .map_err(ApiError::Internal)?;
    if instructor.is_none() {
        return Err(ApiError::NotFound(format!(
            "Instructor {} not found",
            input.instructor_id
        )));
    }
    Ok(())
}

/// Plausible human ranges; they also keep every value inside its column precision
const WEIGHT_KG: (Decimal, Decimal) = (Decimal::ONE, Decimal::from_parts(500, 0, 0, false, 0));
const HEIGHT_M: (Decimal, Decimal) = (
    Decimal::from_parts(30, 0, 0, false, 2),
    Decimal::from_parts(250, 0, 0, false, 2),
);
const MASS_KG: (Decimal, Decimal) = (Decimal::ZERO, Decimal::from_parts(500, 0, 0, false, 0));
const CIRCUMFERENCE_CM: (Decimal, Decimal) =
    (Decimal::ZERO, Decimal::from_parts(300, 0, 0, false, 0));
const RANGE_OF_MOTION: (Decimal, Decimal) = (
    Decimal::from_parts(360, 0, 0, true, 0),
    Decimal::from_parts(360, 0, 0, false, 0),
);

fn within(field: &str, value: Decimal, (min, max): (Decimal, Decimal)) -> Result<Decimal, ApiError> {
    if value < min || value > max {
        return Err(ApiError::invalid_field(
            field,
            format!("Must be between {} and {}", min, max),
        ));
    }
    Ok(value)
}

fn within_opt(
    field: &str,
    value: Option<Decimal>,
    bounds: (Decimal, Decimal),
) -> Result<Option<Decimal>, ApiError> {
    value.map(|v| within(field, v, bounds)).transpose()
}

fn percentage(field: &str, value: Option<Decimal>) -> Result<Option<Decimal>, ApiError> {
    match value {
        Some(v) if v < Decimal::ZERO || v > Decimal::ONE_HUNDRED => Err(ApiError::invalid_field(
            field,
            "Must be between 0 and 100",
        )),
        other => Ok(other),
    }
}

fn prepare(request: PhysicalEvaluationRequest) -> Result<EvaluationInput, ApiError> {
    request.validate()?;
    let weight_kg = within("weight_kg", request.weight_kg, WEIGHT_KG)?;
    let height_m = within("height_m", request.height_m, HEIGHT_M)?;
    let bmi = calculate_bmi(weight_kg, height_m)
        .ok_or_else(|| ApiError::invalid_field("height_m", "Height does not yield a valid BMI"))?;

    let PhysicalEvaluationRequest {
        measurements: m,
        flexibility: f,
        strength: s,
        balance: b,
        posture: p,
        ..
    } = request;

    Ok(EvaluationInput {
        student_id: request.student_id,
        instructor_id: request.instructor_id,
        date: request.date,
        evaluation_type: request.evaluation_type.unwrap_or_default(),
        weight_kg,
        height_m,
        bmi,
        blood_pressure: trimmed(request.blood_pressure),
        heart_rate: request.heart_rate,
        body_fat: percentage("body_fat", request.body_fat)?,
        muscle_mass: within_opt("muscle_mass", request.muscle_mass, MASS_KG)?,
        chest_cm: within_opt("measurements.chest", m.chest, CIRCUMFERENCE_CM)?,
        waist_cm: within_opt("measurements.waist", m.waist, CIRCUMFERENCE_CM)?,
        hip_cm: within_opt("measurements.hip", m.hip, CIRCUMFERENCE_CM)?,
        thigh_cm: within_opt("measurements.thigh", m.thigh, CIRCUMFERENCE_CM)?,
        arm_cm: within_opt("measurements.arm", m.arm, CIRCUMFERENCE_CM)?,
        flexibility_shoulder: within_opt("flexibility.shoulder", f.shoulder, RANGE_OF_MOTION)?,
        flexibility_spinal: within_opt("flexibility.spinal", f.spinal, RANGE_OF_MOTION)?,
        flexibility_hip: within_opt("flexibility.hip", f.hip, RANGE_OF_MOTION)?,
        flexibility_ankle: within_opt("flexibility.ankle", f.ankle, RANGE_OF_MOTION)?,
        strength_core: s.core,
        strength_upper_body: s.upper_body,
        strength_lower_body: s.lower_body,
        strength_grip: s.grip,
        balance_static: b.static_balance,
        balance_dynamic: b.dynamic,
        balance_proprioception: b.proprioception,
        posture_head: trimmed(p.head),
        posture_shoulders: trimmed(p.shoulders),
        posture_spine: trimmed(p.spine),
        posture_pelvis: trimmed(p.pelvis),
        posture_knees: trimmed(p.knees),
        posture_feet: trimmed(p.feet),
        medical_observations: trimmed(request.medical_observations),
        objectives: trimmed(request.objectives),
        treatment_plan: trimmed(request.treatment_plan),
        recommendations: trimmed(request.recommendations),
        next_evaluation_date: request.next_evaluation_date,
        photos: clean_list(request.photos),
        attachments: clean_list(request.attachments),
    })
}

fn to_responses(records: Vec<EvaluationRecord>) -> Result<Vec<PhysicalEvaluationResponse>, ApiError> {
    records.into_iter().map(to_response).collect()
}

pub fn to_response(record: EvaluationRecord) -> Result<PhysicalEvaluationResponse, ApiError> {
    let evaluation_type = record.evaluation_type()?;
    Ok(PhysicalEvaluationResponse {
        id: record.id,
        student_id: record.student_id,
        student_name: record.student_name,
        instructor_id: record.instructor_id,
        instructor_name: record.instructor_name,
        date: record.date,
        evaluation_type,
        weight_kg: record.weight_kg,
        height_m: record.height_m,
        bmi: record.bmi,
        bmi_category: classify_bmi(record.bmi),
        blood_pressure: record.blood_pressure,
        heart_rate: record.heart_rate,
        body_fat: record.body_fat,
        muscle_mass: record.muscle_mass,
        measurements: BodyMeasurements {
            chest: record.chest_cm,
            waist: record.waist_cm,
            hip: record.hip_cm,
            thigh: record.thigh_cm,
            arm: record.arm_cm,
        },
        flexibility: Flexibility {
            shoulder: record.flexibility_shoulder,
            spinal: record.flexibility_spinal,
            hip: record.flexibility_hip,
            ankle: record.flexibility_ankle,
        },
        strength: StrengthScores {
            core: record.strength_core,
            upper_body: record.strength_upper_body,
            lower_body: record.strength_lower_body,
            grip: record.strength_grip,
        },
        balance: BalanceScores {
            static_balance: record.balance_static,
            dynamic: record.balance_dynamic,
            proprioception: record.balance_proprioception,
        },
        posture: PostureNotes {
            head: record.posture_head,
            shoulders: record.posture_shoulders,
            spine: record.posture_spine,
            pelvis: record.posture_pelvis,
            knees: record.posture_knees,
            feet: record.posture_feet,
        },
        medical_observations: record.medical_observations,
        objectives: record.objectives,
        treatment_plan: record.treatment_plan,
        recommendations: record.recommendations,
        next_evaluation_date: record.next_evaluation_date,
        photos: record.photos,
        attachments: record.attachments,
        created_at: record.created_at,
        updated_at: record.updated_at,
    })
}
