//! API request and response types

use crate::health_metrics::{BmiCategory, MeasurementDelta};
use crate::models::{
    EvaluationType, InstructorStatus, PaymentStatus, ScheduleStatus, StudentStatus,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

// ============================================================================
// Query Parameters
// ============================================================================

/// Inclusive date range for queries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateRangeQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Any date within the month being reported; defaults to the current month
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonthQuery {
    pub month: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StudentListQuery {
    pub search: Option<String>,
    pub status: Option<StudentStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstructorListQuery {
    pub search: Option<String>,
    pub status: Option<InstructorStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleListQuery {
    pub search: Option<String>,
    pub status: Option<ScheduleStatus>,
    pub student_id: Option<Uuid>,
    pub instructor_id: Option<Uuid>,
    pub date: Option<NaiveDate>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvaluationListQuery {
    pub search: Option<String>,
    #[serde(rename = "type")]
    pub evaluation_type: Option<EvaluationType>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvolutionListQuery {
    pub search: Option<String>,
}

// ============================================================================
// Small Stat Responses
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueResponse {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanCount {
    pub plan: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NextSessionResponse {
    pub student_id: Uuid,
    pub next_session: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AverageRatingResponse {
    pub student_id: Uuid,
    pub average_rating: f64,
}

// ============================================================================
// Students
// ============================================================================

/// Create or replace a student
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StudentRequest {
    #[validate(length(min = 2, max = 100, message = "Name must have between 2 and 100 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email format"), length(max = 255))]
    pub email: String,
    #[validate(custom(function = "crate::validation::validate_phone_field"))]
    pub phone: String,
    pub birth_date: NaiveDate,
    #[validate(length(max = 255))]
    pub address: Option<String>,
    #[validate(length(min = 2, max = 100, message = "Emergency contact must have between 2 and 100 characters"))]
    pub emergency_contact: String,
    #[validate(custom(function = "crate::validation::validate_phone_field"))]
    pub emergency_phone: String,
    #[validate(length(max = 2000))]
    pub medical_history: Option<String>,
    #[validate(length(max = 2000))]
    pub objectives: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub plan: Option<String>,
    pub status: Option<StudentStatus>,
    pub registration_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub birth_date: NaiveDate,
    pub age: i32,
    pub address: Option<String>,
    pub emergency_contact: String,
    pub emergency_phone: String,
    pub medical_history: Option<String>,
    pub objectives: Option<String>,
    pub plan: String,
    pub status: StudentStatus,
    pub status_description: String,
    pub registration_date: NaiveDate,
    /// Start of the latest completed class, studio local time
    pub last_class: Option<NaiveDateTime>,
    pub days_since_last_class: Option<i64>,
    pub total_classes: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Instructors
// ============================================================================

/// Create or replace an instructor
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct InstructorRequest {
    #[validate(length(min = 2, max = 100, message = "Name must have between 2 and 100 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email format"), length(max = 255))]
    pub email: String,
    #[validate(custom(function = "crate::validation::validate_phone_field"))]
    pub phone: String,
    pub birth_date: NaiveDate,
    #[validate(length(max = 255))]
    pub address: Option<String>,
    #[validate(custom(function = "crate::validation::validate_cpf_field"))]
    pub cpf: String,
    #[validate(length(min = 5, max = 20, message = "RG must have between 5 and 20 characters"))]
    pub rg: String,
    #[validate(length(max = 20))]
    pub cref_number: Option<String>,
    #[serde(default)]
    pub specializations: Vec<String>,
    pub hire_date: Option<NaiveDate>,
    pub salary: Option<Decimal>,
    pub hourly_rate: Option<Decimal>,
    pub status: Option<InstructorStatus>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstructorResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub birth_date: NaiveDate,
    pub age: i32,
    pub address: Option<String>,
    /// 11 digits, no punctuation
    pub cpf: String,
    pub rg: String,
    pub cref_number: Option<String>,
    pub specializations: Vec<String>,
    pub hire_date: NaiveDate,
    pub days_working: i64,
    pub salary: Option<Decimal>,
    pub hourly_rate: Option<Decimal>,
    pub status: InstructorStatus,
    pub status_description: String,
    pub notes: Option<String>,
    pub total_classes: i32,
    pub total_students: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_classes_per_month: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Schedules
// ============================================================================

/// Create or replace a class booking
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ScheduleRequest {
    pub student_id: Uuid,
    pub instructor_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[validate(length(min = 1, max = 100))]
    pub class_type: Option<String>,
    pub status: Option<ScheduleStatus>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub room: Option<String>,
    #[serde(default)]
    pub equipment: Vec<String>,
    pub price: Option<Decimal>,
    pub payment_status: Option<PaymentStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: ScheduleStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleResponse {
    pub id: Uuid,
    pub student_id: Uuid,
    pub student_name: String,
    pub instructor_id: Uuid,
    pub instructor_name: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub duration_minutes: i64,
    pub class_type: String,
    pub status: ScheduleStatus,
    pub status_description: String,
    pub notes: Option<String>,
    pub room: String,
    pub equipment: Vec<String>,
    pub price: Decimal,
    pub payment_status: PaymentStatus,
    pub payment_status_description: String,
    pub is_today: bool,
    pub is_past: bool,
    pub is_future: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Non-cancelled classes sharing one time slot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapacitySlot {
    /// `HH:MM-HH:MM`
    pub slot: String,
    pub count: usize,
    pub schedules: Vec<ScheduleResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapacityResponse {
    pub date: NaiveDate,
    pub total: usize,
    pub slots: Vec<CapacitySlot>,
}

// ============================================================================
// Physical Evaluations
// ============================================================================

/// Circumferences in centimeters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BodyMeasurements {
    pub chest: Option<Decimal>,
    pub waist: Option<Decimal>,
    pub hip: Option<Decimal>,
    pub thigh: Option<Decimal>,
    pub arm: Option<Decimal>,
}

/// Range of motion in degrees
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Flexibility {
    pub shoulder: Option<Decimal>,
    pub spinal: Option<Decimal>,
    pub hip: Option<Decimal>,
    pub ankle: Option<Decimal>,
}

/// Scores from 1 (weak) to 5 (strong)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct StrengthScores {
    #[validate(range(min = 1, max = 5))]
    pub core: Option<i32>,
    #[validate(range(min = 1, max = 5))]
    pub upper_body: Option<i32>,
    #[validate(range(min = 1, max = 5))]
    pub lower_body: Option<i32>,
    #[validate(range(min = 1, max = 5))]
    pub grip: Option<i32>,
}

/// Scores from 1 (poor) to 5 (excellent)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct BalanceScores {
    #[serde(rename = "static")]
    #[validate(range(min = 1, max = 5))]
    pub static_balance: Option<i32>,
    #[validate(range(min = 1, max = 5))]
    pub dynamic: Option<i32>,
    #[validate(range(min = 1, max = 5))]
    pub proprioception: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostureNotes {
    pub head: Option<String>,
    pub shoulders: Option<String>,
    pub spine: Option<String>,
    pub pelvis: Option<String>,
    pub knees: Option<String>,
    pub feet: Option<String>,
}

/// Create or replace a physical evaluation; BMI is always derived
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PhysicalEvaluationRequest {
    pub student_id: Uuid,
    pub instructor_id: Uuid,
    pub date: NaiveDate,
    pub evaluation_type: Option<EvaluationType>,
    pub weight_kg: Decimal,
    pub height_m: Decimal,
    #[validate(length(max = 20))]
    pub blood_pressure: Option<String>,
    #[validate(range(min = 30, max = 220))]
    pub heart_rate: Option<i32>,
    pub body_fat: Option<Decimal>,
    pub muscle_mass: Option<Decimal>,
    #[serde(default)]
    pub measurements: BodyMeasurements,
    #[serde(default)]
    pub flexibility: Flexibility,
    #[serde(default)]
    #[validate(nested)]
    pub strength: StrengthScores,
    #[serde(default)]
    #[validate(nested)]
    pub balance: BalanceScores,
    #[serde(default)]
    pub posture: PostureNotes,
    #[validate(length(max = 2000))]
    pub medical_observations: Option<String>,
    #[validate(length(max = 2000))]
    pub objectives: Option<String>,
    #[validate(length(max = 2000))]
    pub treatment_plan: Option<String>,
    #[validate(length(max = 2000))]
    pub recommendations: Option<String>,
    pub next_evaluation_date: Option<NaiveDate>,
    #[serde(default)]
    #[validate(custom(function = "crate::validation::validate_url_list_field"))]
    pub photos: Vec<String>,
    #[serde(default)]
    #[validate(custom(function = "crate::validation::validate_url_list_field"))]
    pub attachments: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicalEvaluationResponse {
    pub id: Uuid,
    pub student_id: Uuid,
    pub student_name: String,
    pub instructor_id: Uuid,
    pub instructor_name: String,
    pub date: NaiveDate,
    pub evaluation_type: EvaluationType,
    pub weight_kg: Decimal,
    pub height_m: Decimal,
    pub bmi: Decimal,
    pub bmi_category: BmiCategory,
    pub blood_pressure: Option<String>,
    pub heart_rate: Option<i32>,
    pub body_fat: Option<Decimal>,
    pub muscle_mass: Option<Decimal>,
    pub measurements: BodyMeasurements,
    pub flexibility: Flexibility,
    pub strength: StrengthScores,
    pub balance: BalanceScores,
    pub posture: PostureNotes,
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

// ============================================================================
// Evolution Records
// ============================================================================

/// Create or replace a session note; `session` is assigned when omitted
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EvolutionRecordRequest {
    pub student_id: Uuid,
    pub instructor_id: Uuid,
    pub date: NaiveDate,
    #[validate(range(min = 1, message = "Session must be at least 1"))]
    pub session: Option<i32>,
    #[validate(length(min = 1, max = 200, message = "Focus must have between 1 and 200 characters"))]
    pub focus: String,
    #[serde(default)]
    pub exercises_performed: Vec<String>,
    #[validate(length(max = 2000))]
    pub progress_notes: Option<String>,
    #[validate(length(max = 2000))]
    pub difficulties_observed: Option<String>,
    #[validate(length(max = 2000))]
    pub improvements: Option<String>,
    #[validate(length(max = 2000))]
    pub next_session_goals: Option<String>,
    #[validate(range(min = 1, max = 5))]
    pub overall_rating: Option<i32>,
    #[validate(range(min = 0, max = 10))]
    pub pain_level: Option<i32>,
    #[validate(range(min = 1, max = 5))]
    pub mobility_level: Option<i32>,
    #[validate(range(min = 1, max = 5))]
    pub strength_level: Option<i32>,
    #[validate(range(min = 1, max = 5))]
    pub balance_level: Option<i32>,
    #[validate(range(min = 1, max = 5))]
    pub endurance_level: Option<i32>,
    #[validate(length(max = 2000))]
    pub observations: Option<String>,
    #[serde(default)]
    pub equipment: Vec<String>,
    #[validate(range(min = 1, max = 480, message = "Duration must be between 1 and 480 minutes"))]
    pub duration_minutes: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionRecordResponse {
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

// ============================================================================
// Reports
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstructorPerformance {
    pub instructor_id: Uuid,
    pub instructor_name: String,
    pub total_classes: i64,
    pub completed_classes: i64,
    pub revenue: Decimal,
    pub distinct_students: i64,
    pub attendance_rate: Option<f64>,
    pub average_rating: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassTypeStats {
    pub class_type: String,
    pub total_classes: i64,
    pub revenue: Decimal,
    pub average_price: Option<Decimal>,
    pub distinct_students: i64,
    /// Share of all classes in the period, in percent
    pub share_percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyReport {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub total_students: i64,
    pub active_students: i64,
    pub new_students: i64,
    pub total_classes: i64,
    pub completed_classes: i64,
    pub total_revenue: Decimal,
    pub average_class_price: Option<Decimal>,
    pub attendance_rate: Option<f64>,
    pub instructor_performance: Vec<InstructorPerformance>,
    pub class_type_stats: Vec<ClassTypeStats>,
}

/// Paid revenue attributed to one label (class type or instructor)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueEntry {
    pub label: String,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRevenue {
    pub date: NaiveDate,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentSummary {
    pub payment_status: PaymentStatus,
    pub count: i64,
    pub amount: Decimal,
    /// Share of all classes in the period, in percent
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialReport {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_revenue: Decimal,
    pub total_classes: i64,
    pub average_class_price: Option<Decimal>,
    pub revenue_by_class_type: Vec<RevenueEntry>,
    pub revenue_by_instructor: Vec<RevenueEntry>,
    pub revenue_by_day: Vec<DailyRevenue>,
    pub payment_summary: Vec<PaymentSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceBucket {
    pub label: String,
    pub total: i64,
    pub completed: i64,
    pub attendance_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentAttendance {
    pub student_id: Uuid,
    pub student_name: String,
    pub total: i64,
    pub completed: i64,
    pub cancelled: i64,
    pub no_show: i64,
    pub attendance_rate: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceReport {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_classes: i64,
    pub completed: i64,
    pub cancelled: i64,
    pub no_show: i64,
    pub attendance_rate: Option<f64>,
    pub by_weekday: Vec<AttendanceBucket>,
    pub by_class_type: Vec<AttendanceBucket>,
    pub by_student: Vec<StudentAttendance>,
}

/// First vs latest physical evaluation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressMetrics {
    pub first_evaluation_date: NaiveDate,
    pub latest_evaluation_date: NaiveDate,
    pub weight_kg: Option<MeasurementDelta>,
    pub bmi: Option<MeasurementDelta>,
    pub body_fat: Option<MeasurementDelta>,
    pub waist: Option<MeasurementDelta>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentProgressReport {
    pub student_id: Uuid,
    pub student_name: String,
    pub registration_date: NaiveDate,
    pub total_sessions: i64,
    pub average_rating: Option<f64>,
    pub last_focus: Option<String>,
    pub last_session_date: Option<NaiveDate>,
    pub progress_score: Option<f64>,
    pub evaluations_count: i64,
    pub progress_metrics: Option<ProgressMetrics>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardStats {
    pub active_students: i64,
    pub active_instructors: i64,
    pub confirmed_today: i64,
    pub monthly_revenue: Decimal,
    pub monthly_completed_classes: i64,
    pub today_schedules: Vec<ScheduleResponse>,
    pub upcoming_schedules: Vec<ScheduleResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student_request() -> StudentRequest {
        StudentRequest {
            name: "Ana Souza".to_string(),
            email: "ana@studio.com".to_string(),
            phone: "(11) 98765-4321".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1990, 3, 12).unwrap(),
            address: None,
            emergency_contact: "Carlos Souza".to_string(),
            emergency_phone: "11987654320".to_string(),
            medical_history: None,
            objectives: Some("Postura".to_string()),
            plan: None,
            status: None,
            registration_date: None,
        }
    }

    #[test]
    fn test_student_request_validation() {
        assert!(student_request().validate().is_ok());

        let mut bad_email = student_request();
        bad_email.email = "not-an-email".to_string();
        let errors = bad_email.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));

        let mut bad_phone = student_request();
        bad_phone.phone = "123".to_string();
        let errors = bad_phone.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("phone"));
    }

    #[test]
    fn test_evolution_request_ranges() {
        let request: EvolutionRecordRequest = serde_json::from_value(serde_json::json!({
            "student_id": Uuid::nil(),
            "instructor_id": Uuid::nil(),
            "date": "2024-05-02",
            "focus": "Core",
            "overall_rating": 6,
        }))
        .unwrap();
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("overall_rating"));
        assert!(request.exercises_performed.is_empty());
        assert_eq!(request.session, None);
    }

    #[test]
    fn test_schedule_request_accepts_numeric_price() {
        let request: ScheduleRequest = serde_json::from_value(serde_json::json!({
            "student_id": Uuid::nil(),
            "instructor_id": Uuid::nil(),
            "date": "2024-05-02",
            "start_time": "08:00:00",
            "end_time": "09:00:00",
            "price": 95.5,
            "status": "confirmed",
        }))
        .unwrap();
        assert_eq!(request.price, Some(Decimal::new(955, 1)));
        assert_eq!(request.status, Some(ScheduleStatus::Confirmed));
        assert!(request.equipment.is_empty());
    }

    #[test]
    fn test_evaluation_nested_scores_are_validated() {
        let request: PhysicalEvaluationRequest = serde_json::from_value(serde_json::json!({
            "student_id": Uuid::nil(),
            "instructor_id": Uuid::nil(),
            "date": "2024-05-02",
            "weight_kg": "70.0",
            "height_m": "1.75",
            "balance": { "static": 9 },
            "photos": ["https://cdn.studio.com/front.jpg"],
        }))
        .unwrap();
        assert_eq!(request.balance.static_balance, Some(9));
        assert!(request.validate().is_err());
    }
}
