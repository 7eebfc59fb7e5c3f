//! Student API routes

use super::{parse_enum, parse_id};
use crate::error::ApiError;
use crate::services::StudentService;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use pilates_studio_shared::{
    CountResponse, PlanCount, StudentListQuery, StudentRequest, StudentResponse, StudentStatus,
};

/// Create student routes
pub fn student_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_students).post(create_student))
        .route(
            "/:id",
            get(get_student).put(update_student).delete(delete_student),
        )
        .route("/email/:email", get(get_student_by_email))
        .route("/status/:status", get(list_students_by_status))
        .route("/stats/active-count", get(active_count))
        .route("/stats/by-plan", get(active_by_plan))
}

/// GET /api/v1/students - List students, optionally filtered by search text and status
async fn list_students(
    State(state): State<AppState>,
    Query(query): Query<StudentListQuery>,
) -> Result<Json<Vec<StudentResponse>>, ApiError> {
    let students =
        StudentService::list(state.db(), state.studio(), query.search, query.status).await?;
    Ok(Json(students))
}

/// POST /api/v1/students - Register a student
async fn create_student(
    State(state): State<AppState>,
    Json(req): Json<StudentRequest>,
) -> Result<(StatusCode, Json<StudentResponse>), ApiError> {
    let student = StudentService::create(state.db(), state.studio(), req).await?;
    Ok((StatusCode::CREATED, Json(student)))
}

async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StudentResponse>, ApiError> {
    let id = parse_id(&id, "student")?;
    Ok(Json(StudentService::get(state.db(), state.studio(), id).await?))
}

/// PUT /api/v1/students/:id - Replace a student's data
async fn update_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<StudentRequest>,
) -> Result<Json<StudentResponse>, ApiError> {
    let id = parse_id(&id, "student")?;
    let student = StudentService::update(state.db(), state.studio(), id, req).await?;
    Ok(Json(student))
}

async fn delete_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id, "student")?;
    StudentService::delete(state.db(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_student_by_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<StudentResponse>, ApiError> {
    let student = StudentService::get_by_email(state.db(), state.studio(), &email).await?;
    Ok(Json(student))
}

async fn list_students_by_status(
    State(state): State<AppState>,
    Path(status): Path<String>,
) -> Result<Json<Vec<StudentResponse>>, ApiError> {
    let status: StudentStatus = parse_enum(&status)?;
    let students = StudentService::list(state.db(), state.studio(), None, Some(status)).await?;
    Ok(Json(students))
}

/// GET /api/v1/students/stats/active-count
async fn active_count(State(state): State<AppState>) -> Result<Json<CountResponse>, ApiError> {
    let count = StudentService::active_count(state.db()).await?;
    Ok(Json(CountResponse { count }))
}

/// GET /api/v1/students/stats/by-plan - Active students per plan
async fn active_by_plan(State(state): State<AppState>) -> Result<Json<Vec<PlanCount>>, ApiError> {
    Ok(Json(StudentService::active_by_plan(state.db()).await?))
}
