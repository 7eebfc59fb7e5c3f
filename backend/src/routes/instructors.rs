//! Instructor API routes

use super::{parse_enum, parse_id};
use crate::error::ApiError;
use crate::services::InstructorService;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use pilates_studio_shared::{
    CountResponse, InstructorListQuery, InstructorRequest, InstructorResponse, InstructorStatus,
};

/// Create instructor routes
pub fn instructor_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_instructors).post(create_instructor))
        .route(
            "/:id",
            get(get_instructor)
                .put(update_instructor)
                .delete(delete_instructor),
        )
        .route("/email/:email", get(get_instructor_by_email))
        .route("/cpf/:cpf", get(get_instructor_by_cpf))
        .route("/status/:status", get(list_instructors_by_status))
        .route("/stats/active-count", get(active_count))
}

async fn list_instructors(
    State(state): State<AppState>,
    Query(query): Query<InstructorListQuery>,
) -> Result<Json<Vec<InstructorResponse>>, ApiError> {
    let instructors =
        InstructorService::list(state.db(), state.studio(), query.search, query.status).await?;
    Ok(Json(instructors))
}

/// POST /api/v1/instructors - Hire an instructor
async fn create_instructor(
    State(state): State<AppState>,
    Json(req): Json<InstructorRequest>,
) -> Result<(StatusCode, Json<InstructorResponse>), ApiError> {
    let instructor = InstructorService::create(state.db(), state.studio(), req).await?;
    Ok((StatusCode::CREATED, Json(instructor)))
}

async fn get_instructor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<InstructorResponse>, ApiError> {
    let id = parse_id(&id, "instructor")?;
    Ok(Json(InstructorService::get(state.db(), state.studio(), id).await?))
}

async fn update_instructor(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<InstructorRequest>,
) -> Result<Json<InstructorResponse>, ApiError> {
    let id = parse_id(&id, "instructor")?;
    let instructor = InstructorService::update(state.db(), state.studio(), id, req).await?;
    Ok(Json(instructor))
}

async fn delete_instructor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id, "instructor")?;
    InstructorService::delete(state.db(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_instructor_by_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<InstructorResponse>, ApiError> {
    let instructor = InstructorService::get_by_email(state.db(), state.studio(), &email).await?;
    Ok(Json(instructor))
}

/// GET /api/v1/instructors/cpf/:cpf - Accepts the CPF with or without punctuation
async fn get_instructor_by_cpf(
    State(state): State<AppState>,
    Path(cpf): Path<String>,
) -> Result<Json<InstructorResponse>, ApiError> {
    let instructor = InstructorService::get_by_cpf(state.db(), state.studio(), &cpf).await?;
    Ok(Json(instructor))
}

async fn list_instructors_by_status(
    State(state): State<AppState>,
    Path(status): Path<String>,
) -> Result<Json<Vec<InstructorResponse>>, ApiError> {
    let status: InstructorStatus = parse_enum(&status)?;
    let instructors =
        InstructorService::list(state.db(), state.studio(), None, Some(status)).await?;
    Ok(Json(instructors))
}

async fn active_count(State(state): State<AppState>) -> Result<Json<CountResponse>, ApiError> {
    let count = InstructorService::active_count(state.db()).await?;
    Ok(Json(CountResponse { count }))
}
