//! Physical evaluation API routes

use super::{parse_enum, parse_id};
use crate::error::ApiError;
use crate::services::EvaluationService;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use pilates_studio_shared::{
    CountResponse, DateRangeQuery, EvaluationListQuery, EvaluationType,
    PhysicalEvaluationRequest, PhysicalEvaluationResponse,
};

/// Create physical evaluation routes
pub fn evaluation_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_evaluations).post(create_evaluation))
        .route(
            "/:id",
            get(get_evaluation)
                .put(update_evaluation)
                .delete(delete_evaluation),
        )
        .route("/student/:id", get(evaluations_for_student))
        .route("/student/:id/history", get(student_history))
        .route("/instructor/:id", get(evaluations_for_instructor))
        .route("/type/:type", get(evaluations_of_type))
        .route("/date-range", get(evaluations_in_range))
        .route("/stats/count-by-type/:type", get(count_by_type))
}

async fn list_evaluations(
    State(state): State<AppState>,
    Query(query): Query<EvaluationListQuery>,
) -> Result<Json<Vec<PhysicalEvaluationResponse>>, ApiError> {
    let evaluations =
        EvaluationService::list(state.db(), query.search, query.evaluation_type).await?;
    Ok(Json(evaluations))
}

/// POST /api/v1/physical-evaluations - Record an evaluation; BMI is derived
async fn create_evaluation(
    State(state): State<AppState>,
    Json(req): Json<PhysicalEvaluationRequest>,
) -> Result<(StatusCode, Json<PhysicalEvaluationResponse>), ApiError> {
    let evaluation = EvaluationService::create(state.db(), req).await?;
    Ok((StatusCode::CREATED, Json(evaluation)))
}

async fn get_evaluation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PhysicalEvaluationResponse>, ApiError> {
    let id = parse_id(&id, "evaluation")?;
    Ok(Json(EvaluationService::get(state.db(), id).await?))
}

async fn update_evaluation(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<PhysicalEvaluationRequest>,
) -> Result<Json<PhysicalEvaluationResponse>, ApiError> {
    let id = parse_id(&id, "evaluation")?;
    Ok(Json(EvaluationService::update(state.db(), id, req).await?))
}

async fn delete_evaluation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id, "evaluation")?;
    EvaluationService::delete(state.db(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn evaluations_for_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<PhysicalEvaluationResponse>>, ApiError> {
    let student_id = parse_id(&id, "student")?;
    Ok(Json(EvaluationService::by_student(state.db(), student_id).await?))
}

/// GET /api/v1/physical-evaluations/student/:id/history - 404 for unknown students
async fn student_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<PhysicalEvaluationResponse>>, ApiError> {
    let student_id = parse_id(&id, "student")?;
    Ok(Json(EvaluationService::history(state.db(), student_id).await?))
}

async fn evaluations_for_instructor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<PhysicalEvaluationResponse>>, ApiError> {
    let instructor_id = parse_id(&id, "instructor")?;
    Ok(Json(
        EvaluationService::by_instructor(state.db(), instructor_id).await?,
    ))
}

async fn evaluations_of_type(
    State(state): State<AppState>,
    Path(evaluation_type): Path<String>,
) -> Result<Json<Vec<PhysicalEvaluationResponse>>, ApiError> {
    let evaluation_type: EvaluationType = parse_enum(&evaluation_type)?;
    Ok(Json(EvaluationService::by_type(state.db(), evaluation_type).await?))
}

async fn evaluations_in_range(
    State(state): State<AppState>,
    Query(range): Query<DateRangeQuery>,
) -> Result<Json<Vec<PhysicalEvaluationResponse>>, ApiError> {
    let evaluations =
        EvaluationService::by_date_range(state.db(), range.start_date, range.end_date).await?;
    Ok(Json(evaluations))
}

async fn count_by_type(
    State(state): State<AppState>,
    Path(evaluation_type): Path<String>,
) -> Result<Json<CountResponse>, ApiError> {
    let evaluation_type: EvaluationType = parse_enum(&evaluation_type)?;
    let count = EvaluationService::count_by_type(state.db(), evaluation_type).await?;
    Ok(Json(CountResponse { count }))
}
