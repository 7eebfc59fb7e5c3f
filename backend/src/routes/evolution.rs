//! Evolution record API routes

use super::{parse_date, parse_id};
use crate::error::ApiError;
use crate::services::EvolutionService;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use pilates_studio_shared::{
    AverageRatingResponse, CountResponse, DateRangeQuery, EvolutionListQuery,
    EvolutionRecordRequest, EvolutionRecordResponse, NextSessionResponse,
};

/// Create evolution record routes
pub fn evolution_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_records).post(create_record))
        .route(
            "/:id",
            get(get_record).put(update_record).delete(delete_record),
        )
        .route("/student/:id", get(records_for_student))
        .route("/student/:id/history", get(student_history))
        .route("/student/:id/next-session", get(next_session))
        .route("/student/:id/average-rating", get(average_rating))
        .route("/instructor/:id", get(records_for_instructor))
        .route("/date-range", get(records_in_range))
        .route("/stats/count-by-date/:date", get(count_by_date))
}

async fn list_records(
    State(state): State<AppState>,
    Query(query): Query<EvolutionListQuery>,
) -> Result<Json<Vec<EvolutionRecordResponse>>, ApiError> {
    Ok(Json(EvolutionService::list(state.db(), query.search).await?))
}

/// POST /api/v1/evolution-records - Write a session note
///
/// Without `session` the record gets the student's next sequential number.
async fn create_record(
    State(state): State<AppState>,
    Json(req): Json<EvolutionRecordRequest>,
) -> Result<(StatusCode, Json<EvolutionRecordResponse>), ApiError> {
    let record = EvolutionService::create(state.db(), state.studio(), req).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn get_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<EvolutionRecordResponse>, ApiError> {
    let id = parse_id(&id, "evolution record")?;
    Ok(Json(EvolutionService::get(state.db(), id).await?))
}

async fn update_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<EvolutionRecordRequest>,
) -> Result<Json<EvolutionRecordResponse>, ApiError> {
    let id = parse_id(&id, "evolution record")?;
    let record = EvolutionService::update(state.db(), state.studio(), id, req).await?;
    Ok(Json(record))
}

async fn delete_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id, "evolution record")?;
    EvolutionService::delete(state.db(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn records_for_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<EvolutionRecordResponse>>, ApiError> {
    let student_id = parse_id(&id, "student")?;
    Ok(Json(EvolutionService::by_student(state.db(), student_id).await?))
}

async fn student_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<EvolutionRecordResponse>>, ApiError> {
    let student_id = parse_id(&id, "student")?;
    Ok(Json(EvolutionService::history(state.db(), student_id).await?))
}

/// GET /api/v1/evolution-records/student/:id/next-session
async fn next_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<NextSessionResponse>, ApiError> {
    let student_id = parse_id(&id, "student")?;
    let next_session = EvolutionService::next_session(state.db(), student_id).await?;
    Ok(Json(NextSessionResponse {
        student_id,
        next_session,
    }))
}

/// GET /api/v1/evolution-records/student/:id/average-rating
async fn average_rating(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AverageRatingResponse>, ApiError> {
    let student_id = parse_id(&id, "student")?;
    let average_rating = EvolutionService::average_rating(state.db(), student_id).await?;
    Ok(Json(AverageRatingResponse {
        student_id,
        average_rating,
    }))
}

async fn records_for_instructor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<EvolutionRecordResponse>>, ApiError> {
    let instructor_id = parse_id(&id, "instructor")?;
    Ok(Json(
        EvolutionService::by_instructor(state.db(), instructor_id).await?,
    ))
}

async fn records_in_range(
    State(state): State<AppState>,
    Query(range): Query<DateRangeQuery>,
) -> Result<Json<Vec<EvolutionRecordResponse>>, ApiError> {
    let records =
        EvolutionService::by_date_range(state.db(), range.start_date, range.end_date).await?;
    Ok(Json(records))
}

async fn count_by_date(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<CountResponse>, ApiError> {
    let date = parse_date(&date)?;
    let count = EvolutionService::count_on(state.db(), date).await?;
    Ok(Json(CountResponse { count }))
}
