//! Schedule API routes
//!
//! Booking, status changes and the calendar views of the studio.

use super::{parse_date, parse_enum, parse_id};
use crate::error::ApiError;
use crate::services::ScheduleService;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use pilates_studio_shared::{
    CapacityResponse, CountResponse, DateRangeQuery, RevenueResponse, ScheduleListQuery,
    ScheduleRequest, ScheduleResponse, ScheduleStatus, UpdateStatusRequest,
};

/// Create schedule routes
pub fn schedule_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_schedules).post(create_schedule))
        .route(
            "/:id",
            get(get_schedule)
                .put(update_schedule)
                .delete(delete_schedule),
        )
        .route("/:id/status", patch(update_status))
        .route("/date/:date", get(schedules_on_date))
        .route("/date-range", get(schedules_in_range))
        .route("/student/:id", get(schedules_for_student))
        .route("/instructor/:id", get(schedules_for_instructor))
        .route("/status/:status", get(schedules_with_status))
        .route("/today", get(today))
        .route("/upcoming", get(upcoming))
        .route("/capacity/:date", get(capacity))
        .route("/stats/confirmed-today", get(confirmed_today))
        .route("/stats/completed-classes", get(completed_classes))
        .route("/stats/revenue", get(revenue))
}

/// GET /api/v1/schedules - Filtered listing
///
/// `date` wins over `start_date`/`end_date`; all other filters combine.
async fn list_schedules(
    State(state): State<AppState>,
    Query(query): Query<ScheduleListQuery>,
) -> Result<Json<Vec<ScheduleResponse>>, ApiError> {
    Ok(Json(
        ScheduleService::list(state.db(), state.studio(), query).await?,
    ))
}

/// POST /api/v1/schedules - Book a class
///
/// Answers 409 when the instructor already has an overlapping class that day.
async fn create_schedule(
    State(state): State<AppState>,
    Json(req): Json<ScheduleRequest>,
) -> Result<(StatusCode, Json<ScheduleResponse>), ApiError> {
    let schedule = ScheduleService::create(state.db(), state.studio(), req).await?;
    Ok((StatusCode::CREATED, Json(schedule)))
}

async fn get_schedule(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ScheduleResponse>, ApiError> {
    let id = parse_id(&id, "schedule")?;
    Ok(Json(ScheduleService::get(state.db(), state.studio(), id).await?))
}

async fn update_schedule(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ScheduleRequest>,
) -> Result<Json<ScheduleResponse>, ApiError> {
    let id = parse_id(&id, "schedule")?;
    let schedule = ScheduleService::update(state.db(), state.studio(), id, req).await?;
    Ok(Json(schedule))
}

/// PATCH /api/v1/schedules/:id/status - Move a class through its lifecycle
async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<ScheduleResponse>, ApiError> {
    let id = parse_id(&id, "schedule")?;
    let schedule =
        ScheduleService::update_status(state.db(), state.studio(), id, req.status).await?;
    Ok(Json(schedule))
}

async fn delete_schedule(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id, "schedule")?;
    ScheduleService::delete(state.db(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn schedules_on_date(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<Vec<ScheduleResponse>>, ApiError> {
    let date = parse_date(&date)?;
    Ok(Json(
        ScheduleService::by_date(state.db(), state.studio(), date).await?,
    ))
}

async fn schedules_in_range(
    State(state): State<AppState>,
    Query(range): Query<DateRangeQuery>,
) -> Result<Json<Vec<ScheduleResponse>>, ApiError> {
    let schedules = ScheduleService::by_date_range(
        state.db(),
        state.studio(),
        range.start_date,
        range.end_date,
    )
    .await?;
    Ok(Json(schedules))
}

async fn schedules_for_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<ScheduleResponse>>, ApiError> {
    let student_id = parse_id(&id, "student")?;
    Ok(Json(
        ScheduleService::by_student(state.db(), state.studio(), student_id).await?,
    ))
}

async fn schedules_for_instructor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<ScheduleResponse>>, ApiError> {
    let instructor_id = parse_id(&id, "instructor")?;
    Ok(Json(
        ScheduleService::by_instructor(state.db(), state.studio(), instructor_id).await?,
    ))
}

async fn schedules_with_status(
    State(state): State<AppState>,
    Path(status): Path<String>,
) -> Result<Json<Vec<ScheduleResponse>>, ApiError> {
    let status: ScheduleStatus = parse_enum(&status)?;
    Ok(Json(
        ScheduleService::by_status(state.db(), state.studio(), status).await?,
    ))
}

/// GET /api/v1/schedules/today - Every class on the studio's current date
async fn today(State(state): State<AppState>) -> Result<Json<Vec<ScheduleResponse>>, ApiError> {
    Ok(Json(ScheduleService::today(state.db(), state.studio()).await?))
}

/// GET /api/v1/schedules/upcoming - Tomorrow's booked or confirmed classes
async fn upcoming(State(state): State<AppState>) -> Result<Json<Vec<ScheduleResponse>>, ApiError> {
    Ok(Json(ScheduleService::upcoming(state.db(), state.studio()).await?))
}

/// GET /api/v1/schedules/capacity/:date - Occupied slots of a day
async fn capacity(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<CapacityResponse>, ApiError> {
    let date = parse_date(&date)?;
    Ok(Json(
        ScheduleService::capacity(state.db(), state.studio(), date).await?,
    ))
}

async fn confirmed_today(State(state): State<AppState>) -> Result<Json<CountResponse>, ApiError> {
    let count = ScheduleService::confirmed_today(state.db(), state.studio()).await?;
    Ok(Json(CountResponse { count }))
}

async fn completed_classes(
    State(state): State<AppState>,
    Query(range): Query<DateRangeQuery>,
) -> Result<Json<CountResponse>, ApiError> {
    let count =
        ScheduleService::completed_between(state.db(), range.start_date, range.end_date).await?;
    Ok(Json(CountResponse { count }))
}

/// GET /api/v1/schedules/stats/revenue - Paid revenue in the range
async fn revenue(
    State(state): State<AppState>,
    Query(range): Query<DateRangeQuery>,
) -> Result<Json<RevenueResponse>, ApiError> {
    let revenue =
        ScheduleService::revenue_between(state.db(), range.start_date, range.end_date).await?;
    Ok(Json(RevenueResponse {
        start_date: range.start_date,
        end_date: range.end_date,
        revenue,
    }))
}
