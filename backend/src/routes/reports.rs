//! Report and CSV export API routes

use super::parse_id;
use crate::error::ApiError;
use crate::services::{ExportService, ReportService};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use pilates_studio_shared::{
    AttendanceReport, DateRangeQuery, FinancialReport, MonthQuery, MonthlyReport,
    StudentProgressReport,
};

/// Create report routes
pub fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/monthly", get(monthly_report))
        .route("/financial", get(financial_report))
        .route("/financial/csv", get(financial_csv))
        .route("/attendance", get(attendance_report))
        .route("/student-progress/:id", get(student_progress))
        .route("/schedules/csv", get(schedules_csv))
}

/// GET /api/v1/reports/monthly?month=YYYY-MM-DD - Defaults to the current month
async fn monthly_report(
    State(state): State<AppState>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<MonthlyReport>, ApiError> {
    Ok(Json(
        ReportService::monthly(state.db(), state.studio(), query.month).await?,
    ))
}

async fn financial_report(
    State(state): State<AppState>,
    Query(range): Query<DateRangeQuery>,
) -> Result<Json<FinancialReport>, ApiError> {
    let report =
        ReportService::financial(state.db(), state.studio(), range.start_date, range.end_date)
            .await?;
    Ok(Json(report))
}

async fn attendance_report(
    State(state): State<AppState>,
    Query(range): Query<DateRangeQuery>,
) -> Result<Json<AttendanceReport>, ApiError> {
    let report =
        ReportService::attendance(state.db(), state.studio(), range.start_date, range.end_date)
            .await?;
    Ok(Json(report))
}

async fn student_progress(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StudentProgressReport>, ApiError> {
    let student_id = parse_id(&id, "student")?;
    Ok(Json(ReportService::student_progress(state.db(), student_id).await?))
}

/// GET /api/v1/reports/financial/csv - Financial report as CSV
async fn financial_csv(
    State(state): State<AppState>,
    Query(range): Query<DateRangeQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let csv =
        ExportService::financial_csv(state.db(), state.studio(), range.start_date, range.end_date)
            .await?;
    let filename = format!("financial-{}-{}.csv", range.start_date, range.end_date);
    Ok((csv_headers(&filename)?, csv))
}

/// GET /api/v1/reports/schedules/csv - Classes in the range as CSV
async fn schedules_csv(
    State(state): State<AppState>,
    Query(range): Query<DateRangeQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let csv =
        ExportService::schedules_csv(state.db(), state.studio(), range.start_date, range.end_date)
            .await?;
    let filename = format!("schedules-{}-{}.csv", range.start_date, range.end_date);
    Ok((csv_headers(&filename)?, csv))
}

fn csv_headers(filename: &str) -> Result<HeaderMap, ApiError> {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/csv"));
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", filename))
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("Invalid header value: {}", e)))?;
    headers.insert(header::CONTENT_DISPOSITION, disposition);
    Ok(headers)
}
