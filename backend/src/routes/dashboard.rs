//! Dashboard API routes

use crate::error::ApiError;
use crate::services::ReportService;
use crate::state::AppState;
use axum::{extract::State, routing::get, Json, Router};
use pilates_studio_shared::DashboardStats;

pub fn dashboard_routes() -> Router<AppState> {
    Router::new().route("/stats", get(dashboard_stats))
}

/// GET /api/v1/dashboard/stats - Headline numbers for the front desk
async fn dashboard_stats(State(state): State<AppState>) -> Result<Json<DashboardStats>, ApiError> {
    Ok(Json(ReportService::dashboard(state.db(), state.studio()).await?))
}
