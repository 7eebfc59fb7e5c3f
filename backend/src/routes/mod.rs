//! Route definitions for the Pilates Studio API
//!
//! This module organizes all API routes and applies middleware.

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::State,
    http::{header, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use chrono::NaiveDate;
use std::str::FromStr;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::warn;
use uuid::Uuid;

mod dashboard;
mod evaluations;
mod evolution;
mod health;
mod instructors;
mod reports;
mod schedules;
mod students;

#[cfg(test)]
mod schedules_tests;

pub use dashboard::dashboard_routes;
pub use evaluations::evaluation_routes;
pub use evolution::evolution_routes;
pub use instructors::instructor_routes;
pub use reports::report_routes;
pub use schedules::schedule_routes;
pub use students::student_routes;

/// Create the main application router with all middleware
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config().server);

    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/health/live", get(health::liveness_check))
        .route("/metrics", get(render_metrics))
        .nest("/api/v1", api_routes())
        // Apply middleware layers
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(cors)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// API v1 routes
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { "Pilates Studio API v1" }))
        .nest("/students", student_routes())
        .nest("/instructors", instructor_routes())
        .nest("/schedules", schedule_routes())
        .nest("/physical-evaluations", evaluation_routes())
        .nest("/evolution-records", evolution_routes())
        .nest("/reports", report_routes())
        .nest("/dashboard", dashboard_routes())
}

/// Any origin unless `server.cors_origins` lists some
fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = server
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(origins))
    }
}

/// GET /metrics - Prometheus text exposition
async fn render_metrics(State(state): State<AppState>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        ),
        None => (
            StatusCode::NOT_FOUND,
            [(header::CONTENT_TYPE, "text/plain")],
            "metrics disabled".to_string(),
        ),
    }
}

/// Parse a UUID path segment
pub(crate) fn parse_id(raw: &str, what: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest(format!("Invalid {} ID", what)))
}

/// Parse a `YYYY-MM-DD` path segment
pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ApiError::BadRequest(format!("Invalid date '{}', expected YYYY-MM-DD", raw)))
}

/// Parse a status or type path segment with the enum's lenient `FromStr`
pub(crate) fn parse_enum<T>(raw: &str) -> Result<T, ApiError>
where
    T: FromStr<Err = String>,
{
    raw.parse::<T>().map_err(ApiError::BadRequest)
}
