//! Health check endpoints
//!
//! - /health - Basic health check
//! - /health/ready - Readiness probe, pings the database
//! - /health/live - Liveness probe

use crate::{db, state::AppState};
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::time::Instant;

const SERVICE: &str = "pilates-studio";

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub service: &'static str,
    pub status: &'static str,
    pub version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks: Option<HealthChecks>,
}

#[derive(Debug, Serialize)]
pub struct HealthChecks {
    pub database: CheckStatus,
}

/// Status of an individual check
#[derive(Debug, Serialize)]
pub struct CheckStatus {
    pub healthy: bool,
    pub latency_ms: u128,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl HealthResponse {
    fn new(status: &'static str, checks: Option<HealthChecks>) -> Self {
        Self {
            service: SERVICE,
            status,
            version: env!("CARGO_PKG_VERSION"),
            checks,
        }
    }
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::new("healthy", None))
}

/// Readiness probe
///
/// Answers 503 while the database is unreachable.
pub async fn readiness_check(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let started = Instant::now();
    let result = db::health_check(state.db()).await;
    let database = CheckStatus {
        healthy: result.is_ok(),
        latency_ms: started.elapsed().as_millis(),
        message: result.err().map(|e| e.to_string()),
    };

    if database.healthy {
        Ok(Json(HealthResponse::new(
            "ready",
            Some(HealthChecks { database }),
        )))
    } else {
        Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse::new(
                "not_ready",
                Some(HealthChecks { database }),
            )),
        ))
    }
}

pub async fn liveness_check() -> Json<HealthResponse> {
    Json(HealthResponse::new("alive", None))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_check_returns_healthy() {
        let response = health_check().await;
        assert_eq!(response.status, "healthy");
        assert_eq!(response.service, "pilates-studio");
        assert!(!response.version.is_empty());
    }

    #[tokio::test]
    async fn test_liveness_check_returns_alive() {
        let response = liveness_check().await;
        assert_eq!(response.status, "alive");
        assert!(response.checks.is_none());
    }

    #[test]
    fn test_failed_check_serializes_message() {
        let check = CheckStatus {
            healthy: false,
            latency_ms: 3,
            message: Some("connection refused".to_string()),
        };
        let json = serde_json::to_value(&check).unwrap();
        assert_eq!(json["healthy"], false);
        assert_eq!(json["message"], "connection refused");
    }
}
