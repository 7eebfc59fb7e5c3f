//! Application state management
//!
//! Shared state handed to every handler through Axum's state extraction.
//! Everything in it is cheap to clone: the pool and the exporter handle
//! are internally reference-counted and the config sits behind an `Arc`.

use crate::config::{AppConfig, StudioConfig};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::PgPool;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Prometheus exporter, present when the recorder was installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(db: PgPool, config: AppConfig) -> Self {
        Self {
            db,
            config: Arc::new(config),
            metrics: None,
        }
    }

    /// Attach the Prometheus handle rendered by `GET /metrics`
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Get a reference to the database pool
    #[inline]
    pub fn db(&self) -> &PgPool {
        &self.db
    }

    /// Get a reference to the configuration
    #[inline]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Studio defaults and local clock
    #[inline]
    pub fn studio(&self) -> &StudioConfig {
        &self.config.studio
    }
}
