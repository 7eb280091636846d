//! API Handlers
//!
//! HTTP request handlers for each audit service endpoint.

use std::sync::Arc;
use tokio::sync::RwLock;

use axum::{extract::State, Json};

use crate::audit::Auditor;
use crate::error::{ApiError, Result};
use crate::models::{HealthResponse, ReportResponse, StatsResponse};
use crate::tasks::LatestReport;

/// Application state shared across all handlers.
///
/// Holds the auditor (for cache statistics) and the latest audit report,
/// which the background audit task replaces after every successful cycle.
#[derive(Clone)]
pub struct AppState {
    /// Auditor owning the memoized lookups
    pub auditor: Arc<Auditor>,
    /// Most recent successful report
    pub latest: LatestReport,
}

impl AppState {
    /// Creates a new AppState with no report yet.
    pub fn new(auditor: Auditor) -> Self {
        Self {
            auditor: Arc::new(auditor),
            latest: Arc::new(RwLock::new(None)),
        }
    }
}

/// Handler for GET /report
///
/// Returns the latest audit report, or 404 before the first successful cycle.
pub async fn report_handler(State(state): State<AppState>) -> Result<Json<ReportResponse>> {
    let latest = state.latest.read().await;
    match latest.as_ref() {
        Some(report) => Ok(Json(ReportResponse::from(report))),
        None => Err(ApiError::NotFound(
            "No audit has completed yet".to_string(),
        )),
    }
}

/// Handler for GET /stats
///
/// Returns statistics for the client and region caches.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::new(
        state.auditor.client_cache_stats(),
        state.auditor.region_cache_stats(),
    ))
}

/// Handler for GET /health
///
/// Returns health status of the service.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
