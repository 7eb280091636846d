//! Response DTOs for the audit service API
//!
//! Defines the structure of outgoing HTTP response bodies.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::audit::{AuditReport, BucketFinding};
use crate::cache::CacheStats;

/// Statistics for one memoization cache
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsResponse {
    /// Number of calls answered from the cache
    pub hits: u64,
    /// Number of calls that ran the wrapped lookup
    pub misses: u64,
    /// Number of capacity evictions
    pub evictions: u64,
    /// Number of TTL expirations
    pub expirations: u64,
    /// Current number of entries in cache
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for CacheStatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            expirations: stats.expirations,
            total_entries: stats.total_entries,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Client handle cache
    pub clients: CacheStatsResponse,
    /// Bucket region cache
    pub regions: CacheStatsResponse,
}

impl StatsResponse {
    pub fn new(clients: CacheStats, regions: CacheStats) -> Self {
        Self {
            clients: clients.into(),
            regions: regions.into(),
        }
    }
}

/// Response body for the report endpoint (GET /report)
#[derive(Debug, Clone, Serialize)]
pub struct ReportResponse {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub total_buckets: usize,
    pub encrypted: usize,
    pub unencrypted: usize,
    pub failed: usize,
    pub findings: Vec<BucketFinding>,
}

impl From<&AuditReport> for ReportResponse {
    fn from(report: &AuditReport) -> Self {
        Self {
            started_at: report.started_at,
            finished_at: report.finished_at,
            total_buckets: report.findings.len(),
            encrypted: report.encrypted(),
            unencrypted: report.unencrypted(),
            failed: report.failed(),
            findings: report.findings.clone(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
