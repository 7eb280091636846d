//! Audit Task
//!
//! Background task that periodically audits bucket encryption.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::audit::{AuditReport, Auditor};
use crate::error::AuditError;

/// Most recent successful audit report, shared with the HTTP handlers.
pub type LatestReport = Arc<RwLock<Option<AuditReport>>>;

/// Runs one audit on the blocking pool and stores the report on success.
///
/// The audit itself is synchronous (service calls and cache locks block), so
/// it is kept off the async worker threads.
pub async fn run_audit_cycle(auditor: Arc<Auditor>, latest: LatestReport) -> Result<(), AuditError> {
    let report = tokio::task::spawn_blocking(move || auditor.run_once())
        .await
        .map_err(|e| AuditError::Join(e.to_string()))??;

    let unencrypted = report.unencrypted();
    if unencrypted > 0 {
        warn!(
            "{} bucket(s) lack default encryption: {}",
            unencrypted,
            report.unencrypted_buckets().join(", ")
        );
    }

    *latest.write().await = Some(report);
    Ok(())
}

/// Spawns a background task that audits every `interval_secs` seconds.
///
/// The first audit runs immediately. A failed cycle is logged and the loop
/// carries on with the next tick; the previous report is kept.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let handle = spawn_audit_task(auditor.clone(), latest.clone(), 300);
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_audit_task(
    auditor: Arc<Auditor>,
    latest: LatestReport,
    interval_secs: u64,
) -> JoinHandle<()> {
    let period = Duration::from_secs(interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting audit task with interval of {} seconds",
            period.as_secs()
        );

        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            if let Err(e) = run_audit_cycle(auditor.clone(), latest.clone()).await {
                error!("Audit cycle failed: {}", e);
            }
        }
    })
}
