//! Audit Module
//!
//! Bucket encryption audit built on memoized client and region lookups.

mod auditor;
mod report;

pub use auditor::{Auditor, ClientArgs, RegionArgs};
pub use report::{AuditReport, BucketFinding, EncryptionStatus};
