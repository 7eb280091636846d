//! Audit Report Module
//!
//! Outcome of one audit cycle.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::AuditError;

// == Encryption Status ==
/// What the audit learned about one bucket's default encryption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EncryptionStatus {
    Encrypted { algorithm: String },
    Unencrypted,
    /// Lookup failed; the bucket needs a manual look
    Failed { error: String },
}

// == Bucket Finding ==
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketFinding {
    pub bucket: String,
    /// Home region, if it was resolved
    pub region: Option<String>,
    pub status: EncryptionStatus,
}

impl BucketFinding {
    pub fn new(bucket: impl Into<String>, region: Option<String>, encryption: Option<String>) -> Self {
        let status = match encryption {
            Some(algorithm) => EncryptionStatus::Encrypted { algorithm },
            None => EncryptionStatus::Unencrypted,
        };
        Self {
            bucket: bucket.into(),
            region,
            status,
        }
    }

    pub fn failed(bucket: impl Into<String>, region: Option<String>, error: &AuditError) -> Self {
        Self {
            bucket: bucket.into(),
            region,
            status: EncryptionStatus::Failed {
                error: error.to_string(),
            },
        }
    }

    pub fn is_unencrypted(&self) -> bool {
        matches!(self.status, EncryptionStatus::Unencrypted)
    }
}

// == Audit Report ==
#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub findings: Vec<BucketFinding>,
}

impl AuditReport {
    pub fn encrypted(&self) -> usize {
        self.count(|s| matches!(s, EncryptionStatus::Encrypted { .. }))
    }

    pub fn unencrypted(&self) -> usize {
        self.count(|s| matches!(s, EncryptionStatus::Unencrypted))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, EncryptionStatus::Failed { .. }))
    }

    /// Names of buckets without default encryption.
    pub fn unencrypted_buckets(&self) -> Vec<&str> {
        self.findings
            .iter()
            .filter(|f| f.is_unencrypted())
            .map(|f| f.bucket.as_str())
            .collect()
    }

    fn count(&self, pred: impl Fn(&EncryptionStatus) -> bool) -> usize {
        self.findings.iter().filter(|f| pred(&f.status)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;

    fn report() -> AuditReport {
        let now = Utc::now();
        AuditReport {
            started_at: now,
            finished_at: now,
            findings: vec![
                BucketFinding::new("a", Some("us-west-2".into()), Some("AES256".into())),
                BucketFinding::new("b", Some("us-east-1".into()), None),
                BucketFinding::failed(
                    "c",
                    None,
                    &AuditError::Service(ServiceError::new("AccessDenied", "denied")),
                ),
            ],
        }
    }

    #[test]
    fn test_report_counts() {
        let report = report();
        assert_eq!(report.encrypted(), 1);
        assert_eq!(report.unencrypted(), 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.unencrypted_buckets(), vec!["b"]);
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_value(&report().findings).unwrap();
        assert_eq!(json[0]["status"]["state"], "encrypted");
        assert_eq!(json[0]["status"]["algorithm"], "AES256");
        assert_eq!(json[1]["status"]["state"], "unencrypted");
        assert_eq!(json[2]["status"]["state"], "failed");
        assert!(json[2]["status"]["error"]
            .as_str()
            .unwrap()
            .contains("AccessDenied"));
    }
}
