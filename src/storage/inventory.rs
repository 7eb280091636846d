//! Inventory Backend
//!
//! File-backed storage service. The inventory is a JSON document describing
//! buckets, their home region and default encryption:
//!
//! ```json
//! {"buckets": [
//!   {"name": "logs", "region": "eu-west-1", "encryption": "aws:kms"},
//!   {"name": "legacy"},
//!   {"name": "locked", "region": "us-west-2", "error": "AccessDenied"}
//! ]}
//! ```
//!
//! A missing `region` means the legacy default region. Clients honour regional
//! routing: encryption lookups must go through the bucket's home region.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ServiceError;
use crate::storage::service::{
    BucketService, ClientFactory, ENCRYPTION_NOT_FOUND, LEGACY_DEFAULT_REGION, NO_SUCH_BUCKET,
    PERMANENT_REDIRECT,
};

// == Inventory ==
/// Parsed inventory document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    #[serde(default)]
    pub buckets: Vec<BucketRecord>,
}

/// One bucket in the inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketRecord {
    pub name: String,
    /// Location constraint, None = legacy default region
    #[serde(default)]
    pub region: Option<String>,
    /// Default SSE algorithm, None = unencrypted
    #[serde(default)]
    pub encryption: Option<String>,
    /// Error code returned by encryption lookups on this bucket
    #[serde(default)]
    pub error: Option<String>,
}

impl BucketRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            region: None,
            encryption: None,
            error: None,
        }
    }

    pub fn in_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn encrypted_with(mut self, algorithm: impl Into<String>) -> Self {
        self.encryption = Some(algorithm.into());
        self
    }

    pub fn failing_with(mut self, code: impl Into<String>) -> Self {
        self.error = Some(code.into());
        self
    }

    fn home_region(&self) -> &str {
        self.region.as_deref().unwrap_or(LEGACY_DEFAULT_REGION)
    }
}

impl Inventory {
    pub fn new(buckets: Vec<BucketRecord>) -> Self {
        Self { buckets }
    }

    // == Load ==
    /// Reads and parses an inventory file.
    pub fn load(path: &Path) -> Result<Self, ServiceError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ServiceError::new(
                "InventoryUnavailable",
                format!("cannot read {}: {}", path.display(), e),
            )
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            ServiceError::new(
                "MalformedInventory",
                format!("cannot parse {}: {}", path.display(), e),
            )
        })
    }

    fn find(&self, bucket: &str) -> Result<&BucketRecord, ServiceError> {
        self.buckets
            .iter()
            .find(|b| b.name == bucket)
            .ok_or_else(|| {
                ServiceError::new(NO_SUCH_BUCKET, format!("bucket '{}' does not exist", bucket))
            })
    }
}

// == Inventory Client ==
/// Client bound to one region, answering from an inventory snapshot.
#[derive(Debug)]
pub struct InventoryClient {
    region: String,
    inventory: Arc<Inventory>,
}

impl BucketService for InventoryClient {
    fn region(&self) -> &str {
        &self.region
    }

    fn list_buckets(&self) -> Result<Vec<String>, ServiceError> {
        Ok(self.inventory.buckets.iter().map(|b| b.name.clone()).collect())
    }

    fn bucket_location(&self, bucket: &str) -> Result<Option<String>, ServiceError> {
        Ok(self.inventory.find(bucket)?.region.clone())
    }

    fn bucket_encryption(&self, bucket: &str) -> Result<String, ServiceError> {
        let record = self.inventory.find(bucket)?;

        if record.home_region() != self.region {
            return Err(ServiceError::new(
                PERMANENT_REDIRECT,
                format!(
                    "bucket '{}' must be addressed through {}, not {}",
                    bucket,
                    record.home_region(),
                    self.region
                ),
            ));
        }

        if let Some(code) = &record.error {
            return Err(ServiceError::new(
                code.clone(),
                format!("encryption lookup failed for '{}'", bucket),
            ));
        }

        record.encryption.clone().ok_or_else(|| {
            ServiceError::new(
                ENCRYPTION_NOT_FOUND,
                "The server side encryption configuration was not found",
            )
        })
    }
}

// == Inventory Factory ==
#[derive(Debug)]
enum InventorySource {
    File(PathBuf),
    Memory(Arc<Inventory>),
}

/// Builds [`InventoryClient`]s. File-backed factories re-read the file on
/// every connect.
#[derive(Debug)]
pub struct InventoryFactory {
    source: InventorySource,
    default_region: String,
    connects: AtomicUsize,
}

impl InventoryFactory {
    pub fn from_path(path: impl Into<PathBuf>, default_region: impl Into<String>) -> Self {
        Self {
            source: InventorySource::File(path.into()),
            default_region: default_region.into(),
            connects: AtomicUsize::new(0),
        }
    }

    pub fn from_inventory(inventory: Inventory, default_region: impl Into<String>) -> Self {
        Self {
            source: InventorySource::Memory(Arc::new(inventory)),
            default_region: default_region.into(),
            connects: AtomicUsize::new(0),
        }
    }

    /// Number of clients constructed so far.
    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

impl ClientFactory for InventoryFactory {
    fn connect(&self, region: Option<&str>) -> Result<Arc<dyn BucketService>, ServiceError> {
        let inventory = match &self.source {
            InventorySource::File(path) => Arc::new(Inventory::load(path)?),
            InventorySource::Memory(inventory) => inventory.clone(),
        };
        let region = region.unwrap_or(&self.default_region).to_string();

        self.connects.fetch_add(1, Ordering::SeqCst);
        info!("Constructed storage client for region {}", region);

        Ok(Arc::new(InventoryClient { region, inventory }))
    }
}
