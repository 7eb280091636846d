//! Auditor
//!
//! Walks every bucket and records whether default encryption is enabled.
//! Client handles and bucket regions change rarely, so both lookups are
//! memoized with their own size and age limits.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info};

use crate::audit::report::{AuditReport, BucketFinding};
use crate::cache::{CacheArgs, CacheKey, CacheStats, CallArgs, MemoCache, Memoized};
use crate::config::Config;
use crate::error::{AuditError, InvalidKeyError};
use crate::perf::timed;
use crate::storage::{BucketService, ClientFactory, ENCRYPTION_NOT_FOUND, LEGACY_DEFAULT_REGION};

/// Arguments of a client lookup. No region means the default endpoint.
#[derive(Debug, Clone)]
pub struct ClientArgs {
    pub region: Option<String>,
}

impl CacheArgs for ClientArgs {
    fn cache_key(&self) -> Result<CacheKey, InvalidKeyError> {
        match &self.region {
            Some(region) => CallArgs::new().named("region_name", region).build(),
            None => CallArgs::new().build(),
        }
    }
}

/// Arguments of a region lookup: the client used and the bucket name.
pub type RegionArgs = (Arc<dyn BucketService>, String);

type ClientFn =
    Box<dyn Fn(&ClientArgs) -> Result<Arc<dyn BucketService>, AuditError> + Send + Sync>;
type RegionFn = Box<dyn Fn(&RegionArgs) -> Result<String, AuditError> + Send + Sync>;

// == Auditor ==
pub struct Auditor {
    clients: Memoized<ClientFn, Arc<dyn BucketService>>,
    regions: Memoized<RegionFn, String>,
}

impl Auditor {
    // == Constructor ==
    /// Builds an auditor with explicitly constructed caches.
    pub fn with_caches(
        factory: Arc<dyn ClientFactory>,
        client_cache: MemoCache<CacheKey, Arc<dyn BucketService>>,
        region_cache: MemoCache<CacheKey, String>,
    ) -> Self {
        let get_client: ClientFn = Box::new(
            move |args: &ClientArgs| -> Result<Arc<dyn BucketService>, AuditError> {
                Ok(factory.connect(args.region.as_deref())?)
            },
        );

        let get_region: RegionFn = Box::new(|(client, bucket): &RegionArgs| -> Result<String, AuditError> {
            let location = timed("bucket_location", || client.bucket_location(bucket))?;
            Ok(location.unwrap_or_else(|| LEGACY_DEFAULT_REGION.to_string()))
        });

        Self {
            clients: Memoized::new("get_client", client_cache, get_client),
            regions: Memoized::new("get_bucket_region", region_cache, get_region),
        }
    }

    /// Builds an auditor with cache limits taken from configuration.
    pub fn from_config(factory: Arc<dyn ClientFactory>, config: &Config) -> Self {
        Self::with_caches(
            factory,
            MemoCache::from_limits(config.client_cache_max_entries, config.client_cache_ttl),
            MemoCache::from_limits(config.region_cache_max_entries, config.region_cache_ttl),
        )
    }

    // == Lookups ==
    /// Returns a client for `region`, or the default client.
    pub fn get_client(&self, region: Option<&str>) -> Result<Arc<dyn BucketService>, AuditError> {
        let args = ClientArgs {
            region: region.map(str::to_string),
        };
        timed(self.clients.name(), || self.clients.call(args))
    }

    pub fn get_bucket_names(&self, client: &dyn BucketService) -> Result<Vec<String>, AuditError> {
        Ok(timed("get_bucket_names", || client.list_buckets())?)
    }

    /// Region a bucket lives in. A bucket with no location constraint lives in
    /// the legacy default region.
    pub fn get_bucket_region(
        &self,
        client: &Arc<dyn BucketService>,
        bucket: &str,
    ) -> Result<String, AuditError> {
        let args: RegionArgs = (client.clone(), bucket.to_string());
        timed(self.regions.name(), || self.regions.call(args))
    }

    /// SSE algorithm of a bucket, or `None` when it has no default encryption.
    ///
    /// Any other service error is returned for the caller to report.
    pub fn get_bucket_encryption(
        &self,
        client: &dyn BucketService,
        bucket: &str,
    ) -> Result<Option<String>, AuditError> {
        match timed("get_bucket_encryption", || client.bucket_encryption(bucket)) {
            Ok(algorithm) => Ok(Some(algorithm)),
            Err(e) if e.is(ENCRYPTION_NOT_FOUND) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    // == Run Once ==
    /// Audits every bucket once.
    ///
    /// Failing to get the default client or the bucket list aborts the cycle.
    /// A failure on one bucket is logged and recorded, and the remaining
    /// buckets are still audited.
    pub fn run_once(&self) -> Result<AuditReport, AuditError> {
        let started_at = Utc::now();
        let client = self.get_client(None)?;

        let findings: Vec<BucketFinding> = self
            .get_bucket_names(client.as_ref())?
            .into_iter()
            .map(|bucket| self.audit_bucket(&client, bucket))
            .collect();

        let report = AuditReport {
            started_at,
            finished_at: Utc::now(),
            findings,
        };

        info!(
            "Audit complete: {} buckets, {} encrypted, {} unencrypted, {} failed",
            report.findings.len(),
            report.encrypted(),
            report.unencrypted(),
            report.failed()
        );
        Ok(report)
    }

    fn audit_bucket(&self, client: &Arc<dyn BucketService>, bucket: String) -> BucketFinding {
        let region = match self.get_bucket_region(client, &bucket) {
            Ok(region) => region,
            Err(e) => {
                error!("Region lookup for {} failed: {}", bucket, e);
                return BucketFinding::failed(bucket, None, &e);
            }
        };

        match self.lookup_encryption(&region, &bucket) {
            Ok(Some(algorithm)) => {
                debug!("{} encrypted with {}", bucket, algorithm);
                BucketFinding::new(bucket, Some(region), Some(algorithm))
            }
            Ok(None) => {
                info!("{} is not encrypted!", bucket);
                BucketFinding::new(bucket, Some(region), None)
            }
            Err(e) => {
                error!("Audit of {} failed: {}", bucket, e);
                BucketFinding::failed(bucket, Some(region), &e)
            }
        }
    }

    /// Encryption lookups must go to a client in the bucket's home region.
    fn lookup_encryption(&self, region: &str, bucket: &str) -> Result<Option<String>, AuditError> {
        let regional = self.get_client(Some(region))?;
        self.get_bucket_encryption(regional.as_ref(), bucket)
    }

    // == Stats ==
    pub fn client_cache_stats(&self) -> CacheStats {
        self.clients.stats()
    }

    pub fn region_cache_stats(&self) -> CacheStats {
        self.regions.stats()
    }
}
