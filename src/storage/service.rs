//! Storage Service Traits
//!
//! The slice of the object-storage API the audit needs.

use std::fmt::Debug;
use std::sync::Arc;

use crate::cache::{KeyArg, KeyPart};
use crate::error::{InvalidKeyError, ServiceError};

/// Region buckets live in when the service reports no location constraint.
pub const LEGACY_DEFAULT_REGION: &str = "us-east-1";

/// Error code returned when a bucket has no default encryption configured.
pub const ENCRYPTION_NOT_FOUND: &str = "ServerSideEncryptionConfigurationNotFoundError";

/// Error code returned when a bucket is queried through another region's endpoint.
pub const PERMANENT_REDIRECT: &str = "PermanentRedirect";

/// Error code returned for an unknown bucket.
pub const NO_SUCH_BUCKET: &str = "NoSuchBucket";

// == Bucket Service ==
/// A client bound to one region of the storage service.
pub trait BucketService: Send + Sync + Debug {
    /// Region whose endpoint this client talks to.
    fn region(&self) -> &str;

    /// Names of all buckets owned by the caller.
    fn list_buckets(&self) -> Result<Vec<String>, ServiceError>;

    /// Location constraint of a bucket. `None` means the legacy default region.
    fn bucket_location(&self, bucket: &str) -> Result<Option<String>, ServiceError>;

    /// SSE algorithm of the bucket's first default-encryption rule.
    ///
    /// Buckets without encryption fail with [`ENCRYPTION_NOT_FOUND`].
    fn bucket_encryption(&self, bucket: &str) -> Result<String, ServiceError>;
}

// == Client Factory ==
/// Constructs service clients.
pub trait ClientFactory: Send + Sync {
    /// Builds a client for `region`, or for the default region when `None`.
    fn connect(&self, region: Option<&str>) -> Result<Arc<dyn BucketService>, ServiceError>;
}

/// Clients are keyed by the region they are bound to.
impl KeyArg for dyn BucketService {
    fn key_part(&self) -> Result<KeyPart, InvalidKeyError> {
        self.region().key_part()
    }
}
