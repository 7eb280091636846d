//! Configuration Module
//!
//! Handles loading service configuration from command-line flags and
//! environment variables.

use std::path::PathBuf;

use clap::Parser;
use tracing::Level;

/// Service configuration parameters.
///
/// Every value can be set with a flag or an environment variable and has a
/// sensible default. Cache limits of 0 mean unbounded / never expire.
#[derive(Debug, Clone, Parser)]
#[command(name = "bucket_audit")]
#[command(author, version, about = "Reports object-storage buckets lacking default encryption")]
pub struct Config {
    /// Seconds between audit cycles
    #[arg(long, env = "AUDIT_INTERVAL", default_value_t = 300)]
    pub audit_interval: u64,

    /// Region of the default client
    #[arg(long = "region", env = "AUDIT_REGION", default_value = "us-west-2")]
    pub default_region: String,

    /// Bucket inventory file
    #[arg(long = "inventory", env = "INVENTORY_PATH", default_value = "inventory.json")]
    pub inventory_path: PathBuf,

    /// Maximum cached clients (0 = unbounded)
    #[arg(long, env = "CLIENT_CACHE_MAX_ENTRIES", default_value_t = 128)]
    pub client_cache_max_entries: usize,

    /// Seconds a cached client is reused (0 = forever)
    #[arg(long, env = "CLIENT_CACHE_TTL", default_value_t = 60)]
    pub client_cache_ttl: u64,

    /// Maximum cached bucket regions (0 = unbounded)
    #[arg(long, env = "REGION_CACHE_MAX_ENTRIES", default_value_t = 128)]
    pub region_cache_max_entries: usize,

    /// Seconds a cached bucket region is reused (0 = forever)
    #[arg(long, env = "REGION_CACHE_TTL", default_value_t = 3600)]
    pub region_cache_ttl: u64,

    /// HTTP server port
    #[arg(long = "port", env = "SERVER_PORT", default_value_t = 3000)]
    pub server_port: u16,

    /// Log level for the service
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: Level,

    /// Log level for call timing output
    #[arg(long, env = "PERF_LOG_LEVEL", default_value = "info")]
    pub perf_log_level: Level,

    /// Write logs to this file instead of stdout
    #[arg(long, env = "LOG_TO_FILE")]
    pub log_to_file: Option<PathBuf>,
}

impl Config {
    /// Filter directives used when `RUST_LOG` is not set.
    pub fn log_directives(&self) -> String {
        format!(
            "bucket_audit={},{}={},tower_http=info",
            self.log_level.as_str().to_ascii_lowercase(),
            crate::perf::PERF_TARGET,
            self.perf_log_level.as_str().to_ascii_lowercase()
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            audit_interval: 300,
            default_region: "us-west-2".to_string(),
            inventory_path: PathBuf::from("inventory.json"),
            client_cache_max_entries: 128,
            client_cache_ttl: 60,
            region_cache_max_entries: 128,
            region_cache_ttl: 3600,
            server_port: 3000,
            log_level: Level::INFO,
            perf_log_level: Level::INFO,
            log_to_file: None,
        }
    }
}
