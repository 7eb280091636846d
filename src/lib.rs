//! Bucket Audit - periodic object-storage encryption audit
//!
//! Polls the storage service on a fixed interval and reports buckets lacking
//! default server-side encryption. Client handles and bucket regions are
//! memoized in size- and age-bounded caches between cycles.

pub mod api;
pub mod audit;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod perf;
pub mod storage;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use tasks::spawn_audit_task;
