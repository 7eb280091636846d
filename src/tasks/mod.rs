//! Background Tasks Module
//!
//! Contains background tasks that run periodically during service operation.
//!
//! # Tasks
//! - Audit: Checks bucket encryption at configured intervals

mod audit;

pub use audit::{run_audit_cycle, spawn_audit_task, LatestReport};
