//! API Module
//!
//! HTTP handlers and routing for the audit service.
//!
//! # Endpoints
//! - `GET /report` - Latest audit report
//! - `GET /stats` - Memoization cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
