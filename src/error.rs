//! Error types for the audit service
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Invalid Key Error ==
/// An argument could not be turned into a cache key.
///
/// Raised for values with no stable equality, such as a NaN float or a
/// JSON array/object. Never retried by the cache.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid cache key argument: {0}")]
pub struct InvalidKeyError(pub String);

impl InvalidKeyError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

// == Service Error ==
/// Failure reported by the object-storage service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct ServiceError {
    /// Provider error code, e.g. `NoSuchBucket`
    pub code: String,
    /// Human readable detail
    pub message: String,
}

impl ServiceError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Returns true if this error carries the given provider code.
    pub fn is(&self, code: &str) -> bool {
        self.code == code
    }
}

// == Audit Error ==
/// Errors surfaced by an audit cycle.
#[derive(Error, Debug)]
pub enum AuditError {
    /// A memoized call was made with an argument that cannot be keyed
    #[error(transparent)]
    InvalidKey(#[from] InvalidKeyError),

    /// The storage service rejected a request
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    /// The blocking audit task panicked or was cancelled
    #[error("Audit task failed: {0}")]
    Join(String),
}

// == Api Error ==
/// Errors returned by the HTTP surface.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Requested resource does not exist yet
    #[error("Not found: {0}")]
    NotFound(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
        };

        let body = Json(ErrorResponse::new(message));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for HTTP handlers.
pub type Result<T> = std::result::Result<T, ApiError>;
