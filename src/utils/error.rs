//! Error types and handling
//!
//! HTTP-facing errors are converted to a consistent JSON response format.
//! Catalog and rule errors belong to the proposal engine and are mapped onto
//! [`AppError`] at the API boundary.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    /// Resource not found (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Conflict - resource already exists or state conflict (409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Unprocessable entity - validation failed (422)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Tenant store communication error (502)
    #[error("Store error: {0}")]
    Store(String),

    /// Catalog retrieval failed; no proposal was produced (502)
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Service unavailable (503)
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        AppError::Conflict(msg.into())
    }

    pub fn service_unavailable(msg: impl Into<String>) -> Self {
        AppError::ServiceUnavailable(msg.into())
    }
}

/// Error response body
#[derive(Serialize, Debug)]
pub struct ErrorResponse {
    /// Error type identifier
    pub error: String,
    /// Human-readable error message
    pub message: String,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, should_log) = match &self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found", false),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "conflict", false),
            AppError::ValidationError(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "validation_error", false)
            }
            AppError::Store(_) => (StatusCode::BAD_GATEWAY, "store_error", true),
            AppError::Catalog(_) => (StatusCode::BAD_GATEWAY, "catalog_error", true),
            AppError::ServiceUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable", true)
            }
        };

        if should_log {
            error!(error = %self, error_type = error_type, "Request error");
        }

        let body = ErrorResponse::new(error_type, self.to_string());

        (status, Json(body)).into_response()
    }
}

/// Failure to retrieve one of the external catalogs
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Catalog file could not be read
    #[error("failed to read {catalog} catalog from {path}: {source}")]
    Io {
        catalog: &'static str,
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Catalog content is not in the expected shape
    #[error("failed to parse {catalog} catalog: {message}")]
    Parse {
        catalog: &'static str,
        message: String,
    },

    /// Transport failure talking to the store
    #[error("{catalog} catalog request failed: {message}")]
    Transport {
        catalog: &'static str,
        message: String,
    },

    /// Store answered with a non-success status
    #[error("{catalog} catalog request returned {status}: {body}")]
    Status {
        catalog: &'static str,
        status: u16,
        body: String,
    },
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        AppError::Catalog(err.to_string())
    }
}

/// A rule that cannot be evaluated; the rule is skipped, never fatal
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("rule has no conditions")]
    MissingConditions,

    #[error("unknown operator '{0}'")]
    UnknownOperator(String),

    #[error("unrecognised condition node: {0}")]
    InvalidNode(String),

    #[error("condition group has no children")]
    EmptyGroup,

    #[error("rule event has no role")]
    MissingRole,
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
