//! API error taxonomy and its HTTP mapping.
//!
//! Every failure leaving this server is a JSON object with a single
//! human-readable `error` string. Storage details are logged, never
//! echoed to the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

use taskmaster_core::ValidationError;
use taskmaster_store::StoreError;

/// Request-level failures, ordered from most to least client-fixable.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Bad input shape. The message names the violated rule.
    #[error("{0}")]
    Validation(String),

    /// The operation targeted a missing or already-finalized resource.
    #[error("{0}")]
    NotFound(String),

    /// Storage or other internal failure. Always the same generic
    /// message on the wire.
    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::Validation(e.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        // The one place storage failures get logged before they collapse
        // into the generic 500.
        tracing::error!(error = %e, "storage failure");
        ApiError::Internal
    }
}
