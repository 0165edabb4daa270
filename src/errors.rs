use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid {key}={value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Failure to turn a request body into a `Report`.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The body is not well-formed JSON.
    #[error("{0}")]
    Malformed(serde_json::Error),

    /// Well-formed JSON whose values don't fit the report's field types.
    #[error("Report validation failed: {0}")]
    Validation(serde_json::Error),
}

impl From<serde_json::Error> for ReportError {
    fn from(e: serde_json::Error) -> Self {
        if e.is_data() {
            ReportError::Validation(e)
        } else {
            ReportError::Malformed(e)
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("datastore unavailable: {0}")]
    Unavailable(#[from] mongodb::error::Error),

    #[error("datastore call timed out after {0:?}")]
    Timeout(Duration),
}

/// Everything a protected handler can fail with.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            ApiError::BadRequest(_) | ApiError::Report(ReportError::Malformed(_)) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            ApiError::Report(ReportError::Validation(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            // driver messages can carry hosts and credentials, keep them in the logs
            ApiError::Store(e) => {
                tracing::error!("datastore failure: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
