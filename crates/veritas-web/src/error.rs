//! HTTP error mapping.
//!
//! Every failure leaves the server as `{"error": <message>}`. Validation
//! messages are passed through; classifier and internal failures get a
//! fixed message and the detail goes to the log.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use veritas_core::{AnalysisError, ClassifyError, ValidationError};

pub const CLASSIFICATION_FAILED: &str = "Classification failed.";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Rejected request (400)
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Classifier backend failed (500)
    #[error("Classification failed: {0}")]
    Classification(#[from] ClassifyError),

    /// Anything else on our side (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<AnalysisError> for ApiError {
    fn from(e: AnalysisError) -> Self {
        match e {
            AnalysisError::Validation(v) => ApiError::Validation(v),
            AnalysisError::Classification(c) => ApiError::Classification(c),
        }
    }
}

impl From<minijinja::Error> for ApiError {
    fn from(e: minijinja::Error) -> Self {
        ApiError::Internal(format!("template: {}", e))
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Classification(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show the caller.
    pub fn public_message(&self) -> String {
        match self {
            ApiError::Validation(v) => v.to_string(),
            ApiError::Classification(_) => CLASSIFICATION_FAILED.to_string(),
            ApiError::Internal(_) => "Internal server error.".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "Request rejected");
        }
        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}
