use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::error::{ErrorCategory, PeakError};

/// Failures surfaced by the HTTP boundary.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Peak(#[from] PeakError),

    #[error("missing required query parameter '{0}'")]
    MissingParameter(&'static str),

    #[error("{0}")]
    InvalidParameter(String),

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Peak(e) => match e.category() {
                ErrorCategory::InvalidMarketName => StatusCode::BAD_REQUEST,
                ErrorCategory::MarketNotFound => StatusCode::NOT_FOUND,
                ErrorCategory::MalformedTimestamp => StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCategory::DataUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::MissingParameter(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InvalidParameter(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::Peak(e) => e.category().as_str(),
            ApiError::MissingParameter(_) => "MissingParameter",
            ApiError::InvalidParameter(_) => "InvalidParameter",
            ApiError::Internal(_) => "InternalError",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let ApiError::Internal(e) = &self {
            // Full chain goes to the log only.
            tracing::error!(error = ?e, "unhandled error while serving request");
        }

        let body = Json(json!({
            "error": self.code(),
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}
