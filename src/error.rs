use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use axum_valid::{ValidRejection, ValidationRejection};
use std::fmt::Display;
use store::StoreError;
use thiserror::Error;
use tracing::{error, warn};

use crate::schemas::ErrorResponse;

/// Errors returned by the HTTP handlers, rendered as [`ErrorResponse`].
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Missing or invalid session token")]
    Unauthorized,

    #[error("{0}")]
    Validation(String),

    #[error("There are no absences to remove for this module")]
    NothingToRemove,

    #[error("{0}")]
    NotFound(String),

    #[error("Failed to record the absence change")]
    ActionFailed,

    #[error("Database error: {0}")]
    Database(#[from] StoreError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Validation(_) | ApiError::NothingToRemove => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::ActionFailed | ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthorized => "UNAUTHORIZED",
            ApiError::Validation(_) => "VALIDATION_FAILED",
            ApiError::NothingToRemove => "NOTHING_TO_REMOVE",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::ActionFailed => "ACTION_FAILED",
            ApiError::Database(_) => "DATABASE_ERROR",
        }
    }
}

/// Extractor rejections of `Valid<..>` surface as validation failures with the usual body.
impl<E: Display> From<ValidRejection<E>> for ApiError {
    fn from(rejection: ValidRejection<E>) -> Self {
        let message = match rejection {
            ValidationRejection::Valid(errors) => errors.to_string(),
            ValidationRejection::Inner(inner) => inner.to_string(),
        };
        warn!("Rejected request parameters: {}", message);
        ApiError::Validation(message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            // Database details stay in the logs
            ApiError::Database(e) => {
                error!("Database error while handling request: {}", e);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorResponse {
            error: message,
            code: self.code().to_string(),
            success: false,
        };
        (status, Json(body)).into_response()
    }
}
