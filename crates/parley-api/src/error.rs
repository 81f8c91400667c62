use axum::{
    Json,
    extract::rejection::PathRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::service::{Rejection, ServiceError};

/// Errors surfaced to HTTP clients. Storage detail is logged, never returned.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("invalid username or password")]
    Unauthorized,

    #[error("internal server error")]
    Internal,
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Rejected(Rejection::InvalidCredentials) => ApiError::Unauthorized,
            ServiceError::Rejected(r) => ApiError::BadRequest(r.to_string()),
            // Updates of a missing message share the 400 used for rejected updates.
            ServiceError::NotFound => ApiError::BadRequest("message not found".to_string()),
            ServiceError::Storage(e) => {
                error!("Storage failure: {}", e);
                ApiError::Internal
            }
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
