use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use common::types::ApiResponse;
use service::food::errors::CatalogError;
use thiserror::Error;
use tracing::error;

/// Failure envelope `{success: false, message}` with its HTTP status.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error.")
    }
}

impl From<CatalogError> for ApiError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::Unauthorized => Self::new(StatusCode::FORBIDDEN, "You are not admin"),
            CatalogError::Validation(msg) => Self::bad_request(msg),
            CatalogError::NotFound => Self::new(StatusCode::NOT_FOUND, "Food item not found"),
            CatalogError::Upload(_) | CatalogError::Persistence(_) => {
                // detail stays server-side
                error!(code = e.code(), err = %e, "catalog request failed");
                Self::internal()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ApiResponse::failure(self.message))).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("runtime check failed: {0}")]
    Runtime(String),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}
