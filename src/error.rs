/*
 * Responsibility
 * - app-wide AppError definition
 * - IntoResponse impl (HTTP status / `{message}` JSON body)
 * - StoreError conversion so handlers can use `?`
 *
 * Note: auth failures and the forbidden case are the only structured
 * errors this API exposes; store failures surface as an opaque 500 and
 * the detail stays in the server log.
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::repos::error::StoreError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{message}")]
    BadRequest { message: &'static str },
    #[error("{message}")]
    Unauthorized { message: &'static str },
    #[error("forbidden access")]
    Forbidden,
    #[error("{message}")]
    Conflict { message: &'static str },
    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn bad_request(message: &'static str) -> Self {
        Self::BadRequest { message }
    }

    pub fn unauthorized(message: &'static str) -> Self {
        Self::Unauthorized { message }
    }

    pub fn conflict(message: &'static str) -> Self {
        Self::Conflict { message }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message.to_string()),
            AppError::Unauthorized { message } => (StatusCode::UNAUTHORIZED, message.to_string()),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "forbidden access".to_string()),
            AppError::Conflict { message } => (StatusCode::CONFLICT, message.to_string()),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error".to_string(),
            ),
        };

        (status, Json(ErrorResponse { message })).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Duplicate => AppError::conflict("user already exists"),
            StoreError::Backend(detail) => {
                tracing::error!(error = %detail, "store operation failed");
                AppError::Internal
            }
        }
    }
}
