//! Error types for the application

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::workflow::WorkflowError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Workflow(#[from] WorkflowError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
            }
            AppError::Unauthorized(e) => (StatusCode::UNAUTHORIZED, e.clone()),
            AppError::Forbidden(e) => {
                tracing::info!("Authorization denied: {}", e);
                (StatusCode::FORBIDDEN, e.clone())
            }
            AppError::NotFound(e) => (StatusCode::NOT_FOUND, e.clone()),
            AppError::Workflow(e) => {
                tracing::info!("Transition rejected: {}", e);
                (StatusCode::CONFLICT, e.to_string())
            }
            AppError::BadRequest(e) => (StatusCode::BAD_REQUEST, e.clone()),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.clone())
            }
        };

        (status, message).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
