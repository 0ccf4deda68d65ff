use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tasklane_core::{StoreError, TaskId};
use tracing::error;

#[derive(Debug)]
pub enum AppError {
    /// Tarea no encontrada
    NotFound { id: TaskId },

    /// Parametros invalidos
    BadRequest(String),

    /// Cliente excedio su limite de requests
    RateLimited,

    /// Error interno
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { id } => AppError::NotFound { id },
            StoreError::Invalid { .. } => AppError::BadRequest(err.to_string()),
            StoreError::Backend { .. } => {
                error!(error = %err, "Store failure");
                AppError::Internal("storage backend failure".to_string())
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            AppError::NotFound { id } => (
                StatusCode::NOT_FOUND,
                "Not Found",
                format!("Task {} not found", id),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "Bad Request", msg),
            AppError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "Rate limit exceeded",
                "Too many requests, retry later".to_string(),
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error",
                msg,
            ),
        };

        let body = Json(ErrorResponse {
            error: error.to_string(),
            message,
        });

        (status, body).into_response()
    }
}
