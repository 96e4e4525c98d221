//! Error types shared by the HTTP layer and the stores.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    /// The record exists but belongs to someone else. Never surfaced
    /// as-is: the response is indistinguishable from `NotFound`.
    #[error("user {user} does not own task {task}")]
    Forbidden { user: Uuid, task: Uuid },

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Error::Validation(message) => (StatusCode::BAD_REQUEST, message),
            Error::Unauthorized(message) => (StatusCode::UNAUTHORIZED, message),
            Error::Forbidden { user, task } => {
                warn!(%user, %task, "denied access to a task owned by another user");
                (StatusCode::NOT_FOUND, "Task not found.".to_string())
            }
            Error::NotFound(message) => (StatusCode::NOT_FOUND, message),
            // registration duplicates respond 400 at the interface
            Error::Conflict(message) => (StatusCode::BAD_REQUEST, message),
            Error::Database(e) => {
                error!("database error: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error".to_string())
            }
            Error::Internal(message) => {
                error!("{message}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error".to_string())
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}
