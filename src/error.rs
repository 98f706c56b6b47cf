use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{message}")]
    Validation { field: &'static str, message: String },
    #[error("Too many requests. Please try again later.")]
    RateLimited,
    #[error("Failed to send your message. Please try again later.")]
    Dispatch { detail: Option<String> },
    #[error("Invalid request: {0}")]
    BadRequest(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, detail) = match self {
            Self::Validation { field, message } => {
                tracing::debug!(field = %field, message = %message, "Validation failed");
                (StatusCode::BAD_REQUEST, message, None)
            }
            Self::RateLimited => {
                tracing::debug!("Submission rejected by rate limiter");
                (StatusCode::TOO_MANY_REQUESTS, "Too many requests. Please try again later.".to_string(), None)
            }
            Self::Dispatch { detail } => {
                tracing::error!(detail = ?detail, "Notification dispatch failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to send your message. Please try again later.".to_string(), detail)
            }
            Self::BadRequest(msg) => {
                tracing::debug!(message = %msg, "Bad request");
                (StatusCode::BAD_REQUEST, msg, None)
            }
        };

        let body = detail.map_or_else(
            || Json(json!({ "error": message })),
            |d| Json(json!({ "error": message, "details": d })),
        );

        (status, body).into_response()
    }
}
