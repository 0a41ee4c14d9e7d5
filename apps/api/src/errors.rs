#![allow(dead_code)]

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::session::codec::CodecError;
use crate::session::manager::SessionError;
use crate::session::store::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Validation and not-found failures carry short, actionable messages and are
/// surfaced verbatim; storage and LLM internals are logged, never shown.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Session-manager precondition failures map onto the HTTP edge: unknown ids
/// are 404s, range/boundary violations are 400s.
impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::QuestionNotFound(_) => AppError::NotFound(e.to_string()),
            SessionError::IndexOutOfRange { .. }
            | SessionError::AtLastQuestion
            | SessionError::AtFirstQuestion => AppError::Validation(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Storage(StoreError::Unavailable(detail)) => {
                tracing::error!("storage unavailable: {detail}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "STORAGE_UNAVAILABLE",
                    "Session storage is currently unavailable".to_string(),
                )
            }
            AppError::Storage(StoreError::QuotaExceeded(detail)) => {
                tracing::error!("storage quota exceeded: {detail}");
                (
                    StatusCode::INSUFFICIENT_STORAGE,
                    "STORAGE_QUOTA_EXCEEDED",
                    "Session storage is full".to_string(),
                )
            }
            AppError::Storage(e) => {
                tracing::error!("storage error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "A storage error occurred".to_string(),
                )
            }
            AppError::Codec(e) => {
                tracing::error!("codec error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CODEC_ERROR",
                    "A serialization error occurred".to_string(),
                )
            }
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "LLM_ERROR",
                    "An AI processing error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
