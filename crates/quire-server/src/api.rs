//! Shared plumbing for the API handlers: the error type and its HTTP
//! mapping, and the helper that runs catalog calls on a pooled connection.

use crate::AppState;
use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use quire_catalog::{CatalogError, ValidationErrors};
use rusqlite::Connection;
use std::sync::Arc;
use thiserror::Error;

/// API error type mapping to HTTP status codes.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid input: {0}")]
    BadRequest(String),
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("payload too large: {0}")]
    PayloadTooLarge(String),
    #[error("internal server error: {0}")]
    InternalServerError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(errors) => {
                let body = Json(serde_json::json!({ "errors": errors }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg),
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

impl From<CatalogError> for ApiError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::NotFound(msg) => ApiError::NotFound(msg),
            CatalogError::Conflict(msg) => ApiError::Conflict(msg),
            CatalogError::Database(err) => {
                tracing::error!(error = %err, "catalog database operation failed");
                ApiError::InternalServerError("database operation failed".to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(rejection.body_text())
        } else {
            ApiError::BadRequest(rejection.body_text())
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Runs `op` on a pooled connection inside `spawn_blocking`.
///
/// `name` labels log lines for pool and join failures, both of which become
/// `500 Internal Server Error`.
pub(crate) async fn with_connection<T, F>(
    state: &Arc<AppState>,
    name: &'static str,
    op: F,
) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&mut Connection) -> Result<T, ApiError> + Send + 'static,
{
    let pool = state.pool.clone();
    tokio::task::spawn_blocking(move || {
        let mut conn = pool.get().map_err(|e| {
            tracing::error!(error = %e, op = name, "failed to get db connection");
            ApiError::InternalServerError("db connection failed".to_string())
        })?;
        op(&mut *conn)
    })
    .await
    .map_err(|e| {
        tracing::error!(error = %e, op = name, "task join error");
        ApiError::InternalServerError("task join error".to_string())
    })?
}
