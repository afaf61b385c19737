//! Error type for the todo API.
//!
//! # Design
//! `NotFound` gets a dedicated variant because the HTTP layer distinguishes
//! "the requested item does not exist" (404) from every other failure (400).
//! There is no third category: storage errors, constraint violations, and
//! anything else the persistence layer reports all land in `OperationFailed`
//! with the underlying detail as the message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errors produced by the store and surfaced by the handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No stored row matches the requested identifier.
    #[error("Item not found")]
    NotFound,

    /// Any other failure, carrying the underlying detail.
    #[error("{0}")]
    OperationFailed(String),
}

impl From<rusqlite::Error> for ApiError {
    fn from(err: rusqlite::Error) -> Self {
        ApiError::OperationFailed(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::OperationFailed(_) => StatusCode::BAD_REQUEST,
        };
        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}
