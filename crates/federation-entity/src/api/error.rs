//! API error types and responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use federation_core::FederationError;

/// API error type
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Unknown subordinate: {0}")]
    UnknownSubordinate(String),

    #[error("Unknown trust mark: {0}")]
    UnknownTrustMark(String),

    #[error("Trust mark subject mismatch")]
    SubjectMismatch { expected: String, actual: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            ApiError::UnknownSubordinate(entity_id) => (
                StatusCode::NOT_FOUND,
                json!({ "error": "Subordinate not found", "entity_id": entity_id }),
            ),
            ApiError::UnknownTrustMark(id) => (
                StatusCode::NOT_FOUND,
                json!({ "error": "Trust mark not found", "trust_mark_id": id }),
            ),
            ApiError::SubjectMismatch { expected, actual } => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "Trust mark subject does not match this entity",
                    "expected": expected,
                    "got": actual,
                }),
            ),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": msg })),
        };

        (status, Json(body)).into_response()
    }
}

impl From<FederationError> for ApiError {
    fn from(err: FederationError) -> Self {
        match err {
            FederationError::UnknownSubordinate(entity_id) => {
                ApiError::UnknownSubordinate(entity_id)
            }
            FederationError::SubjectMismatch { expected, actual } => {
                ApiError::SubjectMismatch { expected, actual }
            }
            FederationError::InvalidJwt(msg) => {
                ApiError::BadRequest(format!("Invalid JWT: {}", msg))
            }
            err => ApiError::Internal(err.to_string()),
        }
    }
}
