use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::draft::InvalidField;

/// Failures raised by the draft model and its managers.
///
/// `InvariantViolation` and `OutOfRange` are contract violations: the mutation is refused
/// and the draft is left untouched. A missing persisted draft is not an error at all
/// (`load_draft` returns `Ok(None)`).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DraftError {
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("{what} {value} is out of range (valid: {min}..={max})")]
    OutOfRange {
        what: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("Collaborator failure: {0}")]
    CollaboratorFailure(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Draft(#[from] DraftError),
}

impl From<InvalidField> for AppError {
    fn from(e: InvalidField) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Draft(e @ DraftError::InvariantViolation(_)) => {
                (StatusCode::CONFLICT, "INVARIANT_VIOLATION", e.to_string())
            }
            AppError::Draft(e @ DraftError::OutOfRange { .. }) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "OUT_OF_RANGE",
                e.to_string(),
            ),
            AppError::Draft(DraftError::CollaboratorFailure(msg)) => {
                tracing::warn!("Collaborator failure reached the HTTP boundary: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "COLLABORATOR_FAILURE",
                    msg.clone(),
                )
            }
            AppError::Draft(DraftError::Storage(msg)) => {
                tracing::error!("Storage error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "The draft could not be read or written".to_string(),
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invariant_violation_maps_to_conflict() {
        let resp =
            AppError::from(DraftError::InvariantViolation("last entry".into())).into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_out_of_range_maps_to_unprocessable() {
        let resp = AppError::from(DraftError::OutOfRange {
            what: "step",
            value: 9,
            min: 1,
            max: 5,
        })
        .into_response();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_out_of_range_message_names_bounds() {
        let err = DraftError::OutOfRange {
            what: "skill position",
            value: 3,
            min: 0,
            max: 1,
        };
        assert_eq!(err.to_string(), "skill position 3 is out of range (valid: 0..=1)");
    }
}
