// Shared HTTP response types for consistent API error payloads.

use crate::domain::GameError;
use axum::{Json, http::StatusCode};

#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    // Human-readable error string for consistent JSON error responses.
    pub error: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn error_response(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

// Maps domain errors onto status codes; the message is the error's Display text.
pub fn map_game_error(err: GameError) -> ApiError {
    let status = match &err {
        GameError::InvalidPlayer(_) | GameError::InvalidSubmission(_) => StatusCode::BAD_REQUEST,
        GameError::DuplicateId(_) | GameError::PlayersRemaining(_) => StatusCode::CONFLICT,
        GameError::NotFound(_) | GameError::ShooterNotFound(_) | GameError::TargetNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        GameError::SelfHit(_)
        | GameError::ShooterEliminated(_)
        | GameError::TargetEliminated(_) => StatusCode::UNPROCESSABLE_ENTITY,
    };
    error_response(status, err.to_string())
}
