use crate::interface_adapters::http::{ApiError, map_game_error};
use crate::interface_adapters::protocol::StatusResponse;
use crate::interface_adapters::state::AppState;

use axum::{Json, extract::State};
use std::sync::Arc;

// Recent hit images, newest first.
pub async fn list_images(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(state.game.audit().list().await)
}

#[tracing::instrument(name = "admin_reset", skip_all)]
pub async fn reset_game(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusResponse>, ApiError> {
    let report = state.game.admin_reset().await.map_err(map_game_error)?;

    Ok(Json(StatusResponse {
        status: "ok",
        message: format!(
            "Game reset: {} connection(s) closed",
            report.channels_closed
        ),
    }))
}
