use crate::domain::NewPlayer;
use crate::interface_adapters::http::{ApiError, map_game_error};
use crate::interface_adapters::protocol::{CreatePlayerRequest, PlayerDto, StatusResponse};
use crate::interface_adapters::state::AppState;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::collections::BTreeMap;
use std::sync::Arc;

// Liveness probe.
pub async fn health() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok",
        message: "Service is running".to_string(),
    })
}

#[tracing::instrument(name = "create_user", skip_all, fields(player_id = %payload.id))]
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreatePlayerRequest>,
) -> Result<(StatusCode, Json<PlayerDto>), ApiError> {
    let player = state
        .game
        .registry()
        .create(NewPlayer::from(payload))
        .await
        .map_err(map_game_error)?;

    Ok((StatusCode::CREATED, Json(player.into())))
}

pub async fn list_users(State(state): State<Arc<AppState>>) -> Json<BTreeMap<String, PlayerDto>> {
    let players = state.game.registry().list().await;
    Json(
        players
            .into_iter()
            .map(|player| (player.id.clone(), PlayerDto::from(player)))
            .collect(),
    )
}

pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<PlayerDto>, ApiError> {
    let player = state
        .game
        .registry()
        .get(&user_id)
        .await
        .map_err(map_game_error)?;
    Ok(Json(player.into()))
}

#[tracing::instrument(name = "delete_user", skip(state))]
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<PlayerDto>, ApiError> {
    let player = state
        .game
        .registry()
        .remove(&user_id)
        .await
        .map_err(map_game_error)?;
    Ok(Json(player.into()))
}
