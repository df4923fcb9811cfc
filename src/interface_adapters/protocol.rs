// Wire protocol DTOs and conversions for the public HTTP and WebSocket surface.

use crate::domain::{NewPlayer, Player};
use crate::use_cases::{HitSummary, ServerEvent, ShotAck, ShotSubmission};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Player ids arrive as strings from most clients and as numbers from the web client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PlayerIdDto {
    Text(String),
    Number(i64),
}

impl fmt::Display for PlayerIdDto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerIdDto::Text(id) => f.write_str(id),
            PlayerIdDto::Number(id) => write!(f, "{id}"),
        }
    }
}

/// Public player state as rendered to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerDto {
    pub id: String,
    pub name: String,
    pub kills: u32,
    pub deaths: u32,
    pub health: i32,
    pub score: u32,
    #[serde(rename = "isLive")]
    pub is_live: bool,
}

impl From<Player> for PlayerDto {
    fn from(player: Player) -> Self {
        Self {
            id: player.id,
            name: player.name,
            kills: player.kills,
            deaths: player.deaths,
            health: player.health,
            score: player.score,
            is_live: player.is_live,
        }
    }
}

/// Registration payload; counters are server-owned and ignored if sent.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePlayerRequest {
    pub id: PlayerIdDto,
    pub name: String,
    #[serde(default)]
    pub health: Option<i32>,
}

impl From<CreatePlayerRequest> for NewPlayer {
    fn from(request: CreatePlayerRequest) -> Self {
        Self {
            id: request.id.to_string(),
            name: request.name,
            health: request.health,
        }
    }
}

/// Shot submission sent by a client over its channel.
#[derive(Debug, Clone, Deserialize)]
pub struct ShotRequest {
    #[serde(default, alias = "playerId", alias = "shooter_id")]
    pub player_id: Option<PlayerIdDto>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub timestamp: Option<f64>,
    // Correlation id echoed back in the ack.
    #[serde(default, rename = "requestId", alias = "request_id")]
    pub request_id: Option<String>,
}

impl From<ShotRequest> for ShotSubmission {
    fn from(request: ShotRequest) -> Self {
        Self {
            shooter_id: request.player_id.map(|id| id.to_string()),
            image: request.image,
            timestamp: request.timestamp,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ShotDataDto {
    pub shooter: String,
    pub target: String,
    pub distance: f64,
}

impl From<HitSummary> for ShotDataDto {
    fn from(hit: HitSummary) -> Self {
        Self {
            shooter: hit.shooter,
            target: hit.target,
            distance: hit.distance,
        }
    }
}

/// Private reply to the submitter of a shot.
#[derive(Debug, Clone, Serialize)]
pub struct ShotAckDto {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ShotDataDto>,
    #[serde(rename = "requestId", skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ShotAckDto {
    pub fn from_ack(ack: ShotAck, request_id: Option<String>) -> Self {
        Self {
            success: ack.success,
            message: ack.message,
            data: ack.hit.map(ShotDataDto::from),
            request_id,
        }
    }

    pub fn rejected(message: impl Into<String>, request_id: Option<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            request_id,
        }
    }
}

/// Messages broadcast to every connected client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    ShotEvent { killer: PlayerDto, target: PlayerDto },
    GameReset { message: String },
}

impl From<&ServerEvent> for ServerMessage {
    fn from(event: &ServerEvent) -> Self {
        match event {
            ServerEvent::ShotEvent { killer, target } => ServerMessage::ShotEvent {
                killer: killer.clone().into(),
                target: target.clone().into(),
            },
            ServerEvent::GameReset { message } => ServerMessage::GameReset {
                message: message.clone(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub message: String,
}
