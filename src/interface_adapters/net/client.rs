use crate::interface_adapters::http::error_response;
use crate::interface_adapters::protocol::{ServerMessage, ShotAckDto, ShotRequest};
use crate::interface_adapters::state::AppState;
use crate::use_cases::{ChannelHandle, ChannelState, CloseReason, GameController, ServerEvent};

use axum::{
    extract::{
        Path, State,
        ws::{
            CloseFrame, Message, WebSocket, WebSocketUpgrade, close_code,
            rejection::WebSocketUpgradeRejection,
        },
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures::SinkExt;
use std::sync::Arc;
use tracing::{Instrument, debug, info, info_span, warn};

#[derive(Debug)]
enum NetError {
    // Categorizes connection lifecycle failures so callers can decide policy.
    #[allow(dead_code)]
    Ws(axum::Error),
    #[allow(dead_code)]
    Serialization(serde_json::Error),
}

const MAX_INVALID_JSON: u32 = 10;

pub async fn ws_handler(
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
    Path(player_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    // Only registered players may open a channel.
    if !state.game.registry().contains(&player_id).await {
        return error_response(
            StatusCode::NOT_FOUND,
            format!("User with user_id:{player_id} not found"),
        )
        .into_response();
    }

    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => return rejection.into_response(),
    };

    let game = state.game.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, player_id, game))
}

async fn handle_socket(socket: WebSocket, player_id: String, game: Arc<GameController>) {
    let mut state = ChannelState::Connecting;
    let channel = game.connections().connect(&player_id).await;
    let span = info_span!("conn", conn_id = channel.token, player_id = %player_id);

    async move {
        state = transition(state, ChannelState::Connected);
        info!("client connected");

        let mut ctx = ConnCtx {
            player_id,
            channel,
            game,
            msgs_in: 0,
            msgs_out: 0,
            invalid_json: 0,
            close_frame: None,
        };
        let mut socket = socket;
        let final_state = run_client_loop(&mut socket, &mut ctx).await;
        state = transition(state, final_state);

        // A replaced or reset channel is already gone from the registry.
        let released = ctx
            .game
            .connections()
            .disconnect(&ctx.player_id, ctx.channel.token)
            .await;
        debug!(
            msgs_in = ctx.msgs_in,
            msgs_out = ctx.msgs_out,
            invalid_json = ctx.invalid_json,
            released,
            "connection stats"
        );
        info!(?state, "client disconnected");
    }
    .instrument(span)
    .await
}

fn transition(from: ChannelState, to: ChannelState) -> ChannelState {
    debug!(?from, ?to, "channel state");
    to
}

struct ConnCtx {
    player_id: String,
    channel: ChannelHandle,
    game: Arc<GameController>,

    msgs_in: u64,
    msgs_out: u64,
    // Consecutive frames that failed to parse.
    invalid_json: u32,

    close_frame: Option<CloseFrame>,
}

enum LoopControl {
    Continue,
    Disconnect(ChannelState),
}

async fn run_client_loop(socket: &mut WebSocket, ctx: &mut ConnCtx) -> ChannelState {
    let final_state = loop {
        let control = tokio::select! {
            // Incoming shot submissions.
            incoming = socket.recv() => handle_incoming_ws(socket, incoming, ctx).await,

            // Outgoing broadcast events queued by the connection manager.
            event = ctx.channel.events.recv() => match event {
                Some(event) => forward_event(socket, &event, &mut ctx.msgs_out).await,
                // The manager dropped this channel; the close reason is already set.
                None => {
                    let reason = *ctx.channel.close_rx.borrow();
                    close_from_server(socket, ctx, reason).await
                }
            },

            // Server-side close: replaced, reset, or failed delivery.
            changed = ctx.channel.close_rx.changed() => {
                let reason = match changed {
                    Ok(()) => *ctx.channel.close_rx.borrow_and_update(),
                    Err(_) => None,
                };
                close_from_server(socket, ctx, reason).await
            }
        };

        if let LoopControl::Disconnect(state) = control {
            break state;
        }
    };

    if let Some(frame) = ctx.close_frame.take() {
        let _ = socket.send(Message::Close(Some(frame))).await;
    }
    if let Err(err) = socket.close().await {
        debug!(error = ?err, "socket close error");
    }
    final_state
}

async fn close_from_server(
    socket: &mut WebSocket,
    ctx: &mut ConnCtx,
    reason: Option<CloseReason>,
) -> LoopControl {
    let Some(reason) = reason else {
        return LoopControl::Disconnect(ChannelState::Disconnected);
    };

    // Flush anything queued before the close, so a reset notice lands before the close frame.
    if reason != CloseReason::Failed {
        while let Ok(event) = ctx.channel.events.try_recv() {
            if let LoopControl::Disconnect(state) =
                forward_event(socket, &event, &mut ctx.msgs_out).await
            {
                return LoopControl::Disconnect(state);
            }
        }
    }

    let (code, text) = match reason {
        CloseReason::Replaced => (close_code::POLICY, "connection replaced"),
        CloseReason::Reset => (close_code::NORMAL, "game reset"),
        CloseReason::Failed => (close_code::AGAIN, "client too slow"),
    };
    ctx.close_frame = Some(CloseFrame {
        code,
        reason: text.into(),
    });
    info!(?reason, "closing channel");
    LoopControl::Disconnect(ChannelState::from(reason))
}

async fn handle_incoming_ws(
    socket: &mut WebSocket,
    incoming: Option<Result<Message, axum::Error>>,
    ctx: &mut ConnCtx,
) -> LoopControl {
    match incoming {
        Some(Ok(msg)) => match msg {
            Message::Text(text) => {
                ctx.msgs_in += 1;
                let reply = match serde_json::from_str::<ShotRequest>(&text) {
                    Ok(request) => {
                        ctx.invalid_json = 0;
                        let request_id = request.request_id.clone();
                        let ack = ctx
                            .game
                            .submit_shot(&ctx.player_id, request.into())
                            .await;
                        ShotAckDto::from_ack(ack, request_id)
                    }
                    Err(parse_err) => {
                        ctx.invalid_json += 1;
                        warn!(
                            bytes = text.len(),
                            error = %parse_err,
                            "failed to parse client message"
                        );
                        if ctx.invalid_json > MAX_INVALID_JSON {
                            ctx.close_frame = Some(CloseFrame {
                                code: close_code::POLICY,
                                reason: "too many invalid messages".into(),
                            });
                            return LoopControl::Disconnect(ChannelState::Disconnected);
                        }
                        ShotAckDto::rejected("invalid shot payload", None)
                    }
                };

                match send_json(socket, &reply).await {
                    Ok(()) => {
                        ctx.msgs_out += 1;
                        LoopControl::Continue
                    }
                    Err(err) => {
                        warn!(error = ?err, "failed to send shot ack");
                        LoopControl::Disconnect(ChannelState::Failed)
                    }
                }
            }
            Message::Binary(_) => {
                ctx.close_frame = Some(CloseFrame {
                    code: close_code::UNSUPPORTED,
                    reason: "binary messages not supported".into(),
                });
                LoopControl::Disconnect(ChannelState::Disconnected)
            }
            Message::Ping(_) | Message::Pong(_) => LoopControl::Continue,
            Message::Close(_) => LoopControl::Disconnect(ChannelState::Disconnected),
        },
        Some(Err(e)) => {
            warn!(error = %e, "websocket recv error");
            LoopControl::Disconnect(ChannelState::Failed)
        }
        None => {
            info!("websocket closed");
            LoopControl::Disconnect(ChannelState::Disconnected)
        }
    }
}

async fn forward_event(socket: &mut WebSocket, event: &ServerEvent, msgs_out: &mut u64) -> LoopControl {
    match send_json(socket, &ServerMessage::from(event)).await {
        Ok(()) => {
            *msgs_out += 1;
            LoopControl::Continue
        }
        Err(err) => {
            // Log unexpected send failures; disconnect will follow immediately.
            warn!(error = ?err, "failed to send event");
            LoopControl::Disconnect(ChannelState::Failed)
        }
    }
}

async fn send_json<T: serde::Serialize>(socket: &mut WebSocket, msg: &T) -> Result<(), NetError> {
    let txt = serde_json::to_string(msg).map_err(NetError::Serialization)?;
    socket
        .send(Message::Text(txt.into()))
        .await
        .map_err(NetError::Ws)
}
