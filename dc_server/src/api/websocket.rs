//! WebSocket endpoint for players.
//!
//! # Connection Flow
//!
//! 1. Client connects via `GET /ws?passkey=<passkey>`
//! 2. An unknown passkey or a tournament that is not running refuses the
//!    upgrade; once upgraded, the passkey owner is bound to a fresh connection id
//! 3. A send task drains the connection's outbound queue, which carries both
//!    coordinator events and replies to client commands
//! 4. On close the user is marked offline and their active registrations
//!    are reset
//!
//! # Client Messages
//!
//! ```json
//! {"action": "setReady", "payload": {"tournamentId": "..."}}
//! {"action": "move", "payload": {"passkey": "...", "tournamentId": "...", "matchId": "...", "move": 4}}
//! ```
//!
//! # Server Messages
//!
//! - Events: `{"type": "match:require_move", "payload": {...}}` and friends
//! - Command replies: `{"type": "success" | "error", "message": "..."}`

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade, rejection::WebSocketUpgradeRejection},
    },
    response::{IntoResponse, Response},
};
use duel_coordinator::{MatchId, MoveOutcome, TournamentId};
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

use super::{AppState, error::ApiError};
use crate::{logging, metrics};

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    passkey: String,
}

/// Client commands received via WebSocket
#[derive(Debug, Deserialize)]
#[serde(tag = "action", content = "payload", rename_all = "camelCase")]
enum ClientMessage {
    /// Signal readiness in a tournament
    SetReady {
        #[serde(rename = "tournamentId")]
        tournament_id: TournamentId,
    },
    /// Play a move in an ongoing match
    Move {
        passkey: String,
        #[serde(rename = "tournamentId")]
        tournament_id: TournamentId,
        #[serde(rename = "matchId")]
        match_id: MatchId,
        #[serde(rename = "move")]
        mv: serde_json::Value,
    },
}

/// Replies to client commands
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ServerResponse {
    Success { message: String },
    Error { message: String },
}

/// Check the passkey and upgrade.
///
/// Nothing is bound until the upgraded socket is running, so a client that
/// never completes the handshake leaves no session behind.
///
/// # Response
///
/// - `101 Switching Protocols` on success
/// - `404 Not Found`: Unknown passkey
/// - `403 Forbidden`: Tournament is not open or started
pub async fn websocket_handler(
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
    Query(query): Query<WsQuery>,
    State(state): State<AppState>,
) -> Response {
    if let Err(e) = state.coordinator.admit_connection(&query.passkey).await {
        logging::log_security_event("ws_connect_refused", None, &e.to_string());
        return ApiError::from(e).into_response();
    }

    match ws {
        Ok(ws) => ws.on_upgrade(move |socket| handle_socket(socket, state, query.passkey)),
        Err(rejection) => rejection.into_response(),
    }
}

/// Bind the passkey owner to this socket, then serve it until either side
/// closes it.
async fn handle_socket(socket: WebSocket, state: AppState, passkey: String) {
    let connection_id = Uuid::new_v4().to_string();
    let (mut sender, mut receiver) = socket.split();

    // Route pushes before the user is reachable through the session directory
    let (outbound_tx, mut outbound_rx) = mpsc::channel::<String>(state.outbound_buffer);
    let open = state.hub.register(&connection_id, outbound_tx.clone()).await;

    let registry = match state.coordinator.on_connect(&passkey, &connection_id).await {
        Ok(registry) => registry,
        Err(e) => {
            // The tournament moved on between the check and the upgrade
            state.hub.unregister(&connection_id).await;
            logging::log_security_event("ws_connect_refused", None, &e.to_string());
            let refusal = ServerResponse::Error {
                message: e.client_message(),
            };
            if let Ok(json) = serde_json::to_string(&refusal) {
                let _ = sender.send(Message::Text(json.into())).await;
            }
            let _ = sender.send(Message::Close(None)).await;
            return;
        }
    };

    metrics::websocket_connections_active(open);
    info!(
        "WebSocket connected: user={}, tournament={}, connection={}",
        registry.player_user_id, registry.tournament_id, connection_id
    );

    let send_task = tokio::spawn(async move {
        while let Some(frame) = outbound_rx.recv().await {
            if sender.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    });

    let mut frames_received = 0;
    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                frames_received += 1;
                debug!("Received frame on {}: {}", connection_id, text.as_str());

                let response = match serde_json::from_str::<ClientMessage>(text.as_str()) {
                    Ok(client_msg) => handle_client_message(client_msg, &connection_id, &state).await,
                    Err(e) => {
                        warn!("Failed to parse client message: {}", e);
                        ServerResponse::Error {
                            message: "Invalid message format".to_string(),
                        }
                    }
                };

                if let Ok(json) = serde_json::to_string(&response)
                    && outbound_tx.send(json).await.is_err()
                {
                    break;
                }
            }
            Ok(Message::Close(_)) => break,
            Err(e) => {
                error!("WebSocket error on {}: {}", connection_id, e);
                break;
            }
            _ => {}
        }
    }

    send_task.abort();
    close_connection(&state, &connection_id, frames_received).await;
}

/// Detach the socket and reset the user's active registrations
async fn close_connection(state: &AppState, connection_id: &str, frames_received: u64) {
    let open = state.hub.unregister(connection_id).await;
    metrics::websocket_connections_active(open);

    match state.coordinator.on_disconnect(connection_id).await {
        Ok(reset) => logging::log_connection_closed(connection_id, frames_received, reset.len()),
        Err(e) => warn!("Disconnect of {} not recorded: {}", connection_id, e),
    }
}

/// Run one client command and turn its result into a reply.
async fn handle_client_message(
    msg: ClientMessage,
    connection_id: &str,
    state: &AppState,
) -> ServerResponse {
    match msg {
        ClientMessage::SetReady { tournament_id } => {
            match state.coordinator.on_set_ready(connection_id, tournament_id).await {
                Ok(outcome) => ServerResponse::Success {
                    message: match outcome.activated {
                        Some(m) => format!("Ready, match {} started", m.match_id),
                        None => "Ready".to_string(),
                    },
                },
                Err(e) => ServerResponse::Error {
                    message: e.client_message(),
                },
            }
        }

        ClientMessage::Move {
            passkey,
            tournament_id,
            match_id,
            mv,
        } => match state
            .coordinator
            .on_move(connection_id, &passkey, tournament_id, match_id, &mv)
            .await
        {
            Ok(outcome) => {
                metrics::move_accepted(&outcome);
                let message = match outcome {
                    MoveOutcome::Continued { .. } => "Move accepted".to_string(),
                    MoveOutcome::Finished { winner } => {
                        format!("Match finished: {}", winner.as_str())
                    }
                };
                ServerResponse::Success { message }
            }
            Err(e) => ServerResponse::Error {
                message: e.client_message(),
            },
        },
    }
}
