use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use risk_views::{ControlId, ControlValue, DashboardSession, DashboardSnapshot};

use crate::dashboard_routes::UpdateResponse;
use crate::AppState;

/// Outgoing frames of a dashboard session.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Snapshot(DashboardSnapshot),
    Update(UpdateResponse),
    Error {
        message: String,
    },
}

/// A control change sent by the browser.
#[derive(Debug, Deserialize)]
pub struct ClientMessage {
    pub control: ControlId,
    pub value: ControlValue,
}

async fn ws_dashboard_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_dashboard_socket(socket, state))
}

/// Handle one incoming frame against the session.
fn handle_frame(session: &mut DashboardSession, text: &str) -> ServerMessage {
    let msg: ClientMessage = match serde_json::from_str(text) {
        Ok(msg) => msg,
        Err(e) => {
            return ServerMessage::Error {
                message: format!("Malformed control message: {}", e),
            }
        }
    };

    match session.apply(msg.control, msg.value) {
        Ok(update) => ServerMessage::Update(UpdateResponse {
            state: session.state().clone(),
            update,
        }),
        Err(e) => ServerMessage::Error {
            message: e.to_string(),
        },
    }
}

async fn handle_dashboard_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<ServerMessage>(32);

    let (mut session, snapshot) = DashboardSession::start(state.table.clone(), state.graph.clone());
    if tx.send(ServerMessage::Snapshot(snapshot)).await.is_err() {
        return;
    }

    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let json = match serde_json::to_string(&msg) {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!("Failed to serialize dashboard message: {}", e);
                    continue;
                }
            };
            if sender.send(Message::Text(json)).await.is_err() {
                break;
            }
        }
    });

    // One event at a time, so recomputations for this session never overlap
    let recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            let reply = match msg {
                Message::Text(text) => handle_frame(&mut session, &text),
                Message::Close(_) => break,
                _ => continue,
            };
            if tx.send(reply).await.is_err() {
                break;
            }
        }
    });

    tokio::select! {
        _ = send_task => {},
        _ = recv_task => {},
    }
    tracing::debug!("Dashboard session closed");
}

pub fn ws_routes() -> Router<AppState> {
    Router::new().route("/ws/dashboard", get(ws_dashboard_handler))
}
