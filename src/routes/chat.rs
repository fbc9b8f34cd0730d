use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tracing::{info, warn};

use crate::{models::chat::AskRequest, services::chat::ChatSession, AppState};

/// GET /chat — WebSocket; one chat session per connection
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Accepts a plain-text question or `{"question": "..."}`.
fn question_from(text: &str) -> String {
    serde_json::from_str::<AskRequest>(text)
        .map(|req| req.question)
        .unwrap_or_else(|_| text.to_string())
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let mut session = ChatSession::new();
    info!("Chat session {} opened", session.id());

    while let Some(msg) = receiver.next().await {
        let text = match msg {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                warn!("Chat session {} receive error: {}", session.id(), e);
                break;
            }
        };

        let Some(turn) = session.ask(&state.advice, &question_from(text.as_str())).await else {
            continue;
        };
        let payload = match serde_json::to_string(turn) {
            Ok(p) => p,
            Err(e) => {
                warn!("Chat turn serialization failed: {}", e);
                continue;
            }
        };
        if sender.send(Message::Text(payload.into())).await.is_err() {
            break;
        }
    }

    info!(
        "Chat session {} closed after {} turn(s)",
        session.id(),
        session.transcript().len()
    );
}
