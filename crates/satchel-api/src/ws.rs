//! WebSocket delivery endpoint.
//!
//! One socket is one registry connection. The client binds it to an
//! identity's room with a `join` frame; from then on, delivery events for
//! that room stream out as JSON text frames until either side closes.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use satchel::realtime::ClientEvent;
use satchel::store::Store;
use tracing::{debug, info};

use crate::AppState;

/// GET /ws
pub async fn upgrade<S: Store + 'static>(
    State(state): State<AppState<S>>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| async move {
        handle_socket(state, socket).await;
    })
}

/// Drive one connection: client frames in, delivery events out.
async fn handle_socket<S: Store + 'static>(state: AppState<S>, socket: WebSocket) {
    let delivery = state.service.delivery();
    let (connection, mut events, handle) = delivery.open();
    info!(connection, "websocket connected");

    let (mut sink, mut stream) = socket.split();

    let mut push_task = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let frame = match serde_json::to_string(&event) {
                Ok(frame) => frame,
                Err(e) => {
                    debug!(error = %e, "dropped unserializable delivery event");
                    continue;
                }
            };
            if sink.send(Message::Text(frame)).await.is_err() {
                break;
            }
        }
    });

    let service = Arc::clone(&state.service);
    let registry = Arc::clone(&delivery);
    let mut read_task = tokio::spawn(async move {
        while let Some(Ok(message)) = stream.next().await {
            match message {
                Message::Text(text) => match serde_json::from_str::<ClientEvent>(&text) {
                    Ok(ClientEvent::Join { identity_id }) => {
                        registry.join(connection, identity_id, handle.clone());
                    }
                    Ok(ClientEvent::SendMessage(relay)) => {
                        let delivered = service.relay(&relay);
                        debug!(connection, to = %relay.to, delivered, "relayed message");
                    }
                    Err(e) => {
                        debug!(connection, error = %e, "dropped unparseable client frame");
                    }
                },
                Message::Close(_) => break,
                // Ping/pong is handled by the protocol layer.
                _ => {}
            }
        }
    });

    // Either side finishing tears the whole connection down.
    tokio::select! {
        _ = &mut push_task => read_task.abort(),
        _ = &mut read_task => push_task.abort(),
    }
    delivery.leave(connection);
    info!(connection, "websocket disconnected");
}
