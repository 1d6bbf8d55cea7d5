//! WebSocket notification stream.
//!
//! Every connected client receives every notification as one JSON text
//! frame. Inbound frames are read only to notice the client leaving.

use async_trait::async_trait;
use axum::{
    Router,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
    routing::get,
};
use bytes::Bytes;
use futures_util::{SinkExt, StreamExt, stream::SplitSink};
use potluck_core::hub::{ClientSink, Hub, SinkError};

use crate::state::AppState;

pub(super) fn router() -> Router<AppState> {
    Router::new().route("/ws", get(subscribe))
}

/// `GET /ws` – upgrade and register the connection with the hub.
async fn subscribe(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state.hub))
}

/// Write half of an upgraded connection.
struct WsSink(SplitSink<WebSocket, Message>);

#[async_trait]
impl ClientSink for WsSink {
    async fn send(&mut self, payload: Bytes) -> Result<(), SinkError> {
        let text = std::str::from_utf8(&payload).map_err(SinkError::new)?;
        self.0
            .send(Message::Text(text.into()))
            .await
            .map_err(SinkError::new)
    }

    async fn close(&mut self) {
        let _ = self.0.close().await;
    }
}

/// Drive the read half until the client leaves or the hub drops it.
async fn handle_socket(socket: WebSocket, hub: Hub) {
    let (sink, mut stream) = socket.split();
    let mut handle = hub.register(WsSink(sink));
    let client_id = handle.id();
    tracing::info!(client_id, "WebSocket client connected");

    loop {
        tokio::select! {
            _ = handle.closed() => break,
            frame = stream.next() => match frame {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::debug!(client_id, error = %e, "WebSocket read failed");
                    break;
                }
            },
        }
    }

    handle.unregister();
    tracing::info!(client_id, "WebSocket client disconnected");
}
