//! WebSocket endpoint pushing live-query snapshots
//!
//! Each connection runs its own live query: after the upgrade the server
//! sends a welcome frame, then a `snapshot` frame with the current
//! collection, then a fresh `snapshot` frame after every mutation affecting
//! the caller's invoices. There is no per-event protocol — clients replace
//! their whole collection on every frame, the same contract the interactive
//! list store follows.
//!
//! ## Server → Client frames
//!
//! ```json
//! {"type": "welcome", "connection_id": "conn_ab12..."}
//! {"type": "snapshot", "seq": 1, "items": [...]}
//! {"type": "pong"}
//! {"type": "error", "message": "..."}
//! ```
//!
//! ## Client → Server frames
//!
//! ```json
//! {"type": "ping"}
//! ```
//!
//! Browsers cannot set headers on WebSocket upgrades, so the session token
//! travels as a query parameter. The token is resolved before the upgrade is
//! accepted; an invalid token is rejected with 401 instead of a doomed
//! connection.

use crate::client::DataClient;
use crate::schema::invoice::Invoice;
use crate::server::AppState;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::{IntoResponse, Response};
use futures::SinkExt;
use futures::stream::{SplitSink, StreamExt};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct WsParams {
    pub token: String,
}

/// Frames sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    /// Keepalive ping
    Ping,
}

/// Frames sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    /// Sent once after the upgrade
    Welcome { connection_id: String },
    /// A full-collection replacement
    Snapshot { seq: u64, items: Vec<Invoice> },
    /// Keepalive response
    Pong,
    /// Error message
    Error { message: String },
}

/// WebSocket upgrade handler for GET /ws
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(params): Query<WsParams>,
) -> Response {
    let token = crate::auth::session::SessionToken::from(params.token.as_str());
    if let Err(e) = state.sessions.resolve(&token) {
        return e.into_response();
    }

    let client = DataClient::new(state.sessions.clone(), state.invoices.clone(), token);
    ws.on_upgrade(move |socket| handle_socket(socket, client))
        .into_response()
}

/// Run one connection: welcome frame, then snapshots until either side ends
///
/// The live query is owned by this function; when the socket closes or the
/// function returns, the stream is dropped and the subscription released.
async fn handle_socket(socket: WebSocket, client: DataClient) {
    let conn_id = format!("conn_{}", Uuid::new_v4().simple());

    // Split the WebSocket into read and write halves
    let (mut ws_write, mut ws_read) = socket.split();

    let mut stream = match client.observe_invoices() {
        Ok(stream) => stream,
        Err(e) => {
            let _ = send_frame(
                &mut ws_write,
                &ServerFrame::Error {
                    message: e.to_string(),
                },
            )
            .await;
            return;
        }
    };

    let welcome = ServerFrame::Welcome {
        connection_id: conn_id.clone(),
    };
    if send_frame(&mut ws_write, &welcome).await.is_err() {
        return;
    }
    tracing::debug!(connection_id = %conn_id, "WebSocket client connected");

    loop {
        tokio::select! {
            pushed = stream.next() => {
                match pushed {
                    Ok(Some(snapshot)) => {
                        let frame = ServerFrame::Snapshot {
                            seq: snapshot.seq,
                            items: snapshot.items,
                        };
                        if send_frame(&mut ws_write, &frame).await.is_err() {
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        // Surface the failure to the client before closing
                        let _ = send_frame(
                            &mut ws_write,
                            &ServerFrame::Error { message: e.to_string() },
                        )
                        .await;
                        break;
                    }
                }
            }
            received = ws_read.next() => {
                match received {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientFrame>(&text) {
                            Ok(ClientFrame::Ping) => {
                                if send_frame(&mut ws_write, &ServerFrame::Pong).await.is_err() {
                                    break;
                                }
                            }
                            Err(e) => {
                                let frame = ServerFrame::Error {
                                    message: format!("Invalid frame: {}", e),
                                };
                                if send_frame(&mut ws_write, &frame).await.is_err() {
                                    break;
                                }
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::debug!(connection_id = %conn_id, "WebSocket client disconnected");
                        break;
                    }
                    Some(Ok(_)) => {
                        // Ignore binary and control frames; axum answers pings
                    }
                    Some(Err(e)) => {
                        tracing::debug!(connection_id = %conn_id, error = %e, "WebSocket read error");
                        break;
                    }
                }
            }
        }
    }
}

async fn send_frame(
    ws_write: &mut SplitSink<WebSocket, Message>,
    frame: &ServerFrame,
) -> Result<(), axum::Error> {
    let json = serde_json::to_string(frame).map_err(axum::Error::new)?;
    ws_write.send(Message::Text(json.into())).await
}
