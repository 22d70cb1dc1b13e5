//! WebSocket tunnelling.

use std::sync::Arc;

use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    http::Uri,
    response::Response,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{self, Message as TgMessage};
use tracing::{error, info, warn};

/// Handle a WebSocket upgrade and tunnel frames to the backend at
/// `ws://<target host><original path>`.
pub async fn handle_upgrade(ws: WebSocketUpgrade, target_host: Arc<str>, uri: Uri) -> Response {
    let backend_url = format!("ws://{}{}", target_host, uri.path());

    info!(backend = %backend_url, "Handling WebSocket upgrade");

    ws.on_upgrade(move |socket| tunnel(socket, backend_url))
}

/// Pump frames in both directions until either side fails, then tear the
/// whole tunnel down. Half-open connections are not tolerated.
async fn tunnel(client_ws: WebSocket, backend_url: String) {
    let backend_ws = match connect_async(&backend_url).await {
        Ok((ws, _)) => ws,
        Err(e) => {
            error!(backend = %backend_url, error = %e, "Failed to connect to backend WebSocket");
            return;
        }
    };

    let (mut b_sink, mut b_stream) = backend_ws.split();
    let (mut c_sink, mut c_stream) = client_ws.split();

    // Capacity 2: one slot per pump, so neither send can block.
    let (err_tx, mut err_rx) = mpsc::channel::<()>(2);

    let c2b_done = err_tx.clone();
    let client_to_backend = tokio::spawn(async move {
        while let Some(Ok(msg)) = c_stream.next().await {
            if b_sink.send(to_backend_message(msg)).await.is_err() {
                warn!("Error forwarding to backend");
                break;
            }
        }
        let _ = c2b_done.try_send(());
    });

    let backend_to_client = tokio::spawn(async move {
        while let Some(Ok(msg)) = b_stream.next().await {
            let Some(msg) = to_client_message(msg) else {
                continue;
            };
            if c_sink.send(msg).await.is_err() {
                warn!("Error forwarding to client");
                break;
            }
        }
        let _ = err_tx.try_send(());
    });

    // The first pump to fail (or finish) tears down both directions.
    let _ = err_rx.recv().await;
    client_to_backend.abort();
    backend_to_client.abort();

    info!(backend = %backend_url, "WebSocket connection closed");
}

fn to_backend_message(msg: Message) -> TgMessage {
    match msg {
        Message::Text(t) => TgMessage::Text(t.to_string().into()),
        Message::Binary(b) => TgMessage::Binary(b.into()),
        Message::Ping(p) => TgMessage::Ping(p.into()),
        Message::Pong(p) => TgMessage::Pong(p.into()),
        Message::Close(c) => TgMessage::Close(c.map(to_backend_close_frame)),
    }
}

fn to_client_message(msg: TgMessage) -> Option<Message> {
    match msg {
        TgMessage::Text(t) => Some(Message::Text(t.to_string().into())),
        TgMessage::Binary(b) => Some(Message::Binary(b.into())),
        TgMessage::Ping(p) => Some(Message::Ping(p.into())),
        TgMessage::Pong(p) => Some(Message::Pong(p.into())),
        TgMessage::Close(c) => Some(Message::Close(c.map(to_client_close_frame))),
        _ => None,
    }
}

fn to_backend_close_frame(cf: axum::extract::ws::CloseFrame) -> tungstenite::protocol::CloseFrame {
    tungstenite::protocol::CloseFrame {
        code: cf.code.into(),
        reason: cf.reason.to_string().into(),
    }
}

fn to_client_close_frame(cf: tungstenite::protocol::CloseFrame) -> axum::extract::ws::CloseFrame {
    axum::extract::ws::CloseFrame {
        code: cf.code.into(),
        reason: cf.reason.to_string().into(),
    }
}
