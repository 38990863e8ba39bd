//! Conversation stream listener
//!
//! A background task owns the WebSocket and hands the first bot reply back
//! over a oneshot channel. The caller waits on that channel under a timeout
//! and aborts the task on every exit path, so the connection never outlives
//! the wait.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::sync::oneshot;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{
        Message as WsMessage,
        client::IntoClientRequest,
        handshake::client::Request,
        http::{HeaderValue, header::AUTHORIZATION},
    },
};
use tracing::{debug, info, warn};

use crate::error::{DirectLineError, Result};
use crate::types::ActivitySet;

/// Wait up to `budget` for the first bot message on `stream_url`.
pub async fn await_bot_reply(stream_url: &str, token: &str, budget: Duration) -> Result<String> {
    let request = build_request(stream_url, token)?;

    let (reply_tx, reply_rx) = oneshot::channel();
    let listener = tokio::spawn(listen(request, reply_tx));

    let outcome = tokio::time::timeout(budget, reply_rx).await;
    listener.abort();

    match outcome {
        Ok(Ok(text)) => {
            info!("Received bot reply ({} chars)", text.chars().count());
            Ok(text)
        }
        Ok(Err(_)) => Err(DirectLineError::StreamClosed),
        Err(_) => {
            warn!("No bot reply within {:?}", budget);
            Err(DirectLineError::ReplyTimeout(budget))
        }
    }
}

fn build_request(stream_url: &str, token: &str) -> Result<Request> {
    let mut request = stream_url.into_client_request()?;

    let auth = HeaderValue::from_str(&format!("Bearer {}", token))
        .map_err(|e| DirectLineError::WebSocket(e.to_string()))?;
    request.headers_mut().insert(AUTHORIZATION, auth);

    Ok(request)
}

async fn listen(request: Request, reply_tx: oneshot::Sender<String>) {
    if let Err(e) = run_listener(request, reply_tx).await {
        warn!("DirectLine stream error: {}", e);
    }
}

async fn run_listener(request: Request, reply_tx: oneshot::Sender<String>) -> Result<()> {
    let (ws_stream, _) = connect_async(request).await?;
    debug!("Connected to DirectLine stream");

    let (mut write, mut read) = ws_stream.split();

    while let Some(message) = read.next().await {
        match message? {
            WsMessage::Text(text) => {
                // DirectLine sends empty frames as keep-alives
                if text.trim().is_empty() {
                    continue;
                }

                let set: ActivitySet = serde_json::from_str(text.as_str())
                    .map_err(|e| DirectLineError::Parse(e.to_string()))?;

                debug!(
                    "Stream frame with {} activities (watermark {:?})",
                    set.activities.len(),
                    set.watermark
                );

                if let Some(reply) = set.first_bot_reply() {
                    // Close before handing over the reply; the caller aborts this task on receipt
                    if let Err(e) = write.send(WsMessage::Close(None)).await {
                        debug!("Close after reply failed: {}", e);
                    }
                    let _ = reply_tx.send(reply);
                    return Ok(());
                }
            }
            WsMessage::Ping(data) => {
                write.send(WsMessage::Pong(data)).await?;
            }
            WsMessage::Close(_) => {
                debug!("DirectLine stream closed by server");
                break;
            }
            _ => {}
        }
    }

    Ok(())
}
