//! Webhook dispatcher
//!
//! Walks an Event Grid batch in order and stops at the first actionable
//! event: a subscription validation is echoed, a received message is relayed
//! to the bot and the reply sent back over WhatsApp. Delivery status updates
//! are acknowledged and skipped.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use tracing::{debug, error, info, warn};

use wb_acs::WhatsAppNotifier;
use wb_directline::BotChannel;

use crate::error::Result;
use crate::events::{self, EventKind};

/// Sent to the user when the bot stays silent
pub const FALLBACK_REPLY: &str = "No response from bot.";

/// Status and JSON body returned to Event Grid
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookReply {
    pub status: StatusCode,
    pub body: Value,
}

impl WebhookReply {
    pub fn ok(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            body,
        }
    }

    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "error": message.into() }),
        }
    }

    fn unsupported() -> Self {
        Self::error(StatusCode::BAD_REQUEST, "Unsupported event type")
    }
}

impl IntoResponse for WebhookReply {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Routes webhook batches to the bot and back
#[derive(Clone)]
pub struct Dispatcher {
    bot: Arc<dyn BotChannel>,
    notifier: WhatsAppNotifier,
    reply_timeout: Duration,
}

impl Dispatcher {
    pub fn new(bot: Arc<dyn BotChannel>, notifier: WhatsAppNotifier, reply_timeout: Duration) -> Self {
        Self {
            bot,
            notifier,
            reply_timeout,
        }
    }

    /// Handle one raw webhook body. Never fails; errors become 4xx/5xx replies.
    pub async fn dispatch(&self, body: &[u8]) -> WebhookReply {
        match self.try_dispatch(body).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Rejecting webhook: {}", e);
                WebhookReply::error(StatusCode::BAD_REQUEST, format!("Exception: {}", e))
            }
        }
    }

    async fn try_dispatch(&self, body: &[u8]) -> Result<WebhookReply> {
        let Some(batch) = events::parse_batch(body)? else {
            return Ok(WebhookReply::unsupported());
        };

        debug!("Webhook batch with {} event(s)", batch.len());

        let mut handled = false;

        for event in &batch {
            match event.kind() {
                EventKind::SubscriptionValidation => {
                    let code = event.validation_code()?;
                    info!("Answering Event Grid subscription validation");
                    return Ok(WebhookReply::ok(json!({ "validationResponse": code })));
                }
                EventKind::MessageReceived => {
                    let message = event.received_message()?;
                    return Ok(self.relay(&message.from, &message.content).await);
                }
                EventKind::DeliveryStatusUpdated => {
                    let status = event.delivery_status();
                    info!(
                        "Delivery status for {}: {}",
                        status.message_id.as_deref().unwrap_or("<unknown>"),
                        status.status.as_deref().unwrap_or("<unknown>")
                    );
                    handled = true;
                }
                EventKind::Other => {
                    debug!("Ignoring event type {:?}", event.event_type);
                }
            }
        }

        if handled {
            Ok(WebhookReply::ok(json!({})))
        } else {
            Ok(WebhookReply::unsupported())
        }
    }

    /// Relay one WhatsApp message through a fresh bot conversation
    pub async fn relay(&self, from: &str, text: &str) -> WebhookReply {
        info!("Received WhatsApp message from {}", from);

        let session = match self.bot.start_conversation().await {
            Ok(session) => session,
            Err(e) => {
                error!("Failed to start conversation: {}", e);
                return WebhookReply::error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to start DirectLine conversation",
                );
            }
        };

        if let Err(e) = self.bot.send_message(&session, text).await {
            error!("Failed to forward message to {}: {}", session.conversation_id, e);
            return WebhookReply::error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to send message to DirectLine",
            );
        }

        let reply = match self.bot.await_reply(&session, self.reply_timeout).await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => FALLBACK_REPLY.to_string(),
            Err(e) => {
                warn!("No reply in conversation {}: {}", session.conversation_id, e);
                FALLBACK_REPLY.to_string()
            }
        };

        let outcome = self.notifier.notify(from, &reply).await;

        WebhookReply::ok(json!({
            "to": from,
            "text": reply,
            "acs_status": outcome.status,
            "acs_response": outcome.detail,
        }))
    }
}
