//! Outbound WhatsApp notifier
//!
//! Wraps a [`NotificationSender`] and turns every outcome, including send
//! failures, into a [`DeliveryOutcome`]. Nothing here returns an error.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::client::AcsClient;
use crate::error::Result;
use crate::types::{SendMessageResult, TextNotificationContent};

pub const STATUS_ACCEPTED: u16 = 202;
pub const STATUS_FAILED: u16 = 500;

/// Send operation of the messaging gateway
#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send(&self, content: &TextNotificationContent) -> Result<SendMessageResult>;
}

#[async_trait]
impl NotificationSender for AcsClient {
    async fn send(&self, content: &TextNotificationContent) -> Result<SendMessageResult> {
        AcsClient::send(self, content).await
    }
}

/// Status code and human-readable detail of one delivery attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryOutcome {
    pub status: u16,
    pub detail: String,
}

impl DeliveryOutcome {
    fn failed(detail: impl Into<String>) -> Self {
        Self {
            status: STATUS_FAILED,
            detail: detail.into(),
        }
    }
}

/// Delivers bot replies to WhatsApp users
#[derive(Clone)]
pub struct WhatsAppNotifier {
    sender: Arc<dyn NotificationSender>,
    channel_id: Option<String>,
}

impl WhatsAppNotifier {
    pub fn new(sender: Arc<dyn NotificationSender>, channel_id: Option<String>) -> Self {
        Self { sender, channel_id }
    }

    /// Send `text` to `to`.
    ///
    /// Without a channel registration id no request is made.
    pub async fn notify(&self, to: &str, text: &str) -> DeliveryOutcome {
        let Some(channel_id) = self.channel_id.as_deref().filter(|id| !id.is_empty()) else {
            warn!("WhatsApp channel id is not configured");
            return DeliveryOutcome::failed("Missing environment variables for ACS");
        };

        let content = TextNotificationContent::new(channel_id, to, text);

        match self.sender.send(&content).await {
            Ok(result) => match result.receipts.first() {
                Some(receipt) => {
                    info!("WhatsApp message {} queued for {}", receipt.message_id, receipt.to);
                    DeliveryOutcome {
                        status: STATUS_ACCEPTED,
                        detail: format!("MessageId: {}, To: {}", receipt.message_id, receipt.to),
                    }
                }
                None => {
                    warn!("ACS returned no receipt for {}", to);
                    DeliveryOutcome::failed("No receipt returned")
                }
            },
            Err(e) => {
                warn!("Failed to send WhatsApp message to {}: {}", to, e);
                DeliveryOutcome::failed(e.to_string())
            }
        }
    }
}
