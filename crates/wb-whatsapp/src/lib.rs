//! wb-whatsapp: WhatsApp webhook endpoint for wa-bridge
//!
//! Receives Event Grid batches from Azure Communication Services, relays
//! inbound WhatsApp messages to a DirectLine bot and sends the bot's reply
//! back to the user.

pub mod bot;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod webhook;

pub use bot::WhatsAppBridge;
pub use dispatcher::{Dispatcher, FALLBACK_REPLY, WebhookReply};
pub use error::{Result, WhatsAppError};
pub use events::{EventKind, WebhookEvent};
pub use webhook::{WebhookServer, create_router};
