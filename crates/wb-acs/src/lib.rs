//! wb-acs: Azure Communication Services Advanced Messaging for wa-bridge
//!
//! Sends WhatsApp text notifications through the ACS REST API and reports
//! the outcome as a status/detail pair.

pub mod auth;
pub mod client;
pub mod error;
pub mod notifier;
pub mod types;

pub use auth::ConnectionString;
pub use client::AcsClient;
pub use error::{AcsError, Result};
pub use notifier::{DeliveryOutcome, NotificationSender, WhatsAppNotifier};
pub use types::{MessageReceipt, SendMessageResult, TextNotificationContent};
