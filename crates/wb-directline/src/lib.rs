//! wb-directline: Bot Framework DirectLine client for wa-bridge
//!
//! Opens conversations, posts user activities and waits on the
//! conversation's WebSocket stream for the bot's reply.

pub mod channel;
pub mod client;
pub mod error;
pub mod stream;
pub mod types;

pub use channel::BotChannel;
pub use client::DirectLineClient;
pub use error::{DirectLineError, Result};
pub use types::{Activity, ActivitySet, ChannelAccount, ConversationSession};
