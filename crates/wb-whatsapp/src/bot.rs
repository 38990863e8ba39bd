//! WhatsApp bridge wrapper

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use wb_acs::{AcsClient, WhatsAppNotifier};
use wb_core::Config;
use wb_directline::DirectLineClient;

use crate::dispatcher::Dispatcher;
use crate::error::Result;
use crate::webhook::WebhookServer;

/// Wires the DirectLine and ACS clients behind the webhook server
pub struct WhatsAppBridge {
    dispatcher: Dispatcher,
    port: u16,
}

impl WhatsAppBridge {
    /// Build the bridge from a validated configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;

        let directline = DirectLineClient::from_config(&config.directline)?;
        let acs = AcsClient::new(&config.acs.connection_string)?;
        let notifier = WhatsAppNotifier::new(Arc::new(acs), config.acs.channel_id.clone());

        let dispatcher = Dispatcher::new(
            Arc::new(directline),
            notifier,
            config.directline.reply_timeout(),
        );

        Ok(Self {
            dispatcher,
            port: config.server.port,
        })
    }

    /// Start the webhook server and run until `shutdown` resolves
    pub async fn start<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr: SocketAddr = ([0, 0, 0, 0], self.port).into();
        WebhookServer::new(addr, self.dispatcher).start(shutdown).await
    }
}
