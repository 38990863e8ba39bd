//! wa-bridge: WhatsApp ⇄ DirectLine relay main binary
//!
//! Usage:
//!   wa-bridge             - Start the webhook server
//!   wa-bridge --help      - Show help
//!   wa-bridge --version   - Show version

use tracing_subscriber::EnvFilter;
use wb_core::Config;
use wb_whatsapp::WhatsAppBridge;

/// Run mode
#[derive(Debug, PartialEq, Eq)]
enum RunMode {
    /// Webhook server
    Server,
    /// Show help
    Help,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    match parse_args(std::env::args().skip(1)) {
        RunMode::Help => {
            print_help();
            return Ok(());
        }
        RunMode::Version => {
            println!("wa-bridge {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        RunMode::Server => {}
    }

    // Load .env file before logging so RUST_LOG from it applies
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::load().map_err(|e| anyhow::anyhow!("Config error: {}", e))?;

    tracing::info!("Starting wa-bridge...");
    tracing::info!("DirectLine endpoint: {}", config.directline.base_url);
    tracing::info!("Bot reply timeout: {}s", config.directline.reply_timeout_secs);

    let bridge = WhatsAppBridge::from_config(&config)
        .map_err(|e| anyhow::anyhow!("Failed to initialize bridge: {}", e))?;

    tracing::info!("Press Ctrl+C to exit");
    bridge.start(shutdown_signal()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Parse command line arguments
fn parse_args<I>(args: I) -> RunMode
where
    I: IntoIterator<Item = String>,
{
    for arg in args {
        match arg.as_str() {
            "--help" | "-h" => return RunMode::Help,
            "--version" | "-v" => return RunMode::Version,
            _ => {}
        }
    }

    RunMode::Server
}

/// Resolves on Ctrl+C
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down...");
}

/// Print help message
fn print_help() {
    println!("wa-bridge - WhatsApp (ACS) to DirectLine bot relay");
    println!();
    println!("Usage:");
    println!("  wa-bridge             Start the webhook server");
    println!("  wa-bridge --help      Show this help message");
    println!("  wa-bridge --version   Show version");
    println!();
    println!("Endpoints:");
    println!("  GET  /                  Liveness message");
    println!("  POST /webhook/whatsapp  Event Grid webhook for ACS Advanced Messaging");
    println!();
    println!("Environment Variables:");
    println!("  DIRECTLINE_BASE_URL            DirectLine base URL (required)");
    println!("  DIRECT_LINE_SECRET             DirectLine channel secret (required)");
    println!("  ACS_CONNECTION_STRING          ACS connection string (required)");
    println!("  WHATSAPP_CHANNEL_ID            WhatsApp channel registration id (required)");
    println!("  DIRECTLINE_REPLY_TIMEOUT_SECS  Seconds to wait for the bot (default: 60)");
    println!("  PORT                           Webhook server port (default: 8000)");
    println!("  RUST_LOG                       Log filter (default: info)");
    println!();
    println!("Settings may also be placed in ./wa-bridge.toml; environment variables win.");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args() {
        assert_eq!(parse_args(args(&[])), RunMode::Server);
        assert_eq!(parse_args(args(&["--help"])), RunMode::Help);
        assert_eq!(parse_args(args(&["-v"])), RunMode::Version);
        assert_eq!(parse_args(args(&["--unknown", "-h"])), RunMode::Help);
    }
}
