//! Configuration management
//!
//! 設定は以下の優先順位で読み込まれます:
//! 1. 環境変数
//! 2. wa-bridge.toml 設定ファイル
//! 3. デフォルト値
//!
//! 設定ファイル内では `${VAR_NAME}` 形式で環境変数を展開できます。
//! 必須項目が欠けている場合は起動時にエラーになります。

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::Error;

/// Default config file looked up by [`Config::load`]
pub const CONFIG_FILE: &str = "wa-bridge.toml";

/// DirectLine (bot platform) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectLineConfig {
    /// Base URL, e.g. `https://directline.botframework.com/v3/directline`
    pub base_url: String,

    /// DirectLine channel secret
    #[serde(skip_serializing)]
    pub secret: String,

    /// Seconds to wait for the bot's reply on the stream
    #[serde(default = "default_reply_timeout_secs")]
    pub reply_timeout_secs: u64,
}

impl Default for DirectLineConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            secret: String::new(),
            reply_timeout_secs: default_reply_timeout_secs(),
        }
    }
}

impl DirectLineConfig {
    /// Reply wait budget as a [`Duration`]
    pub fn reply_timeout(&self) -> Duration {
        Duration::from_secs(self.reply_timeout_secs)
    }
}

/// Azure Communication Services configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AcsConfig {
    /// `endpoint=...;accesskey=...`
    #[serde(skip_serializing)]
    pub connection_string: String,

    /// WhatsApp channel registration id
    pub channel_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port for the webhook server
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

fn default_reply_timeout_secs() -> u64 {
    60
}

fn default_port() -> u16 {
    8000
}

/// Main configuration for wa-bridge
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub directline: DirectLineConfig,
    pub acs: AcsConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    /// 設定ファイルから環境変数を展開する
    ///
    /// `${VAR_NAME}` 形式の文字列を環境変数の値に置換します。
    /// 環境変数が存在しない場合は空文字列になります。
    fn expand_env_vars(value: &str) -> String {
        let mut result = String::new();
        let mut chars = value.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '$' && chars.peek() == Some(&'{') {
                chars.next();

                let mut var_name = String::new();
                for c in chars.by_ref() {
                    if c == '}' {
                        break;
                    }
                    var_name.push(c);
                }

                if let Ok(env_value) = std::env::var(&var_name) {
                    result.push_str(&env_value);
                }
            } else {
                result.push(c);
            }
        }

        result
    }

    /// TOML 文字列から設定を構築する (環境変数による上書き・検証は行わない)
    pub fn from_toml_str(content: &str) -> crate::Result<Self> {
        let expanded = Self::expand_env_vars(content);

        let toml: TomlConfig = toml::from_str(&expanded)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))?;

        Ok(Self::from_toml_config(toml))
    }

    /// TOML 設定ファイルから設定を読み込む
    ///
    /// 環境変数が設定ファイルより優先されます。読み込み後に必須項目を検証します。
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        let mut cfg = Self::from_toml_str(&content)?;
        cfg.apply_env_overrides();
        cfg.validate()?;

        Ok(cfg)
    }

    /// デフォルトパスから設定を読み込む
    ///
    /// `./wa-bridge.toml` があればそれを使い、なければ環境変数のみから読み込みます。
    pub fn load() -> crate::Result<Self> {
        if Path::new(CONFIG_FILE).exists() {
            tracing::info!("Loading configuration from {}", CONFIG_FILE);
            return Self::from_toml_file(CONFIG_FILE);
        }

        Self::from_env()
    }

    /// Load configuration from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut cfg = Config::default();
        cfg.apply_env_overrides();
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_toml_config(toml: TomlConfig) -> Self {
        let directline = toml.directline.unwrap_or_default();
        let acs = toml.acs.unwrap_or_default();
        let server = toml.server.unwrap_or_default();

        Config {
            directline: DirectLineConfig {
                base_url: directline.base_url.unwrap_or_default(),
                secret: directline.secret.unwrap_or_default(),
                reply_timeout_secs: directline
                    .reply_timeout_secs
                    .unwrap_or_else(default_reply_timeout_secs),
            },
            acs: AcsConfig {
                connection_string: acs.connection_string.unwrap_or_default(),
                channel_id: acs.channel_id.filter(|id| !id.is_empty()),
            },
            server: ServerConfig {
                port: server.port.unwrap_or_else(default_port),
            },
        }
    }

    /// 環境変数で設定を上書きする
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("DIRECTLINE_BASE_URL") {
            self.directline.base_url = url;
        }
        if let Ok(secret) = std::env::var("DIRECT_LINE_SECRET") {
            self.directline.secret = secret;
        }
        if let Ok(secs) = std::env::var("DIRECTLINE_REPLY_TIMEOUT_SECS") {
            match secs.parse() {
                Ok(s) => self.directline.reply_timeout_secs = s,
                Err(_) => tracing::warn!("Ignoring invalid DIRECTLINE_REPLY_TIMEOUT_SECS: {}", secs),
            }
        }

        if let Ok(conn) = std::env::var("ACS_CONNECTION_STRING") {
            self.acs.connection_string = conn;
        }
        if let Ok(id) = std::env::var("WHATSAPP_CHANNEL_ID") {
            if !id.is_empty() {
                self.acs.channel_id = Some(id);
            }
        }

        if let Ok(port) = std::env::var("PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }
    }

    /// Check that every required setting is present.
    ///
    /// Returns the first missing one, named by its environment variable.
    pub fn validate(&self) -> crate::Result<()> {
        let required = [
            ("DIRECTLINE_BASE_URL", self.directline.base_url.as_str()),
            ("DIRECT_LINE_SECRET", self.directline.secret.as_str()),
            ("ACS_CONNECTION_STRING", self.acs.connection_string.as_str()),
            ("WHATSAPP_CHANNEL_ID", self.acs.channel_id.as_deref().unwrap_or_default()),
        ];

        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(Error::Config(format!(
                    "Environment variable {} is not defined. Please add it to your environment or .env file.",
                    name
                )));
            }
        }

        if self.directline.reply_timeout_secs == 0 {
            return Err(Error::Config(
                "DIRECTLINE_REPLY_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

// ============================================================================
// TOML 構造体定義（ファイル解析用）
// ============================================================================

#[derive(Debug, Deserialize)]
struct TomlConfig {
    directline: Option<TomlDirectLineConfig>,
    acs: Option<TomlAcsConfig>,
    server: Option<TomlServerConfig>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlDirectLineConfig {
    #[serde(default)]
    base_url: Option<String>,
    #[serde(default)]
    secret: Option<String>,
    #[serde(default)]
    reply_timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlAcsConfig {
    #[serde(default)]
    connection_string: Option<String>,
    #[serde(default)]
    channel_id: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlServerConfig {
    #[serde(default)]
    port: Option<u16>,
}
