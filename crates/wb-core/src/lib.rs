//! wb-core: wa-bridge core library
//!
//! DirectLine と ACS を中継するための設定とエラー型を提供します。

pub mod config;
pub mod error;

pub use config::{AcsConfig, Config, DirectLineConfig, ServerConfig};
pub use error::{Error, Result};
