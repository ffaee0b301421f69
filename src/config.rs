//! Wabot configuration management

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main Wabot configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WabotConfig {
    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Outbound message configuration
    #[serde(default)]
    pub messages: MessagesConfig,

    /// Message store configuration
    #[serde(default)]
    pub store: StoreConfig,
}

impl WabotConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| {
            Error::Config(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    /// Apply `D360_BASE_URL`, `TEMPLATE_LANG_CODE` and `DEMO_MODE` from the environment
    pub fn apply_env_overrides(&mut self) {
        if let Ok(base_url) = std::env::var("D360_BASE_URL") {
            self.gateway.base_url = base_url;
        }
        if let Ok(code) = std::env::var("TEMPLATE_LANG_CODE") {
            if !code.is_empty() {
                self.messages.template_lang_code = code;
            }
        }
        if let Ok(flag) = std::env::var("DEMO_MODE") {
            self.messages.demo_mode = parse_flag(&flag);
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Base URL of the gateway API (`messages` and `media` are appended)
    pub base_url: String,

    /// Environment variable holding the API key
    pub api_key_ref: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "https://waba.360dialog.io/v1".to_string(),
            api_key_ref: "D360_API_KEY".to_string(),
            timeout_secs: 30,
        }
    }
}

impl GatewayConfig {
    /// Resolve the API key from the environment variable named by `api_key_ref`
    pub fn resolve_api_key(&self) -> Result<String> {
        std::env::var(&self.api_key_ref).map_err(|_| {
            Error::Config(format!(
                "Failed to resolve gateway API key from env var: {}",
                self.api_key_ref
            ))
        })
    }
}

/// Outbound message configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesConfig {
    /// Language code used for template messages when none is given
    pub template_lang_code: String,

    /// Replace template messages with plain text naming the stored message
    pub demo_mode: bool,
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            template_lang_code: "he".to_string(),
            demo_mode: false,
        }
    }
}

/// Message store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// JSON file holding the outgoing messages
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        let base = dirs_next::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("wabot");

        Self {
            path: base.join("messages.json"),
        }
    }
}
