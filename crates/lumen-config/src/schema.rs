//! Configuration schema. Missing sections and fields fall back to defaults.

use lumen_common::types::DEFAULT_IMAGE_MODEL;
use lumen_common::Configuration;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Top-level config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LumenConfig {
    /// Settings the first chat session is bound to.
    pub chat: Configuration,
    pub provider: ProviderSettings,
    pub logging: LoggingConfig,
}

/// Connection settings for the model provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub base_url: String,
    /// Model used for the one-shot image generation path.
    pub image_model: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            api_key_env: "GEMINI_API_KEY".into(),
            base_url: DEFAULT_BASE_URL.into(),
            image_model: DEFAULT_IMAGE_MODEL.into(),
            connect_timeout_secs: 10,
            request_timeout_secs: 120,
        }
    }
}

impl ProviderSettings {
    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

/// Log level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// `tracing-subscriber` filter directive for the lumen crates.
    pub fn directive(&self) -> &'static str {
        match self {
            LogLevel::Trace => "lumen=trace",
            LogLevel::Debug => "lumen=debug",
            LogLevel::Info => "lumen=info",
            LogLevel::Warn => "lumen=warn",
            LogLevel::Error => "lumen=error",
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
}
