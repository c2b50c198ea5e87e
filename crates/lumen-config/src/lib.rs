//! Lumen configuration system.
//!
//! TOML-based configuration for the chat defaults, the model provider
//! connection and logging. Every section uses serde defaults so partial
//! configs work out of the box.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use lumen_config::load_config;
//!
//! let config = load_config().expect("failed to load config");
//! println!("model: {}", config.chat.model_id);
//! ```

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{LogLevel, LoggingConfig, LumenConfig, ProviderSettings};
pub use toml_loader::{load_default, load_from_path};

use lumen_common::ConfigError;

/// Load config from the platform default path and validate it.
pub fn load_config() -> Result<LumenConfig, ConfigError> {
    let config = toml_loader::load_default()?;
    validation::validate(&config)?;
    Ok(config)
}

/// Load config from an explicit path and validate it.
pub fn load_config_from(path: &std::path::Path) -> Result<LumenConfig, ConfigError> {
    let config = toml_loader::load_from_path(path)?;
    validation::validate(&config)?;
    Ok(config)
}
