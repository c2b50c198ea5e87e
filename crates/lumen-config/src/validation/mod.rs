//! Full configuration validation.
//!
//! Each section has its own submodule; this orchestrator calls them all
//! and collects errors into a single `ConfigError`.

mod chat;
mod helpers;
mod provider;


use crate::schema::LumenConfig;
use lumen_common::ConfigError;

pub use chat::validate_chat;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &LumenConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    chat::collect_chat(&mut errors, &config.chat);
    provider::validate_provider(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}
