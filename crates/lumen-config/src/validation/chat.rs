//! Chat session settings validation.

use lumen_common::{ConfigError, Configuration};

use super::helpers::{validate_not_blank, validate_range, validate_range_f64};

pub const MAX_OUTPUT_TOKENS: u64 = 65_536;
pub const MAX_REASONING_BUDGET: u64 = 32_768;

pub(super) fn collect_chat(errors: &mut Vec<String>, chat: &Configuration) {
    validate_not_blank(errors, "chat.model_id", &chat.model_id);
    validate_range_f64(errors, "chat.temperature", chat.temperature, 0.0, 2.0);
    validate_range(
        errors,
        "chat.max_output_tokens",
        chat.max_output_tokens as u64,
        1,
        MAX_OUTPUT_TOKENS,
    );
    if let Some(budget) = chat.extended_reasoning_budget {
        validate_range(
            errors,
            "chat.extended_reasoning_budget",
            budget as u64,
            0,
            MAX_REASONING_BUDGET,
        );
    }
}

/// Validate a single chat configuration, e.g. one assembled at runtime.
pub fn validate_chat(chat: &Configuration) -> Result<(), ConfigError> {
    let mut errors = Vec::new();
    collect_chat(&mut errors, chat);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}
