//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# Lumen Configuration
# Only override what you want to change -- missing fields use defaults.

[chat]
# model_id = "gemini-2.5-flash"
# personality = "none"           # professional, friendly, creative, humorous, strict, none
# custom_instruction = "Keep answers short."
# temperature = 0.7              # 0.0-2.0
# max_output_tokens = 8192       # 1-65536
# extended_reasoning_enabled = false
# extended_reasoning_budget = 1024   # 0-32768, only sent when enabled

[provider]
# api_key_env = "GEMINI_API_KEY"
# base_url = "https://generativelanguage.googleapis.com/v1beta/models"
# image_model = "gemini-2.0-flash-preview-image-generation"
# connect_timeout_secs = 10
# request_timeout_secs = 120

[logging]
# level = "info"                 # trace, debug, info, warn, error
"##
    .to_string()
}
