//! Provider connection settings validation.

use crate::schema::LumenConfig;

use super::helpers::{validate_not_blank, validate_range};

pub(super) fn validate_provider(errors: &mut Vec<String>, config: &LumenConfig) {
    let p = &config.provider;
    validate_not_blank(errors, "provider.api_key_env", &p.api_key_env);
    validate_not_blank(errors, "provider.base_url", &p.base_url);
    validate_not_blank(errors, "provider.image_model", &p.image_model);
    validate_range(
        errors,
        "provider.connect_timeout_secs",
        p.connect_timeout_secs,
        1,
        300,
    );
    validate_range(
        errors,
        "provider.request_timeout_secs",
        p.request_timeout_secs,
        1,
        3600,
    );
}
