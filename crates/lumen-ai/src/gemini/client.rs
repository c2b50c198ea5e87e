//! Gemini API client struct, request building, and response parsing.

use lumen_common::Role;

use crate::provider::{Content, GenerationConfig, Part, TurnContent};
use crate::{AiError, TokenUsage};

use super::config::GeminiConfig;

/// Gemini API client.
#[derive(Clone)]
pub struct GeminiClient {
    pub(crate) config: GeminiConfig,
    pub(crate) http: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, AiError> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AiError::NetworkError(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, http })
    }

    pub(crate) fn api_url(&self, model: &str, stream: bool) -> String {
        api_url(&self.config.base_url, model, stream)
    }
}

pub(crate) fn api_url(base_url: &str, model: &str, stream: bool) -> String {
    if stream {
        format!("{base_url}/{model}:streamGenerateContent?alt=sse")
    } else {
        format!("{base_url}/{model}:generateContent")
    }
}

/// POST `body` and map HTTP failures onto `AiError`.
pub(crate) async fn post_json(
    http: &reqwest::Client,
    url: &str,
    api_key: &str,
    body: &serde_json::Value,
) -> Result<reqwest::Response, AiError> {
    let response = http
        .post(url)
        .header("content-type", "application/json")
        .header("x-goog-api-key", api_key)
        .json(body)
        .send()
        .await?;

    let status = response.status();
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(AiError::RateLimited);
    }
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        return Err(AiError::ApiError(format!("HTTP {status}: {text}")));
    }
    Ok(response)
}

fn wire_role(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Assistant => "model",
    }
}

pub(crate) fn content_json(content: &Content) -> serde_json::Value {
    serde_json::json!({
        "role": wire_role(content.role),
        "parts": content.parts,
    })
}

/// Request body for one chat turn: prior history, then the new user content.
pub(crate) fn build_chat_body(
    config: &GenerationConfig,
    history: &[Content],
    turn: &Content,
) -> serde_json::Value {
    let contents: Vec<_> = history
        .iter()
        .chain(std::iter::once(turn))
        .map(content_json)
        .collect();

    let mut body = serde_json::json!({
        "contents": contents,
        "systemInstruction": {
            "parts": [{ "text": config.system_instruction() }]
        },
        "generationConfig": {
            "temperature": config.temperature(),
            "maxOutputTokens": config.max_output_tokens(),
        }
    });

    if let Some(budget) = config.thinking_budget() {
        body["generationConfig"]["thinkingConfig"] = serde_json::json!({
            "thinkingBudget": budget
        });
    }

    body
}

/// Request body for a one-shot image generation call.
pub(crate) fn build_image_body(content: TurnContent) -> serde_json::Value {
    serde_json::json!({
        "contents": [{
            "role": "user",
            "parts": content.into_parts(),
        }],
        "generationConfig": {
            "responseModalities": ["TEXT", "IMAGE"]
        }
    })
}

/// Text and usage carried by one streamed event.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct StreamDelta {
    pub text: Option<String>,
    pub usage: Option<TokenUsage>,
}

/// Parse one SSE `data:` payload from `streamGenerateContent`.
///
/// Thought-summary parts are skipped. An `error` object in the payload
/// becomes `AiError::Streaming`.
pub(crate) fn parse_stream_event(data: &str) -> Result<StreamDelta, AiError> {
    let json: serde_json::Value =
        serde_json::from_str(data).map_err(|e| AiError::ParseError(e.to_string()))?;

    if let Some(err) = json.get("error") {
        let message = err["message"].as_str().unwrap_or("unknown error");
        return Err(AiError::Streaming(message.to_string()));
    }

    let mut text: Option<String> = None;
    if let Some(parts) = json["candidates"][0]["content"]["parts"].as_array() {
        for part in parts {
            if part["thought"].as_bool() == Some(true) {
                continue;
            }
            if let Some(t) = part["text"].as_str() {
                text.get_or_insert_with(String::new).push_str(t);
            }
        }
    }

    let usage = json.get("usageMetadata").map(|meta| TokenUsage {
        input_tokens: meta["promptTokenCount"].as_u64().unwrap_or(0),
        output_tokens: meta["candidatesTokenCount"].as_u64().unwrap_or(0)
            + meta["thoughtsTokenCount"].as_u64().unwrap_or(0),
    });

    Ok(StreamDelta { text, usage })
}
