//! Provider-agnostic request/response types and the traits a remote
//! model backend implements.

use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::Stream;
use lumen_common::{Attachment, Role};
use serde::{Deserialize, Serialize};

use crate::{AiError, TokenUsage};

/// Base64 payload with its mime type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    /// Empty when the provider omitted it.
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub data: String,
}

/// One piece of request content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text { text: text.into() }
    }

    pub fn inline(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Part::InlineData {
            inline_data: InlineData {
                mime_type: mime_type.into(),
                data: data.into(),
            },
        }
    }
}

impl From<&Attachment> for Part {
    fn from(attachment: &Attachment) -> Self {
        Part::inline(attachment.mime_type.clone(), attachment.data.clone())
    }
}

/// One replayed history item: a role and its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Content {
    pub role: Role,
    pub parts: Vec<Part>,
}

/// What a single user turn sends. Decided once per turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnContent {
    /// Plain text with no attachments.
    TextOnly(String),
    /// Text followed by inline attachments, in order.
    MultiPart(Vec<Part>),
}

impl TurnContent {
    /// Text first, then one inline part per attachment. No attachments
    /// keeps the bare-text form.
    pub fn from_turn(text: &str, attachments: &[Attachment]) -> Self {
        if attachments.is_empty() {
            return TurnContent::TextOnly(text.to_string());
        }
        let mut parts = Vec::with_capacity(attachments.len() + 1);
        parts.push(Part::text(text));
        parts.extend(attachments.iter().map(Part::from));
        TurnContent::MultiPart(parts)
    }

    pub fn into_parts(self) -> Vec<Part> {
        match self {
            TurnContent::TextOnly(text) => vec![Part::Text { text }],
            TurnContent::MultiPart(parts) => parts,
        }
    }
}

/// Session-level generation settings handed to the provider.
///
/// Built through [`GenerationConfig::new`], which rejects values the
/// provider would refuse.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    system_instruction: String,
    temperature: f64,
    max_output_tokens: u32,
    thinking_budget: Option<u32>,
}

impl GenerationConfig {
    pub fn new(
        system_instruction: impl Into<String>,
        temperature: f64,
        max_output_tokens: u32,
    ) -> Result<Self, AiError> {
        if !(0.0..=2.0).contains(&temperature) {
            return Err(AiError::InvalidConfig(format!(
                "temperature {temperature} is outside [0.0, 2.0]"
            )));
        }
        if max_output_tokens == 0 {
            return Err(AiError::InvalidConfig(
                "max_output_tokens must be at least 1".into(),
            ));
        }
        Ok(Self {
            system_instruction: system_instruction.into(),
            temperature,
            max_output_tokens,
            thinking_budget: None,
        })
    }

    pub fn with_thinking_budget(mut self, budget: u32) -> Self {
        self.thinking_budget = Some(budget);
        self
    }

    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn max_output_tokens(&self) -> u32 {
        self.max_output_tokens
    }

    pub fn thinking_budget(&self) -> Option<u32> {
        self.thinking_budget
    }
}

/// One streamed piece of a conversational reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseChunk {
    /// `None` for metadata-only chunks.
    pub text: Option<String>,
    pub usage: Option<TokenUsage>,
}

impl ResponseChunk {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            usage: None,
        }
    }
}

/// Result of a one-shot `generate_once` call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

/// A response part. Either field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsePart {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub inline_data: Option<InlineData>,
}

impl GenerateResponse {
    /// Parts of the first candidate, or nothing.
    pub fn first_parts(&self) -> &[ResponsePart] {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.as_slice())
            .unwrap_or_default()
    }
}

pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<ResponseChunk, AiError>> + Send>>;

/// A provider-side conversation bound to one configuration and history.
pub trait ChatSession: Send + Sync {
    /// Send a user turn. Nothing is sent until the stream is polled;
    /// dropping the stream abandons the request.
    fn stream_turn(&self, content: TurnContent) -> ChunkStream;
}

/// Remote model backend.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Open a new chat session seeded with `history`.
    fn create_session(
        &self,
        model_id: &str,
        config: GenerationConfig,
        history: Vec<Content>,
    ) -> Result<Arc<dyn ChatSession>, AiError>;

    /// Single non-streaming generation call.
    async fn generate_once(
        &self,
        model_id: &str,
        content: TurnContent,
    ) -> Result<GenerateResponse, AiError>;
}
