use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Model used for one-shot image generation turns.
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.0-flash-preview-image-generation";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One conversational message. Order within a [`History`] is significant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub text: String,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

pub type History = Vec<Message>;

/// Binary payload attached to a user turn. `data` is already base64-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub mime_type: String,
    pub data: String,
}

impl Attachment {
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }
}

/// Response tone selected by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Personality {
    Professional,
    Friendly,
    Creative,
    Humorous,
    Strict,
    #[default]
    None,
}

impl Personality {
    pub const ALL: [Personality; 6] = [
        Personality::Professional,
        Personality::Friendly,
        Personality::Creative,
        Personality::Humorous,
        Personality::Strict,
        Personality::None,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Personality::Professional => "professional",
            Personality::Friendly => "friendly",
            Personality::Creative => "creative",
            Personality::Humorous => "humorous",
            Personality::Strict => "strict",
            Personality::None => "none",
        }
    }
}

impl fmt::Display for Personality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Personality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Personality::ALL
            .into_iter()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| {
                format!(
                    "unknown personality '{s}' (expected one of: professional, friendly, \
                     creative, humorous, strict, none)"
                )
            })
    }
}

/// Settings a chat session is bound to. A session never outlives a change here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub model_id: String,
    pub personality: Personality,
    pub custom_instruction: Option<String>,
    pub temperature: f64,
    pub max_output_tokens: u32,
    pub extended_reasoning_enabled: bool,
    pub extended_reasoning_budget: Option<u32>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            model_id: DEFAULT_MODEL.to_string(),
            personality: Personality::None,
            custom_instruction: None,
            temperature: 0.7,
            max_output_tokens: 8192,
            extended_reasoning_enabled: false,
            extended_reasoning_budget: None,
        }
    }
}
