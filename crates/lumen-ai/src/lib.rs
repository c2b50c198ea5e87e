//! Conversation orchestration core for Lumen.
//!
//! Provides:
//! - `SessionManager`: one live provider session, rebuilt on every
//!   configuration change with the prior history replayed
//! - `TurnDispatcher`: turns user input (text + attachments) into a lazy
//!   stream of response fragments, intercepting image-generation requests
//! - `ModelProvider` / `ChatSession`: the seam to the remote model
//! - A Gemini REST implementation of that seam with SSE streaming
//! - Token usage tracking

pub mod dispatcher;
pub mod gemini;
pub mod instruction;
pub mod provider;
pub mod session;
pub mod streaming;
pub mod token_tracker;

#[cfg(test)]
pub(crate) mod testing;

pub use dispatcher::{FragmentStream, TurnDispatcher};
pub use gemini::{GeminiClient, GeminiConfig};
pub use provider::{ChatSession, ModelProvider};
pub use session::SessionManager;
pub use token_tracker::TokenTracker;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    pub fn total_tokens(&self) -> u64 {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("API error: {0}")]
    ApiError(String),
    #[error("Rate limited")]
    RateLimited,
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Timeout")]
    Timeout,
    #[error("No live chat session")]
    SessionUnavailable,
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Another turn is still in progress")]
    Busy,
    #[error("Stream error: {0}")]
    Streaming(String),
}

impl From<reqwest::Error> for AiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AiError::Timeout
        } else {
            AiError::NetworkError(e.to_string())
        }
    }
}
