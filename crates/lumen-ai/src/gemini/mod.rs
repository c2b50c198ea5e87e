//! Google Gemini API provider.
//!
//! Implements `ModelProvider` for Gemini models via the Generative
//! Language REST API. Chat sessions are kept client-side: each session
//! owns its history and resends it with every turn.

mod api;
mod client;
mod config;

pub use api::GeminiChat;
pub use client::GeminiClient;
pub use config::GeminiConfig;
