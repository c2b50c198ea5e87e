//! `ModelProvider` / `ChatSession` implementations for Gemini.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use futures_util::StreamExt;
use lumen_common::Role;
use tracing::debug;

use crate::provider::{
    ChatSession, ChunkStream, Content, GenerateResponse, GenerationConfig, ModelProvider, Part,
    ResponseChunk, TurnContent,
};
use crate::streaming::response_events;
use crate::AiError;

use super::client::{build_chat_body, build_image_body, parse_stream_event, post_json, GeminiClient};

/// A client-side Gemini chat: generation settings plus the running history.
pub struct GeminiChat {
    client: GeminiClient,
    model: String,
    generation: GenerationConfig,
    history: Arc<Mutex<Vec<Content>>>,
}

fn lock(history: &Mutex<Vec<Content>>) -> MutexGuard<'_, Vec<Content>> {
    history.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl GeminiChat {
    /// Snapshot of the history this chat will send with its next turn.
    pub fn history(&self) -> Vec<Content> {
        lock(&self.history).clone()
    }
}

impl ChatSession for GeminiChat {
    fn stream_turn(&self, content: TurnContent) -> ChunkStream {
        let http = self.client.http.clone();
        let api_key = self.client.config.api_key.clone();
        let url = self.client.api_url(&self.model, true);
        let model = self.model.clone();
        let generation = self.generation.clone();
        let history = self.history.clone();

        Box::pin(async_stream::stream! {
            let user = Content {
                role: Role::User,
                parts: content.into_parts(),
            };
            let body = {
                let past = lock(&history);
                build_chat_body(&generation, &past, &user)
            };

            debug!(model = %model, "Gemini API streaming request");

            let response = match post_json(&http, &url, &api_key, &body).await {
                Ok(response) => response,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };

            let mut events = Box::pin(response_events(response));
            let mut reply = String::new();
            let mut usage = None;

            while let Some(event) = events.next().await {
                let delta = match event.and_then(|e| parse_stream_event(&e.data)) {
                    Ok(delta) => delta,
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                };
                // usageMetadata is cumulative; only the last report counts.
                if delta.usage.is_some() {
                    usage = delta.usage;
                }
                if let Some(text) = delta.text {
                    reply.push_str(&text);
                    yield Ok(ResponseChunk::text(text));
                }
            }

            if usage.is_some() {
                yield Ok(ResponseChunk { text: None, usage });
            }

            if !reply.is_empty() {
                let mut past = lock(&history);
                past.push(user);
                past.push(Content {
                    role: Role::Assistant,
                    parts: vec![Part::text(reply)],
                });
            }
        })
    }
}

#[async_trait]
impl ModelProvider for GeminiClient {
    fn create_session(
        &self,
        model_id: &str,
        config: GenerationConfig,
        history: Vec<Content>,
    ) -> Result<Arc<dyn ChatSession>, AiError> {
        debug!(model = %model_id, history = history.len(), "creating Gemini chat");
        Ok(Arc::new(GeminiChat {
            client: self.clone(),
            model: model_id.to_string(),
            generation: config,
            history: Arc::new(Mutex::new(history)),
        }))
    }

    async fn generate_once(
        &self,
        model_id: &str,
        content: TurnContent,
    ) -> Result<GenerateResponse, AiError> {
        let body = build_image_body(content);
        let url = self.api_url(model_id, false);

        debug!(model = %model_id, "Gemini API request");

        let response = post_json(&self.http, &url, &self.config.api_key, &body).await?;
        response
            .json::<GenerateResponse>()
            .await
            .map_err(|e| AiError::ParseError(e.to_string()))
    }
}
