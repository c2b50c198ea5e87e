//! Scriptable in-memory `ModelProvider` for unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures_util::stream;

use crate::provider::{
    ChatSession, ChunkStream, Content, GenerateResponse, GenerationConfig, ModelProvider,
    ResponseChunk, TurnContent,
};
use crate::AiError;

#[derive(Debug, Clone)]
pub(crate) struct CreatedSession {
    pub model_id: String,
    pub config: GenerationConfig,
    pub history: Vec<Content>,
}

type Script = Vec<Result<ResponseChunk, AiError>>;

#[derive(Default)]
struct FakeState {
    created: Mutex<Vec<CreatedSession>>,
    /// (session index, payload) per submitted turn.
    turns: Mutex<Vec<(usize, TurnContent)>>,
    scripts: Mutex<VecDeque<Script>>,
    image_calls: Mutex<Vec<(String, TurnContent)>>,
    image_reply: Mutex<Option<Result<GenerateResponse, AiError>>>,
    fail_create: AtomicBool,
}

#[derive(Clone, Default)]
pub(crate) struct FakeProvider {
    state: Arc<FakeState>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the chunks the next conversational turn will stream.
    pub fn push_turn(&self, script: Script) {
        self.state.scripts.lock().unwrap().push_back(script);
    }

    pub fn push_text_turn(&self, chunks: &[&str]) {
        self.push_turn(chunks.iter().map(|c| Ok(ResponseChunk::text(*c))).collect());
    }

    pub fn set_image_reply(&self, reply: Result<GenerateResponse, AiError>) {
        *self.state.image_reply.lock().unwrap() = Some(reply);
    }

    pub fn fail_next_create(&self, fail: bool) {
        self.state.fail_create.store(fail, Ordering::SeqCst);
    }

    pub fn created(&self) -> Vec<CreatedSession> {
        self.state.created.lock().unwrap().clone()
    }

    pub fn turns(&self) -> Vec<(usize, TurnContent)> {
        self.state.turns.lock().unwrap().clone()
    }

    pub fn image_calls(&self) -> Vec<(String, TurnContent)> {
        self.state.image_calls.lock().unwrap().clone()
    }
}

struct FakeSession {
    index: usize,
    state: Arc<FakeState>,
}

impl ChatSession for FakeSession {
    fn stream_turn(&self, content: TurnContent) -> ChunkStream {
        self.state
            .turns
            .lock()
            .unwrap()
            .push((self.index, content));
        let script = self
            .state
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default();
        Box::pin(stream::iter(script))
    }
}

#[async_trait]
impl ModelProvider for FakeProvider {
    fn create_session(
        &self,
        model_id: &str,
        config: GenerationConfig,
        history: Vec<Content>,
    ) -> Result<Arc<dyn ChatSession>, AiError> {
        if self.state.fail_create.swap(false, Ordering::SeqCst) {
            return Err(AiError::NetworkError("create failed".into()));
        }
        let mut created = self.state.created.lock().unwrap();
        created.push(CreatedSession {
            model_id: model_id.to_string(),
            config,
            history,
        });
        Ok(Arc::new(FakeSession {
            index: created.len() - 1,
            state: self.state.clone(),
        }))
    }

    async fn generate_once(
        &self,
        model_id: &str,
        content: TurnContent,
    ) -> Result<GenerateResponse, AiError> {
        self.state
            .image_calls
            .lock()
            .unwrap()
            .push((model_id.to_string(), content));
        self.state
            .image_reply
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Ok(GenerateResponse::default()))
    }
}
