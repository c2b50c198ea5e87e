//! Tests for command parsing and client-side history bookkeeping.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures_util::stream;
use lumen_ai::provider::{
    ChatSession, ChunkStream, Content, GenerateResponse, GenerationConfig, ModelProvider,
    ResponseChunk, TurnContent,
};
use lumen_ai::AiError;

use super::*;

#[test]
fn plain_text_is_not_a_command() {
    assert!(parse_command("hello there").is_none());
    assert!(parse_command("  what is 2/3?").is_none());
}

#[test]
fn parses_commands() {
    assert_eq!(
        parse_command("/attach ./cat.png").unwrap().unwrap(),
        Command::Attach(PathBuf::from("./cat.png"))
    );
    assert_eq!(
        parse_command("/personality Strict").unwrap().unwrap(),
        Command::Personality(Personality::Strict)
    );
    assert_eq!(
        parse_command("/temperature 0.3").unwrap().unwrap(),
        Command::Temperature(0.3)
    );
    assert_eq!(
        parse_command("/reasoning 2048").unwrap().unwrap(),
        Command::Reasoning(Some(2048))
    );
    assert_eq!(
        parse_command("/reasoning OFF").unwrap().unwrap(),
        Command::Reasoning(None)
    );
    assert_eq!(
        parse_command("/instruction Answer in haiku.").unwrap().unwrap(),
        Command::Instruction(Some("Answer in haiku.".into()))
    );
    assert_eq!(
        parse_command("/instruction").unwrap().unwrap(),
        Command::Instruction(None)
    );
    assert_eq!(parse_command("/quit").unwrap().unwrap(), Command::Quit);
    assert_eq!(parse_command("/exit").unwrap().unwrap(), Command::Quit);
}

#[test]
fn rejects_bad_commands() {
    assert!(parse_command("/attach").unwrap().is_err());
    assert!(parse_command("/temperature warm").unwrap().is_err());
    assert!(parse_command("/personality grumpy").unwrap().is_err());
    assert!(parse_command("/frobnicate").unwrap().is_err());
}

/// Replies with a fixed script per turn and records created sessions.
#[derive(Default)]
struct ScriptedProvider {
    replies: Arc<Mutex<VecDeque<Vec<Result<ResponseChunk, AiError>>>>>,
    created: Arc<Mutex<Vec<(GenerationConfig, Vec<Content>)>>>,
}

struct ScriptedSession {
    replies: Arc<Mutex<VecDeque<Vec<Result<ResponseChunk, AiError>>>>>,
}

impl ChatSession for ScriptedSession {
    fn stream_turn(&self, _content: TurnContent) -> ChunkStream {
        let script = self.replies.lock().unwrap().pop_front().unwrap_or_default();
        Box::pin(stream::iter(script))
    }
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    fn create_session(
        &self,
        _model_id: &str,
        config: GenerationConfig,
        history: Vec<Content>,
    ) -> Result<Arc<dyn ChatSession>, AiError> {
        self.created.lock().unwrap().push((config, history));
        Ok(Arc::new(ScriptedSession {
            replies: self.replies.clone(),
        }))
    }

    async fn generate_once(
        &self,
        _model_id: &str,
        _content: TurnContent,
    ) -> Result<GenerateResponse, AiError> {
        Ok(GenerateResponse::default())
    }
}

fn chat_loop() -> (Arc<ScriptedProvider>, ChatLoop) {
    let provider = Arc::new(ScriptedProvider::default());
    let dispatcher = TurnDispatcher::new(provider.clone(), Configuration::default()).unwrap();
    (provider, ChatLoop::new(dispatcher))
}

fn push_reply(provider: &ScriptedProvider, script: Vec<Result<ResponseChunk, AiError>>) {
    provider.replies.lock().unwrap().push_back(script);
}

#[tokio::test]
async fn completed_turns_are_recorded_and_replayed() {
    let (provider, mut chat) = chat_loop();
    push_reply(
        &provider,
        vec![Ok(ResponseChunk::text("Hi ")), Ok(ResponseChunk::text("Ada"))],
    );
    let mut out = Vec::new();

    chat.handle_line("I am Ada", &mut out).await.unwrap();
    assert_eq!(
        chat.history(),
        &[Message::user("I am Ada"), Message::assistant("Hi Ada")]
    );

    chat.handle_line("/personality friendly", &mut out)
        .await
        .unwrap();
    let created = provider.created.lock().unwrap().clone();
    assert_eq!(created.len(), 2);
    assert_eq!(created[1].1.len(), 2);

    let printed = String::from_utf8(out).unwrap();
    assert!(printed.contains("Hi Ada"));
    assert!(printed.contains("session rebuilt"));
}

#[tokio::test]
async fn failed_turn_leaves_history_unchanged() {
    let (provider, mut chat) = chat_loop();
    push_reply(
        &provider,
        vec![
            Ok(ResponseChunk::text("par")),
            Err(AiError::NetworkError("reset".into())),
        ],
    );
    let mut out = Vec::new();

    chat.handle_line("hello", &mut out).await.unwrap();

    assert!(chat.history().is_empty());
    let printed = String::from_utf8(out).unwrap();
    assert!(printed.contains("par"));
    assert!(printed.contains("Send your message again to retry"));
}

#[tokio::test]
async fn reply_without_text_is_not_replayed() {
    let (provider, mut chat) = chat_loop();
    push_reply(&provider, vec![Ok(ResponseChunk::default())]);
    let mut out = Vec::new();

    chat.handle_line("say something risky", &mut out)
        .await
        .unwrap();
    assert!(chat.history().is_empty());

    chat.handle_line("/personality friendly", &mut out)
        .await
        .unwrap();
    let created = provider.created.lock().unwrap().clone();
    assert_eq!(created.len(), 2);
    assert!(created[1].1.is_empty());
}

#[tokio::test]
async fn image_turns_are_not_replayed() {
    let (_provider, mut chat) = chat_loop();
    let mut out = Vec::new();

    chat.handle_line("Generate an image of a fox", &mut out)
        .await
        .unwrap();

    assert!(chat.history().is_empty());
    let printed = String::from_utf8(out).unwrap();
    assert!(printed.contains(lumen_ai::dispatcher::IMAGE_FALLBACK_MESSAGE));
}

#[tokio::test]
async fn invalid_setting_is_reported_and_session_kept() {
    let (provider, mut chat) = chat_loop();
    let mut out = Vec::new();

    chat.handle_line("/temperature 9", &mut out).await.unwrap();

    assert_eq!(provider.created.lock().unwrap().len(), 1);
    let printed = String::from_utf8(out).unwrap();
    assert!(printed.contains("could not apply setting"));
}

#[tokio::test]
async fn quit_ends_the_loop() {
    let (_provider, mut chat) = chat_loop();
    let mut out = Vec::new();
    assert_eq!(chat.handle_line("/quit", &mut out).await.unwrap(), Flow::Quit);
    assert_eq!(chat.handle_line("   ", &mut out).await.unwrap(), Flow::Continue);
}
