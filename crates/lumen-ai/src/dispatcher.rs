//! Turn dispatch: routes a user turn to the image one-shot path or the
//! live chat session and exposes the reply as a fragment stream.

use std::pin::Pin;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use futures_util::{stream, Stream, StreamExt};
use lumen_common::{Attachment, Configuration, Message};
use tracing::{debug, error, warn};

use crate::provider::{GenerateResponse, ModelProvider, TurnContent};
use crate::session::{SessionManager, TurnGuard};
use crate::token_tracker::TokenTracker;
use crate::AiError;

/// Lower-cased prefix that sends a turn down the image path.
pub const IMAGE_PREFIX: &str = "generate an image";

pub use lumen_common::types::DEFAULT_IMAGE_MODEL;

/// Emitted when the image model returned neither text nor image data.
pub const IMAGE_FALLBACK_MESSAGE: &str =
    "Sorry, I wasn't able to generate an image for that request. Please try rephrasing it.";

/// Emitted when the image generation call itself failed.
pub const IMAGE_ERROR_MESSAGE: &str =
    "Sorry, I encountered an error while trying to generate that image. Please try again.";

/// Ordered assistant output for one turn. Ends after the last fragment or
/// the first error.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, AiError>> + Send>>;

/// True when `text` should bypass the chat session and go to the image model.
pub fn is_image_request(text: &str) -> bool {
    text.trim().to_lowercase().starts_with(IMAGE_PREFIX)
}

/// Flatten an image response into one Markdown string: text verbatim,
/// each image as an inline data URI.
pub fn render_image_response(response: &GenerateResponse) -> String {
    let mut out = String::new();
    for part in response.first_parts() {
        if let Some(text) = &part.text {
            out.push_str(text);
        }
        if let Some(inline) = part.inline_data.as_ref().filter(|i| !i.data.is_empty()) {
            let mime = if inline.mime_type.is_empty() {
                "image/png"
            } else {
                inline.mime_type.as_str()
            };
            out.push_str(&format!(
                "\n\n![Generated Image](data:{mime};base64,{})\n\n",
                inline.data
            ));
        }
    }
    if out.is_empty() {
        IMAGE_FALLBACK_MESSAGE.to_string()
    } else {
        out
    }
}

async fn generate_image(provider: &dyn ModelProvider, model: &str, prompt: String) -> String {
    match provider
        .generate_once(model, TurnContent::TextOnly(prompt))
        .await
    {
        Ok(response) => {
            if response.first_parts().is_empty() {
                warn!(model = %model, "image response had no content parts");
            }
            render_image_response(&response)
        }
        Err(e) => {
            warn!(model = %model, error = %e, "image generation failed");
            IMAGE_ERROR_MESSAGE.to_string()
        }
    }
}

fn single(item: Result<String, AiError>) -> FragmentStream {
    Box::pin(stream::once(async move { item }))
}

/// Entry point for the surrounding application: `dispatch` a turn,
/// `reconfigure` the session.
pub struct TurnDispatcher {
    sessions: SessionManager,
    provider: Arc<dyn ModelProvider>,
    image_model: String,
    busy: Arc<AtomicBool>,
    tracker: Arc<Mutex<TokenTracker>>,
}

impl TurnDispatcher {
    pub fn new(provider: Arc<dyn ModelProvider>, config: Configuration) -> Result<Self, AiError> {
        let sessions = SessionManager::new(provider.clone(), config)?;
        Ok(Self {
            sessions,
            provider,
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            busy: Arc::new(AtomicBool::new(false)),
            tracker: Arc::new(Mutex::new(TokenTracker::new())),
        })
    }

    pub fn with_image_model(mut self, model: impl Into<String>) -> Self {
        self.image_model = model.into();
        self
    }

    /// Rebuild the session for `config`, replaying `history`.
    pub fn reconfigure(&mut self, config: Configuration, history: &[Message]) -> Result<(), AiError> {
        self.sessions.reconfigure(config, history)
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn image_model(&self) -> &str {
        &self.image_model
    }

    /// Snapshot of token usage recorded so far.
    pub fn usage(&self) -> TokenTracker {
        self.tracker
            .lock()
            .map(|t| t.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Submit a user turn.
    ///
    /// Image requests resolve with exactly one fragment and never fail.
    /// Conversational turns forward each non-empty upstream fragment and
    /// end with the upstream error if one occurs. While the returned
    /// stream is alive any further `dispatch` yields a single
    /// [`AiError::Busy`].
    pub fn dispatch(&mut self, text: &str, attachments: &[Attachment]) -> FragmentStream {
        let guard = match TurnGuard::acquire(&self.busy) {
            Ok(guard) => guard,
            Err(e) => return single(Err(e)),
        };

        if is_image_request(text) {
            if !attachments.is_empty() {
                debug!(
                    attachments = attachments.len(),
                    "ignoring attachments on image request"
                );
            }
            let provider = self.provider.clone();
            let model = self.image_model.clone();
            let prompt = text.to_string();
            return Box::pin(async_stream::stream! {
                let _guard = guard;
                let reply = generate_image(provider.as_ref(), &model, prompt).await;
                yield Ok::<_, AiError>(reply);
            });
        }

        let session = match self.sessions.ensure_current() {
            Ok(session) => session,
            Err(e) => return single(Err(e)),
        };
        let content = TurnContent::from_turn(text, attachments);
        let model = self.sessions.config().model_id.clone();
        let tracker = self.tracker.clone();
        debug!(
            session = %session.id(),
            attachments = attachments.len(),
            "dispatching conversational turn"
        );

        Box::pin(async_stream::stream! {
            let _guard = guard;
            let mut upstream = session.stream_turn(content);
            while let Some(item) = upstream.next().await {
                match item {
                    Ok(chunk) => {
                        if let Some(usage) = chunk.usage {
                            if let Ok(mut tracker) = tracker.lock() {
                                tracker.record(&model, &usage);
                            }
                        }
                        if let Some(text) = chunk.text.filter(|t| !t.is_empty()) {
                            yield Ok::<_, AiError>(text);
                        }
                    }
                    Err(e) => {
                        error!(session = %session.id(), error = %e, "streaming turn failed");
                        yield Err(e);
                        break;
                    }
                }
            }
        })
    }
}
