//! SessionManager: the replace-only slot holding the live session.

use std::sync::Arc;

use lumen_common::{Configuration, Message, SessionId};
use tracing::{info, warn};

use crate::instruction::{build_generation_config, history_to_contents};
use crate::provider::ModelProvider;
use crate::AiError;

use super::types::BoundSession;

/// Owns the one live chat session and the configuration it is bound to.
pub struct SessionManager {
    provider: Arc<dyn ModelProvider>,
    /// Last configuration supplied by the caller.
    config: Configuration,
    active: Option<BoundSession>,
}

impl SessionManager {
    /// Create a manager and open an empty-history session for `config`.
    pub fn new(provider: Arc<dyn ModelProvider>, config: Configuration) -> Result<Self, AiError> {
        let mut manager = Self {
            provider,
            config: config.clone(),
            active: None,
        };
        manager.start(config, &[])?;
        Ok(manager)
    }

    /// Replace the live session with a fresh one bound to `config` and
    /// seeded with `history`.
    ///
    /// An invalid configuration is rejected up front and leaves the current
    /// session untouched. Otherwise the previous session is retired before
    /// the new one is created, so a failed rebuild leaves the slot empty
    /// rather than stale.
    pub fn start(&mut self, config: Configuration, history: &[Message]) -> Result<(), AiError> {
        let generation = build_generation_config(&config)?;

        if let Some(old) = self.active.take() {
            old.retire();
        }
        self.config = config;

        let contents = history_to_contents(history);
        let handle = self
            .provider
            .create_session(&self.config.model_id, generation, contents)?;

        let session = BoundSession::new(handle);
        info!(
            session = %session.id(),
            model = %self.config.model_id,
            personality = %self.config.personality,
            history = history.len(),
            "chat session started"
        );
        self.active = Some(session);
        Ok(())
    }

    /// Configuration changes always rebuild; equal configs are not skipped.
    pub fn reconfigure(&mut self, config: Configuration, history: &[Message]) -> Result<(), AiError> {
        self.start(config, history)
    }

    /// The live session.
    pub fn current(&self) -> Result<BoundSession, AiError> {
        self.active.clone().ok_or(AiError::SessionUnavailable)
    }

    /// The live session, re-opening one with the last configuration and an
    /// empty history if the slot is empty.
    pub fn ensure_current(&mut self) -> Result<BoundSession, AiError> {
        if self.active.is_none() {
            warn!(model = %self.config.model_id, "no live session, re-initializing");
            self.start(self.config.clone(), &[])?;
        }
        self.current()
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn session_id(&self) -> Option<&SessionId> {
        self.active.as_ref().map(BoundSession::id)
    }
}
