//! Session handles and concurrency guards.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures_util::stream;
use lumen_common::SessionId;

use crate::provider::{ChatSession, ChunkStream, TurnContent};
use crate::AiError;

/// A provider session plus the id it was created under.
///
/// Once the manager replaces it the handle is retired and refuses new
/// turns; a turn already streaming runs to completion.
#[derive(Clone)]
pub struct BoundSession {
    id: SessionId,
    handle: Arc<dyn ChatSession>,
    retired: Arc<AtomicBool>,
}

impl BoundSession {
    pub(super) fn new(handle: Arc<dyn ChatSession>) -> Self {
        Self {
            id: SessionId::new(),
            handle,
            retired: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn is_retired(&self) -> bool {
        self.retired.load(Ordering::Acquire)
    }

    pub(super) fn retire(&self) {
        self.retired.store(true, Ordering::Release);
    }

    pub fn stream_turn(&self, content: TurnContent) -> ChunkStream {
        if self.is_retired() {
            return Box::pin(stream::once(async { Err(AiError::SessionUnavailable) }));
        }
        self.handle.stream_turn(content)
    }
}

impl std::fmt::Debug for BoundSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundSession")
            .field("id", &self.id)
            .field("retired", &self.is_retired())
            .finish()
    }
}

/// Guard that clears the `busy` flag on drop, so a turn's stream releases
/// it whether it finishes, fails or is abandoned.
pub(crate) struct TurnGuard {
    flag: Arc<AtomicBool>,
}

impl TurnGuard {
    /// Attempt to claim the conversation. Returns `Err` if a turn is in flight.
    pub(crate) fn acquire(flag: &Arc<AtomicBool>) -> Result<Self, AiError> {
        if flag
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            return Err(AiError::Busy);
        }
        Ok(Self { flag: flag.clone() })
    }
}

impl Drop for TurnGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
