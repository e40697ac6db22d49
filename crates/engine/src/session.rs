//! Generation session state.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Lifecycle of a generation session.
///
/// `Idle → Requesting → Streaming → {Completed | Aborted | Errored}`. The
/// service accepts a new `start` once the active session reaches a terminal
/// phase, or sooner by superseding it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Requesting,
    Streaming,
    Completed,
    Aborted,
    Errored,
}

impl SessionPhase {
    /// Whether the session has resolved.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Aborted | Self::Errored)
    }
}

/// How a resolved session ended, with the text it produced.
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub session_id: Uuid,
    pub phase: SessionPhase,
    pub text: String,
}

/// Cancellation handle for one in-flight session.
#[derive(Clone)]
pub(crate) struct SessionHandle {
    pub id: Uuid,
    pub cancel: CancellationToken,
    superseded: Arc<AtomicBool>,
}

impl SessionHandle {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            cancel: CancellationToken::new(),
            superseded: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Cancel this session because a newer one is taking its place.
    pub fn supersede(&self) {
        self.superseded.store(true, Ordering::SeqCst);
        self.cancel.cancel();
    }

    pub fn is_superseded(&self) -> bool {
        self.superseded.load(Ordering::SeqCst)
    }
}
