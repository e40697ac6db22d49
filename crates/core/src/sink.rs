//! TokenSink trait — where generated text goes.
//!
//! The host hands the engine a sink; the engine calls it once per token and
//! once at the end with the full accumulated text, which is the host's cue to
//! persist a finished chat message or insert prose into the document.

use async_trait::async_trait;

/// Receives tokens as they stream and the final text on completion.
///
/// `on_complete` is invoked for normal completion and for cancellation; it is
/// **not** invoked when the session errors.
#[async_trait]
pub trait TokenSink: Send + Sync {
    /// Called once per emitted token.
    async fn on_token(&self, text: &str);

    /// Called once when the session resolves normally, with the accumulated
    /// text.
    async fn on_complete(&self, full_text: &str);
}
