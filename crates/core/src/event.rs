//! Token events — the uniform output of the stream decoder.
//!
//! Whatever backend produced the stream, the decoder reduces it to this one
//! shape so downstream consumers never see provider-specific framing.

use serde::{Deserialize, Serialize};

/// One decoded event from a generation stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TokenEvent {
    /// A piece of generated text
    Token { text: String },

    /// The stream finished normally (terminator seen, end of stream,
    /// or cancellation)
    Complete,

    /// The stream failed; no further events follow
    Error { cause: String },
}

impl TokenEvent {
    /// Create a token event.
    pub fn token(text: impl Into<String>) -> Self {
        Self::Token { text: text.into() }
    }

    /// Create an error event.
    pub fn error(cause: impl Into<String>) -> Self {
        Self::Error {
            cause: cause.into(),
        }
    }

    /// Whether no further events can follow this one.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Error { .. })
    }
}
