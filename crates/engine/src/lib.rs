//! Generation orchestration for Fablecraft.
//!
//! Owns the session lifecycle: at most one in-flight generation at a time,
//! cancellable, with tokens streamed to a caller-supplied sink.

pub mod service;
pub mod session;

pub use service::{GenerationService, prepare_context};
pub use session::{GenerationOutcome, SessionPhase};
