//! # Fablecraft Core
//!
//! Domain types, traits, and error definitions for the Fablecraft generation
//! engine. This crate has **zero framework dependencies** — it defines the
//! domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every subsystem is defined as a trait here. Implementations live in their
//! respective crates. This enables:
//! - Swapping LLM backends via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod context;
pub mod entry;
pub mod error;
pub mod event;
pub mod prompt;
pub mod provider;
pub mod sink;
pub mod store;

// Re-export key types at crate root for ergonomics
pub use context::{PromptContext, SceneBeatContext};
pub use entry::{EntryCategory, EntryImportance, EntryLevel, EntryStatus, LorebookEntry};
pub use error::{Error, ProviderError, Result, StoreError};
pub use event::TokenEvent;
pub use prompt::{MessageRole, Prompt, PromptMessage, SamplingParams};
pub use provider::{GenerationRequest, ModelInfo, Provider};
pub use sink::TokenSink;
pub use store::{Chapter, StaticStore, StoryStore};
