//! Generation backends for Fablecraft.
//!
//! All providers implement the `fablecraft_core::Provider` trait and emit the
//! same uniform wire framing, decoded by `StreamDecoder`. The registry
//! selects the correct provider based on configuration.

pub mod decoder;
pub mod ollama;
pub mod openai;
pub mod openrouter;
pub mod registry;
mod transport;

pub use decoder::StreamDecoder;
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;
pub use openrouter::OpenRouterProvider;
pub use registry::{ProviderRegistry, build_from_config};
