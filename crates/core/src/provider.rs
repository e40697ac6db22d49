//! Provider trait — the abstraction over LLM backends.
//!
//! A Provider knows how to send an assembled prompt to an LLM backend and
//! return the response as a stream of raw wire-text chunks. The chunks use
//! one uniform framing regardless of backend (see the stream decoder), so
//! everything downstream of the provider is backend-agnostic.
//!
//! Implementations: OpenAI, OpenRouter, Ollama.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::ProviderError;
use crate::prompt::{PromptMessage, SamplingParams};

/// A fully assembled, provider-agnostic generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// The model to use (e.g. "gpt-4o", "llama3")
    pub model: String,

    /// The expanded message list, placeholders already substituted
    pub messages: Vec<PromptMessage>,

    /// Sampling parameters; `None` fields are omitted from the wire body
    #[serde(default)]
    pub sampling: SamplingParams,
}

impl GenerationRequest {
    /// Create a request with default sampling.
    pub fn new(model: impl Into<String>, messages: Vec<PromptMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            sampling: SamplingParams::default(),
        }
    }

    /// Set the sampling parameters.
    pub fn with_sampling(mut self, sampling: SamplingParams) -> Self {
        self.sampling = sampling;
        self
    }
}

/// A model listing entry, normalized across backends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Backend-native model id, used in requests
    pub id: String,

    /// Display name
    pub name: String,

    /// Which provider reported this model
    pub provider: String,

    /// Context window size, when the catalog reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_length: Option<u32>,
}

/// The core Provider trait.
///
/// Every LLM backend implements this trait. The generation engine calls
/// `generate()` without knowing which backend is behind it.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A short name for this provider (e.g. "openai", "ollama").
    fn name(&self) -> &str;

    /// Issue a streaming generation call.
    ///
    /// The receiver yields raw wire-text chunks in the uniform `data: ...`
    /// framing; chunk boundaries carry no meaning (a logical line may span
    /// two chunks). Cancelling `cancel` stops the transfer and closes the
    /// channel without an error. Must fail fast with
    /// [`ProviderError::NotConfigured`] before any network call when required
    /// credentials are missing.
    async fn generate(
        &self,
        request: GenerationRequest,
        cancel: CancellationToken,
    ) -> std::result::Result<
        mpsc::Receiver<std::result::Result<String, ProviderError>>,
        ProviderError,
    >;

    /// List the models this provider can serve.
    async fn list_models(&self) -> std::result::Result<Vec<ModelInfo>, ProviderError> {
        Ok(Vec::new())
    }

    /// Health check — can we reach the backend?
    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        Ok(true)
    }
}
