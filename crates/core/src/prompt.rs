//! Prompt template domain types.
//!
//! A `Prompt` is an ordered list of role-tagged messages whose content may
//! contain `{{resolver}}` placeholders, plus the sampling parameters to send
//! with the request. The context assembler expands the placeholders; the
//! provider layer serializes the sampling parameters.

use serde::{Deserialize, Deserializer, Serialize};

/// The role of a prompt message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl MessageRole {
    /// Wire name as OpenAI-style backends expect it.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }

    /// Capitalized label for plain-text transcripts.
    pub fn label(&self) -> &'static str {
        match self {
            Self::System => "System",
            Self::User => "User",
            Self::Assistant => "Assistant",
        }
    }
}

/// A single message in a prompt template or chat history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptMessage {
    /// Who speaks this message
    pub role: MessageRole,

    /// Text content, possibly containing `{{placeholder}}` variables
    pub content: String,
}

impl PromptMessage {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Generation-time sampling controls.
///
/// `temperature` and `max_tokens` are always sent. The remaining parameters
/// are optional: `None` means "disabled, omit from the request body". Legacy
/// snapshots encoded "disabled" as the literal `0`; deserialization normalizes
/// that sentinel to `None` so the rest of the system sees one representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingParams {
    /// Randomness (0.0 = deterministic)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Nucleus sampling cutoff
    #[serde(default, deserialize_with = "zero_as_none_f32")]
    pub top_p: Option<f32>,

    /// Top-k sampling cutoff (not supported by every backend)
    #[serde(default, deserialize_with = "zero_as_none_u32")]
    pub top_k: Option<u32>,

    /// Repetition penalty (maps to `frequency_penalty` on OpenAI)
    #[serde(default, deserialize_with = "zero_as_none_f32")]
    pub repetition_penalty: Option<f32>,

    /// Minimum probability cutoff (not supported by every backend)
    #[serde(default, deserialize_with = "zero_as_none_f32")]
    pub min_p: Option<f32>,
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    1024
}

fn zero_as_none_f32<'de, D>(deserializer: D) -> Result<Option<f32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<f32>::deserialize(deserializer)?;
    Ok(value.filter(|v| *v != 0.0))
}

fn zero_as_none_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<u32>::deserialize(deserializer)?;
    Ok(value.filter(|v| *v != 0))
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            top_p: None,
            top_k: None,
            repetition_penalty: None,
            min_p: None,
        }
    }
}

/// An ordered prompt template plus its generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prompt {
    /// Ordered messages, expanded in place by the assembler
    pub messages: Vec<PromptMessage>,

    /// Model ids this prompt is written for (empty = any model)
    #[serde(default)]
    pub allowed_models: Vec<String>,

    /// Sampling parameters for the request
    #[serde(default)]
    pub sampling: SamplingParams,
}

impl Prompt {
    /// Create a prompt from an ordered message list.
    pub fn new(messages: Vec<PromptMessage>) -> Self {
        Self {
            messages,
            allowed_models: Vec::new(),
            sampling: SamplingParams::default(),
        }
    }

    /// Restrict the prompt to specific model ids.
    pub fn with_models(mut self, models: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.allowed_models = models.into_iter().map(Into::into).collect();
        self
    }

    /// Set the sampling parameters.
    pub fn with_sampling(mut self, sampling: SamplingParams) -> Self {
        self.sampling = sampling;
        self
    }

    /// Whether this prompt permits the given model (empty list permits all).
    pub fn allows(&self, model: &str) -> bool {
        self.allowed_models.is_empty() || self.allowed_models.iter().any(|m| m == model)
    }
}
