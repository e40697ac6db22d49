//! OpenRouter provider — the aggregator hosted backend.
//!
//! Same streaming protocol as OpenAI, with a wider sampling surface:
//! `top_k`, `min_p`, and a native `repetition_penalty` all pass through when
//! configured. OpenRouter asks callers to identify themselves via the
//! `HTTP-Referer` and `X-Title` headers.

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use fablecraft_core::error::ProviderError;
use fablecraft_core::provider::{GenerationRequest, ModelInfo, Provider};

use crate::transport::spawn_passthrough;

pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

const REFERER: &str = "https://github.com/fablecraft-dev/fablecraft";
const TITLE: &str = "Fablecraft";

/// The OpenRouter streaming chat client.
pub struct OpenRouterProvider {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenRouterProvider {
    /// Create a provider against the public OpenRouter endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, OPENROUTER_BASE_URL)
    }

    /// Create a provider against a custom endpoint.
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        }
    }

    /// Build the chat-completions request body with OpenRouter's extended
    /// sampling surface. Disabled parameters are omitted entirely.
    fn build_request_body(request: &GenerationRequest) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": request.model,
            "messages": request.messages,
            "temperature": request.sampling.temperature,
            "max_tokens": request.sampling.max_tokens,
            "stream": true,
        });

        if let Some(top_p) = request.sampling.top_p {
            body["top_p"] = serde_json::json!(top_p);
        }
        if let Some(penalty) = request.sampling.repetition_penalty {
            body["repetition_penalty"] = serde_json::json!(penalty);
        }
        if let Some(top_k) = request.sampling.top_k {
            body["top_k"] = serde_json::json!(top_k);
        }
        if let Some(min_p) = request.sampling.min_p {
            body["min_p"] = serde_json::json!(min_p);
        }

        body
    }

    fn ensure_configured(&self) -> std::result::Result<(), ProviderError> {
        if self.api_key.trim().is_empty() {
            return Err(ProviderError::NotConfigured(
                "OpenRouter API key is not set".into(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl Provider for OpenRouterProvider {
    fn name(&self) -> &str {
        "openrouter"
    }

    async fn generate(
        &self,
        request: GenerationRequest,
        cancel: CancellationToken,
    ) -> std::result::Result<
        mpsc::Receiver<std::result::Result<String, ProviderError>>,
        ProviderError,
    > {
        self.ensure_configured()?;

        let url = format!("{}/chat/completions", self.base_url);
        let body = Self::build_request_body(&request);

        debug!(provider = "openrouter", model = %request.model, "Sending streaming request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .header("Accept", "text/event-stream")
            .header("HTTP-Referer", REFERER)
            .header("X-Title", TITLE)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status().as_u16();

        if status == 429 {
            return Err(ProviderError::RateLimited {
                retry_after_secs: 5,
            });
        }

        if status == 401 || status == 403 {
            return Err(ProviderError::AuthenticationFailed(
                "Invalid API key or insufficient permissions".into(),
            ));
        }

        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Provider streaming error");
            return Err(ProviderError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        Ok(spawn_passthrough(response, cancel, "openrouter"))
    }

    async fn list_models(&self) -> std::result::Result<Vec<ModelInfo>, ProviderError> {
        self.ensure_configured()?;

        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Ok(Vec::new());
        }

        let body: ModelListResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(body
            .data
            .into_iter()
            .map(|m| ModelInfo {
                name: m.name.unwrap_or_else(|| m.id.clone()),
                id: m.id,
                provider: "openrouter".into(),
                context_length: m.context_length,
            })
            .collect())
    }

    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        // The model catalog is public; reachability needs no key.
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(response.status().is_success())
    }
}

// --- Catalog types (internal) ---

#[derive(Debug, Deserialize)]
struct ModelListResponse {
    #[serde(default)]
    data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    context_length: Option<u32>,
}
