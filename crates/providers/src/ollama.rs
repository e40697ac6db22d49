//! Ollama provider — the local backend.
//!
//! Ollama speaks its own NDJSON chat protocol, one JSON object per line with
//! a `done` flag instead of a terminator line. The reader task re-encodes
//! each object into the uniform `data: ...` framing so the stream decoder
//! never has to know which backend it is reading.
//!
//! No credentials are involved; reachability is the only requirement.

use async_trait::async_trait;
use futures::StreamExt;
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use fablecraft_core::error::ProviderError;
use fablecraft_core::provider::{GenerationRequest, ModelInfo, Provider};

pub const OLLAMA_BASE_URL: &str = "http://localhost:11434";

/// The Ollama streaming chat client.
pub struct OllamaProvider {
    base_url: String,
    client: reqwest::Client,
}

impl OllamaProvider {
    /// Create a provider against a local Ollama server.
    pub fn new(base_url: Option<&str>) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url
                .unwrap_or(OLLAMA_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            client,
        }
    }

    /// Build the native `/api/chat` request body.
    ///
    /// Sampling lives in the `options` object; disabled parameters are
    /// omitted entirely.
    fn build_request_body(request: &GenerationRequest) -> serde_json::Value {
        let mut options = serde_json::json!({
            "temperature": request.sampling.temperature,
            "num_predict": request.sampling.max_tokens,
        });

        if let Some(top_p) = request.sampling.top_p {
            options["top_p"] = serde_json::json!(top_p);
        }
        if let Some(top_k) = request.sampling.top_k {
            options["top_k"] = serde_json::json!(top_k);
        }
        if let Some(penalty) = request.sampling.repetition_penalty {
            options["repeat_penalty"] = serde_json::json!(penalty);
        }
        if let Some(min_p) = request.sampling.min_p {
            options["min_p"] = serde_json::json!(min_p);
        }

        serde_json::json!({
            "model": request.model,
            "messages": request.messages,
            "stream": true,
            "options": options,
        })
    }

    /// Re-encode one native chat object into a uniform wire line.
    fn encode_uniform(content: &str) -> String {
        format!(
            "data: {}\n",
            serde_json::json!({"choices": [{"delta": {"content": content}}]})
        )
    }

    fn ensure_configured(&self) -> std::result::Result<(), ProviderError> {
        if self.base_url.trim().is_empty() {
            return Err(ProviderError::NotConfigured(
                "Ollama URL is not set".into(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl Provider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
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

        let url = format!("{}/api/chat", self.base_url);
        let model = request.model.clone();
        let body = Self::build_request_body(&request);

        debug!(provider = "ollama", model = %model, "Sending streaming request");

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status().as_u16();

        if status == 404 {
            return Err(ProviderError::ModelNotFound(model));
        }

        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Provider streaming error");
            return Err(ProviderError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let (tx, rx) = mpsc::channel(64);

        // Read the NDJSON stream and re-encode into the uniform framing.
        tokio::spawn(async move {
            let mut byte_stream = response.bytes_stream();
            let mut buffer = String::new();

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        debug!(provider = "ollama", "Generation cancelled, dropping stream");
                        return;
                    }
                    next = byte_stream.next() => {
                        let bytes = match next {
                            None => return,
                            Some(Ok(bytes)) => bytes,
                            Some(Err(e)) => {
                                let _ = tx
                                    .send(Err(ProviderError::StreamInterrupted(e.to_string())))
                                    .await;
                                return;
                            }
                        };

                        buffer.push_str(&String::from_utf8_lossy(&bytes));

                        while let Some(line_end) = buffer.find('\n') {
                            let line: String = buffer.drain(..=line_end).collect();
                            let line = line.trim();
                            if line.is_empty() {
                                continue;
                            }

                            let chunk: ChatChunk = match serde_json::from_str(line) {
                                Ok(chunk) => chunk,
                                Err(e) => {
                                    trace!(line = %line, error = %e, "Ignoring unparseable chat line");
                                    continue;
                                }
                            };

                            if !chunk.message.content.is_empty() {
                                let encoded = OllamaProvider::encode_uniform(&chunk.message.content);
                                if tx.send(Ok(encoded)).await.is_err() {
                                    return;
                                }
                            }

                            if chunk.done {
                                let _ = tx.send(Ok("data: [DONE]\n".to_string())).await;
                                return;
                            }
                        }
                    }
                }
            }
        });

        Ok(rx)
    }

    async fn list_models(&self) -> std::result::Result<Vec<ModelInfo>, ProviderError> {
        self.ensure_configured()?;

        let url = format!("{}/api/tags", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Ok(Vec::new());
        }

        let body: TagsResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(body
            .models
            .into_iter()
            .map(|m| ModelInfo {
                id: m.name.clone(),
                name: m.name,
                provider: "ollama".into(),
                context_length: None,
            })
            .collect())
    }

    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(response.status().is_success())
    }
}

// --- Native wire types (internal) ---

#[derive(Debug, Deserialize)]
struct ChatChunk {
    #[serde(default)]
    message: ChatMessage,
    #[serde(default)]
    done: bool,
}

#[derive(Debug, Default, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagModel>,
}

#[derive(Debug, Deserialize)]
struct TagModel {
    name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::StreamDecoder;
    use fablecraft_core::TokenEvent;
    use fablecraft_core::prompt::{PromptMessage, SamplingParams};

    fn request(sampling: SamplingParams) -> GenerationRequest {
        GenerationRequest::new("llama3", vec![PromptMessage::user("hi")]).with_sampling(sampling)
    }

    #[test]
    fn body_uses_native_options_shape() {
        let body = OllamaProvider::build_request_body(&request(SamplingParams::default()));
        assert_eq!(body["model"], "llama3");
        assert_eq!(body["stream"], true);
        assert_eq!(body["options"]["num_predict"], 1024);
        assert!((body["options"]["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
        // The root carries no flattened sampling keys.
        assert!(body.get("temperature").is_none());
        assert!(body.get("max_tokens").is_none());
    }

    #[test]
    fn body_omits_disabled_options() {
        let body = OllamaProvider::build_request_body(&request(SamplingParams::default()));
        let options = &body["options"];
        assert!(options.get("top_p").is_none());
        assert!(options.get("top_k").is_none());
        assert!(options.get("repeat_penalty").is_none());
        assert!(options.get("min_p").is_none());
    }

    #[test]
    fn body_includes_configured_options() {
        let sampling = SamplingParams {
            top_p: Some(0.9),
            top_k: Some(50),
            repetition_penalty: Some(1.2),
            min_p: Some(0.1),
            ..Default::default()
        };
        let body = OllamaProvider::build_request_body(&request(sampling));
        let options = &body["options"];
        assert!((options["top_p"].as_f64().unwrap() - 0.9).abs() < 1e-6);
        assert_eq!(options["top_k"], 50);
        assert!((options["repeat_penalty"].as_f64().unwrap() - 1.2).abs() < 1e-6);
        assert!((options["min_p"].as_f64().unwrap() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn native_chunks_parse() {
        let line = r#"{"model":"llama3","message":{"role":"assistant","content":"Hello"},"done":false}"#;
        let chunk: ChatChunk = serde_json::from_str(line).unwrap();
        assert_eq!(chunk.message.content, "Hello");
        assert!(!chunk.done);

        let last = r#"{"model":"llama3","message":{"role":"assistant","content":""},"done":true}"#;
        let chunk: ChatChunk = serde_json::from_str(last).unwrap();
        assert!(chunk.done);
    }

    #[test]
    fn reencoded_lines_decode_like_any_other_backend() {
        // The uniform framing round-trips through the shared decoder,
        // including content that needs JSON escaping.
        let mut decoder = StreamDecoder::new();

        let events = decoder.feed(&OllamaProvider::encode_uniform("He said \"run\"\nand ran."));
        assert_eq!(events, vec![TokenEvent::token("He said \"run\"\nand ran.")]);

        let done = decoder.feed("data: [DONE]\n");
        assert_eq!(done, vec![TokenEvent::Complete]);
    }

    #[test]
    fn default_base_url_is_local() {
        let provider = OllamaProvider::new(None);
        assert_eq!(provider.base_url, "http://localhost:11434");
    }
}
