//! Provider registry — selects the correct generation backend by name.
//!
//! Handles provider construction from configuration and lookup at request
//! time, so callers never hold concrete provider types.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use fablecraft_core::provider::Provider;

use crate::ollama::OllamaProvider;
use crate::openai::OpenAiProvider;
use crate::openrouter::OpenRouterProvider;

/// Routes generation requests to the correct provider.
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn Provider>>,
    default_provider: String,
}

impl ProviderRegistry {
    /// Create a new registry with a default provider name.
    pub fn new(default_provider: impl Into<String>) -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider.into(),
        }
    }

    /// Register a provider.
    pub fn register(&mut self, name: impl Into<String>, provider: Arc<dyn Provider>) {
        self.providers.insert(name.into(), provider);
    }

    /// Get the default provider.
    pub fn default(&self) -> Option<Arc<dyn Provider>> {
        self.providers.get(&self.default_provider).cloned()
    }

    /// Get a specific provider by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Provider>> {
        self.providers.get(name).cloned()
    }

    /// Resolve a provider by name, falling back to the default.
    pub fn resolve(&self, name: Option<&str>) -> Option<Arc<dyn Provider>> {
        match name {
            Some(name) => self.get(name),
            None => self.default(),
        }
    }

    /// List all registered provider names.
    pub fn list(&self) -> Vec<&str> {
        self.providers.keys().map(|s| s.as_str()).collect()
    }
}

/// Build providers from configuration.
pub fn build_from_config(config: &fablecraft_config::AppConfig) -> ProviderRegistry {
    let mut registry = ProviderRegistry::new(&config.default_provider);

    for (name, provider_config) in &config.providers {
        let api_key = provider_config
            .api_key
            .clone()
            .or_else(|| config.api_key.clone())
            .unwrap_or_default();

        match build_provider(name, &api_key, provider_config.api_url.as_deref()) {
            Some(provider) => registry.register(name.clone(), provider),
            None => warn!(provider = %name, "Unknown provider in config, skipping"),
        }
    }

    // The default provider is always available, even when not explicitly
    // configured.
    if registry.get(&config.default_provider).is_none() {
        let api_key = config.api_key.clone().unwrap_or_default();
        match build_provider(&config.default_provider, &api_key, None) {
            Some(provider) => registry.register(config.default_provider.clone(), provider),
            None => warn!(provider = %config.default_provider, "Unknown default provider"),
        }
    }

    registry
}

fn build_provider(name: &str, api_key: &str, api_url: Option<&str>) -> Option<Arc<dyn Provider>> {
    match name {
        "openai" => Some(match api_url {
            Some(url) => Arc::new(OpenAiProvider::with_base_url(api_key, url)),
            None => Arc::new(OpenAiProvider::new(api_key)),
        }),
        "openrouter" => Some(match api_url {
            Some(url) => Arc::new(OpenRouterProvider::with_base_url(api_key, url)),
            None => Arc::new(OpenRouterProvider::new(api_key)),
        }),
        "ollama" => Some(Arc::new(OllamaProvider::new(api_url))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_lookup() {
        let mut registry = ProviderRegistry::new("openrouter");
        let provider = Arc::new(OpenRouterProvider::new("sk-test"));
        registry.register("openrouter", provider);

        assert!(registry.get("openrouter").is_some());
        assert!(registry.get("nonexistent").is_none());
        assert!(registry.default().is_some());
    }

    #[test]
    fn resolve_falls_back_to_default() {
        let mut registry = ProviderRegistry::new("ollama");
        registry.register("ollama", Arc::new(OllamaProvider::new(None)));

        assert!(registry.resolve(None).is_some());
        assert!(registry.resolve(Some("ollama")).is_some());
        assert!(registry.resolve(Some("openai")).is_none());
    }

    #[test]
    fn build_from_default_config() {
        let config = fablecraft_config::AppConfig::default();
        let registry = build_from_config(&config);
        assert!(registry.default().is_some());
    }

    #[test]
    fn unknown_providers_are_skipped() {
        let mut config = fablecraft_config::AppConfig::default();
        config.providers.insert(
            "mystery".into(),
            fablecraft_config::ProviderConfig::default(),
        );
        let registry = build_from_config(&config);
        assert!(registry.get("mystery").is_none());
        assert!(registry.default().is_some());
    }
}
