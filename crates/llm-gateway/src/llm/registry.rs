//! Provider registry: the static provider → endpoint/adapter mapping.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::gemini::GeminiAdapter;
use super::openai::OpenAICompatibleAdapter;
use super::provider::{Adapter, Provider};
use crate::config::{GatewayConfig, ProviderConfig, ProvidersConfig};

/// A provider's endpoint configuration paired with its adapter.
#[derive(Clone)]
pub struct RegisteredProvider {
    pub config: ProviderConfig,
    pub adapter: Arc<dyn Adapter>,
}

/// Registry of adapters, keyed by provider. Read-only once built.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<Provider, RegisteredProvider>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register all four providers from configuration.
    pub fn from_config(providers: &ProvidersConfig, gateway: &GatewayConfig) -> Self {
        let mut registry = Self::new();

        registry.register(
            Provider::Groq,
            providers.groq.clone(),
            Arc::new(OpenAICompatibleAdapter::new()),
        );
        registry.register(
            Provider::OpenAI,
            providers.openai.clone(),
            Arc::new(OpenAICompatibleAdapter::new()),
        );
        registry.register(
            Provider::OpenRouter,
            providers.openrouter.clone(),
            Arc::new(OpenAICompatibleAdapter::openrouter(
                gateway.openrouter_referer.clone(),
                gateway.openrouter_title.clone(),
            )),
        );
        registry.register(
            Provider::Gemini,
            providers.gemini.clone(),
            Arc::new(GeminiAdapter::new()),
        );

        registry
    }

    /// Register a provider implementation.
    pub fn register(
        &mut self,
        provider: Provider,
        config: ProviderConfig,
        adapter: Arc<dyn Adapter>,
    ) {
        debug!(%provider, base_url = %config.base_url, "Registered provider");
        self.providers
            .insert(provider, RegisteredProvider { config, adapter });
    }

    /// Get a provider by type.
    pub fn get(&self, provider: Provider) -> Option<&RegisteredProvider> {
        self.providers.get(&provider)
    }
}
