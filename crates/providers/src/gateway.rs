//! Model gateway — provider selection, fallback, and graceful degradation.
//!
//! The gateway owns every configured provider adapter and is the single
//! entry point the reasoning loop uses for text generation. It never
//! returns an error: a backend failure degrades to a fallback attempt on
//! the primary provider, and total failure degrades to an error message in
//! the response text so the conversation can still complete.

use reagent_config::AppConfig;
use reagent_core::Provider;
use reagent_core::error::ProviderError;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::kind::{DEFAULT_PRIORITY, ProviderKind};
use crate::{AnthropicProvider, GenerationOptions, OllamaProvider, OpenAiCompatProvider};

/// Fixed reply when no provider is configured at all.
const NOT_CONFIGURED_TEXT: &str = "No language model providers are configured. \
Set OPENAI_API_KEY, ANTHROPIC_API_KEY, GROQ_API_KEY, TOGETHER_API_KEY, or \
OLLAMA_BASE_URL to enable generation.";

/// The model gateway.
///
/// Providers are kept in priority order; the first entry is the primary.
/// Requests may name a specific provider; anything else goes to the primary.
pub struct ModelGateway {
    providers: Vec<(ProviderKind, Arc<dyn Provider>)>,
}

impl ModelGateway {
    /// Create a gateway over an ordered provider list. The first entry is
    /// the primary.
    pub fn new(providers: Vec<(ProviderKind, Arc<dyn Provider>)>) -> Self {
        if let Some((primary, _)) = providers.first() {
            info!(primary = %primary, count = providers.len(), "Model gateway ready");
        } else {
            warn!("Model gateway ready with zero providers");
        }
        Self { providers }
    }

    /// Build a gateway from configuration.
    ///
    /// Walks the priority order (explicit `provider_priority`, else the
    /// built-in default) and instantiates an adapter for each provider that
    /// has credentials. Hosted providers need an API key; Ollama needs a
    /// base URL.
    pub fn from_config(config: &AppConfig) -> Result<Self, ProviderError> {
        let options = GenerationOptions::from(&config.generation);
        let connect = Duration::from_secs(config.agent.connect_timeout_secs);
        let hosted = Duration::from_secs(config.agent.hosted_timeout_secs);
        let local = Duration::from_secs(config.agent.ollama_timeout_secs);

        let priority: Vec<ProviderKind> = if config.provider_priority.is_empty() {
            DEFAULT_PRIORITY.to_vec()
        } else {
            config
                .provider_priority
                .iter()
                .filter_map(|name| match name.parse() {
                    Ok(kind) => Some(kind),
                    Err(_) => {
                        warn!(provider = %name, "Ignoring unknown provider in priority list");
                        None
                    }
                })
                .collect()
        };

        let mut providers: Vec<(ProviderKind, Arc<dyn Provider>)> = Vec::new();

        for kind in priority {
            let p = &config.providers;
            let adapter: Option<Arc<dyn Provider>> = match kind {
                ProviderKind::OpenAi if p.openai.has_api_key() => {
                    Some(Arc::new(OpenAiCompatProvider::openai(
                        p.openai.api_key.clone().unwrap_or_default(),
                        p.openai.model.as_deref().unwrap_or("gpt-4o-mini"),
                        options,
                        connect,
                        hosted,
                    )?))
                }
                ProviderKind::Anthropic if p.anthropic.has_api_key() => {
                    Some(Arc::new(AnthropicProvider::new(
                        p.anthropic.api_key.clone().unwrap_or_default(),
                        p.anthropic
                            .model
                            .as_deref()
                            .unwrap_or("claude-3-5-haiku-latest"),
                        options,
                        connect,
                        hosted,
                    )?))
                }
                ProviderKind::Groq if p.groq.has_api_key() => {
                    Some(Arc::new(OpenAiCompatProvider::groq(
                        p.groq.api_key.clone().unwrap_or_default(),
                        p.groq.model.as_deref().unwrap_or("llama-3.1-8b-instant"),
                        options,
                        connect,
                        hosted,
                    )?))
                }
                ProviderKind::Together if p.together.has_api_key() => {
                    Some(Arc::new(OpenAiCompatProvider::together(
                        p.together.api_key.clone().unwrap_or_default(),
                        p.together
                            .model
                            .as_deref()
                            .unwrap_or("meta-llama/Llama-3-8b-chat-hf"),
                        options,
                        connect,
                        hosted,
                    )?))
                }
                ProviderKind::Ollama if p.ollama.base_url.is_some() => {
                    Some(Arc::new(OllamaProvider::new(
                        p.ollama.base_url.as_deref(),
                        p.ollama.model.as_deref().unwrap_or("llama3.2"),
                        options,
                        connect,
                        local,
                    )?))
                }
                _ => None,
            };

            if let Some(adapter) = adapter {
                providers.push((kind, adapter));
            }
        }

        Ok(Self::new(providers))
    }

    /// The primary provider, if any is configured.
    pub fn primary(&self) -> Option<ProviderKind> {
        self.providers.first().map(|(kind, _)| *kind)
    }

    /// Names of all configured providers, in priority order.
    pub fn configured(&self) -> Vec<ProviderKind> {
        self.providers.iter().map(|(kind, _)| *kind).collect()
    }

    fn lookup(&self, kind: ProviderKind) -> Option<&Arc<dyn Provider>> {
        self.providers
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, p)| p)
    }

    /// Generate text for a prompt.
    ///
    /// `requested` picks a specific provider; if it is absent or not
    /// configured, the primary handles the request. One fallback hop: when
    /// a non-primary provider fails, the primary gets a single retry.
    /// Never fails — a total outage comes back as readable error text.
    pub async fn generate(
        &self,
        prompt: &str,
        context_id: &str,
        requested: Option<ProviderKind>,
    ) -> String {
        let Some(primary) = self.primary() else {
            warn!(context_id, "Generation requested with no providers configured");
            return NOT_CONFIGURED_TEXT.to_string();
        };

        let selected = requested.filter(|k| self.lookup(*k).is_some()).unwrap_or(primary);
        let provider = self
            .lookup(selected)
            .unwrap_or_else(|| &self.providers[0].1);

        debug!(context_id, provider = %selected, "Generating");

        match provider.generate(prompt).await {
            Ok(text) => text,
            Err(e) if selected != primary => {
                warn!(
                    context_id,
                    provider = %selected,
                    error = %e,
                    "Provider failed, falling back to primary"
                );
                match self.providers[0].1.generate(prompt).await {
                    Ok(text) => text,
                    Err(e) => self.degraded(context_id, primary, e),
                }
            }
            Err(e) => self.degraded(context_id, selected, e),
        }
    }

    fn degraded(&self, context_id: &str, kind: ProviderKind, error: ProviderError) -> String {
        warn!(context_id, provider = %kind, error = %error, "Generation failed");
        format!("Error generating response: {error}")
    }
}
