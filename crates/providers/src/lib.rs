//! LLM provider adapters for Reagent.
//!
//! All adapters implement the `reagent_core::Provider` trait: a fully
//! rendered prompt goes in, generated text comes out. The [`ModelGateway`]
//! owns the configured adapters, picks the primary, and degrades gracefully
//! when a backend fails.

pub mod anthropic;
pub mod gateway;
pub mod kind;
pub mod ollama;
pub mod openai_compat;

pub use anthropic::AnthropicProvider;
pub use gateway::ModelGateway;
pub use kind::ProviderKind;
pub use ollama::OllamaProvider;
pub use openai_compat::OpenAiCompatProvider;

use reagent_config::GenerationConfig;

/// Sampling options attached to every generation request.
#[derive(Debug, Clone, Copy)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
}

impl From<&GenerationConfig> for GenerationOptions {
    fn from(cfg: &GenerationConfig) -> Self {
        Self {
            temperature: cfg.temperature,
            top_p: cfg.top_p,
            max_tokens: cfg.max_tokens,
        }
    }
}

impl Default for GenerationOptions {
    fn default() -> Self {
        (&GenerationConfig::default()).into()
    }
}
