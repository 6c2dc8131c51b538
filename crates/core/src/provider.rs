//! Provider trait — the abstraction over text-generation backends.
//!
//! A Provider knows how to send a fully rendered prompt to an LLM backend
//! and get the generated text back. Payload shaping (temperature, sampling,
//! max tokens, provider-specific headers) is entirely an adapter concern:
//! the contract is string-in, string-out.
//!
//! Implementations: Ollama (native API), OpenAI-compatible endpoints
//! (OpenAI, Groq, Together), Anthropic.

use async_trait::async_trait;
use crate::error::ProviderError;

/// The core Provider trait.
///
/// Every backend implements this trait. The model gateway calls `generate()`
/// without knowing which provider is being used — pure polymorphism.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "openai", "ollama").
    fn name(&self) -> &str;

    /// Send a prompt and get the generated text back.
    async fn generate(&self, prompt: &str) -> std::result::Result<String, ProviderError>;
}
