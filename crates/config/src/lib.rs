//! Configuration loading, validation, and management for Reagent.
//!
//! Loads configuration from `reagent.toml` (or a path given on the command
//! line) with environment variable overrides for API keys and sampling
//! options. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `reagent.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Explicit provider priority order. The first configured provider in
    /// this list becomes the primary. Empty = built-in default order.
    #[serde(default)]
    pub provider_priority: Vec<String>,

    /// Text-generation sampling options, shared across providers
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Per-provider credentials, endpoints, and models
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// HTTP server configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Reasoning loop configuration
    #[serde(default)]
    pub agent: AgentConfig,

    /// Conversation persistence configuration
    #[serde(default)]
    pub store: StoreConfig,
}

/// Sampling options sent with every generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_top_p")]
    pub top_p: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_temperature() -> f32 {
    0.7
}
fn default_top_p() -> f32 {
    0.9
}
fn default_max_tokens() -> u32 {
    500
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            top_p: default_top_p(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// Settings for one provider backend.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl ProviderConfig {
    /// A hosted provider is usable once it has an API key.
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}

/// Per-provider configuration blocks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub openai: ProviderConfig,

    #[serde(default)]
    pub anthropic: ProviderConfig,

    #[serde(default)]
    pub groq: ProviderConfig,

    #[serde(default)]
    pub together: ProviderConfig,

    #[serde(default)]
    pub ollama: ProviderConfig,
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("provider_priority", &self.provider_priority)
            .field("generation", &self.generation)
            .field("providers", &self.providers)
            .field("gateway", &self.gateway)
            .field("agent", &self.agent)
            .field("store", &self.store)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    8000
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Hard cap on reasoning iterations per turn
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Connect timeout for provider HTTP clients, in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Request timeout for hosted providers, in seconds
    #[serde(default = "default_hosted_timeout")]
    pub hosted_timeout_secs: u64,

    /// Request timeout for local Ollama, in seconds. Local inference on
    /// modest hardware can take minutes.
    #[serde(default = "default_ollama_timeout")]
    pub ollama_timeout_secs: u64,
}

fn default_max_iterations() -> u32 {
    5
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_hosted_timeout() -> u64 {
    60
}
fn default_ollama_timeout() -> u64 {
    180
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            connect_timeout_secs: default_connect_timeout(),
            hosted_timeout_secs: default_hosted_timeout(),
            ollama_timeout_secs: default_ollama_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Backend: "sqlite" or "memory"
    #[serde(default = "default_store_backend")]
    pub backend: String,

    /// SQLite database path
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

fn default_store_backend() -> String {
    "sqlite".into()
}
fn default_db_path() -> String {
    "reagent.db".into()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_store_backend(),
            db_path: default_db_path(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `reagent.toml` in the working directory.
    ///
    /// Environment variables override file values:
    /// - `OPENAI_API_KEY`, `ANTHROPIC_API_KEY`, `GROQ_API_KEY`,
    ///   `TOGETHER_API_KEY` — provider credentials
    /// - `OLLAMA_BASE_URL` — local Ollama endpoint
    /// - `MODEL_PROVIDER_PRIORITY` — comma-separated provider order
    /// - `MODEL_TEMPERATURE`, `MODEL_TOP_P`, `MODEL_MAX_TOKENS` — sampling
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new("reagent.toml"))
    }

    /// Load configuration from a specific file path, then apply environment
    /// overrides.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?
        } else {
            tracing::info!("No config file found at {}, using defaults", path.display());
            Self::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        let env_key = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());

        if let Some(key) = env_key("OPENAI_API_KEY") {
            self.providers.openai.api_key = Some(key);
        }
        if let Some(key) = env_key("ANTHROPIC_API_KEY") {
            self.providers.anthropic.api_key = Some(key);
        }
        if let Some(key) = env_key("GROQ_API_KEY") {
            self.providers.groq.api_key = Some(key);
        }
        if let Some(key) = env_key("TOGETHER_API_KEY") {
            self.providers.together.api_key = Some(key);
        }
        if let Some(url) = env_key("OLLAMA_BASE_URL") {
            self.providers.ollama.base_url = Some(url);
        }

        if let Some(priority) = env_key("MODEL_PROVIDER_PRIORITY") {
            self.provider_priority = priority
                .split(',')
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Some(t) = env_key("MODEL_TEMPERATURE").and_then(|v| v.parse().ok()) {
            self.generation.temperature = t;
        }
        if let Some(p) = env_key("MODEL_TOP_P").and_then(|v| v.parse().ok()) {
            self.generation.top_p = p;
        }
        if let Some(m) = env_key("MODEL_MAX_TOKENS").and_then(|v| v.parse().ok()) {
            self.generation.max_tokens = m;
        }
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.generation.temperature < 0.0 || self.generation.temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "generation.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.generation.top_p <= 0.0 || self.generation.top_p > 1.0 {
            return Err(ConfigError::ValidationError(
                "generation.top_p must be in (0.0, 1.0]".into(),
            ));
        }

        if self.agent.max_iterations == 0 {
            return Err(ConfigError::ValidationError(
                "agent.max_iterations must be at least 1".into(),
            ));
        }

        match self.store.backend.as_str() {
            "sqlite" | "memory" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "unknown store backend '{other}' (expected 'sqlite' or 'memory')"
                )));
            }
        }

        Ok(())
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            provider_priority: vec![],
            generation: GenerationConfig::default(),
            providers: ProvidersConfig::default(),
            gateway: GatewayConfig::default(),
            agent: AgentConfig::default(),
            store: StoreConfig::default(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
