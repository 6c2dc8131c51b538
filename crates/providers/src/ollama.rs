//! Ollama local provider adapter.
//!
//! Talks to Ollama's native `/api/generate` endpoint rather than its
//! OpenAI-compatible shim, so the raw prompt goes through untouched. No
//! authentication. The request timeout is long because local inference on
//! CPU can take minutes.

use async_trait::async_trait;
use reagent_core::error::ProviderError;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::GenerationOptions;

const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Local Ollama provider.
pub struct OllamaProvider {
    base_url: String,
    model: String,
    options: GenerationOptions,
    client: reqwest::Client,
}

impl OllamaProvider {
    /// Create a new Ollama provider.
    pub fn new(
        base_url: Option<&str>,
        model: impl Into<String>,
        options: GenerationOptions,
        connect_timeout: Duration,
        request_timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .build()
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(Self {
            base_url: base_url
                .unwrap_or(DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            model: model.into(),
            options,
            client,
        })
    }
}

#[derive(Deserialize)]
struct ApiResponse {
    response: String,
}

#[async_trait]
impl reagent_core::Provider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn generate(&self, prompt: &str) -> std::result::Result<String, ProviderError> {
        let url = format!("{}/api/generate", self.base_url);

        let body = serde_json::json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
            "options": {
                "temperature": self.options.temperature,
                "top_p": self.options.top_p,
                "num_predict": self.options.max_tokens,
            },
        });

        debug!(model = %self.model, "Sending Ollama generate request");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(e.to_string())
                } else {
                    ProviderError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();

        if status == 404 {
            return Err(ProviderError::ModelNotFound(self.model.clone()));
        }

        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Ollama returned error");
            return Err(ProviderError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedPayload(e.to_string()))?;

        Ok(api_response.response)
    }
}
