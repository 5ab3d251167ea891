//! Self-hosted generation server (`POST /generate`).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use nyasah_core::HttpSettings;

use crate::error::ProviderError;
use crate::provider::Provider;
use crate::sentiment::{parse_sentiment_score, sentiment_prompt};
use crate::transport::{non_empty, normalize_base_url, JsonTransport};

const QUERY_MAX_TOKENS: u32 = 1000;
const QUERY_TEMPERATURE: f64 = 0.7;
const SENTIMENT_MAX_TOKENS: u32 = 100;
const SENTIMENT_TEMPERATURE: f64 = 0.3;

pub struct LlamaProvider {
    transport: JsonTransport,
    endpoint: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    prompt: &'a str,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Deserialize)]
struct GenerateResponse {
    text: String,
}

impl LlamaProvider {
    /// # Errors
    ///
    /// Returns [`ProviderError::InvalidEndpoint`] if `server_url` does not
    /// parse, or [`ProviderError::Unavailable`] if the HTTP client cannot be built.
    pub fn new(server_url: &str, http: &HttpSettings) -> Result<Self, ProviderError> {
        let base = normalize_base_url(server_url)?;
        Ok(Self {
            transport: JsonTransport::new("llama", http)?,
            endpoint: format!("{base}/generate"),
        })
    }

    async fn generate(
        &self,
        prompt: &str,
        max_tokens: u32,
        temperature: f64,
    ) -> Result<String, ProviderError> {
        let request = GenerateRequest {
            prompt,
            max_tokens,
            temperature,
        };
        let response: GenerateResponse = self.transport.post(&self.endpoint, None, &request).await?;
        non_empty(self.transport.provider(), response.text)
    }
}

#[async_trait]
impl Provider for LlamaProvider {
    async fn process_query(&self, query: &str) -> Result<String, ProviderError> {
        self.generate(query, QUERY_MAX_TOKENS, QUERY_TEMPERATURE)
            .await
    }

    async fn analyze_sentiment(&self, text: &str) -> Result<f64, ProviderError> {
        let reply = self
            .generate(
                &sentiment_prompt(text),
                SENTIMENT_MAX_TOKENS,
                SENTIMENT_TEMPERATURE,
            )
            .await?;
        parse_sentiment_score(self.transport.provider(), &reply)
    }

    async fn generate_text(
        &self,
        prompt: &str,
        max_tokens: u32,
        temperature: f64,
    ) -> Result<String, ProviderError> {
        self.generate(prompt, max_tokens, temperature).await
    }
}
