//! Hosted chat-completion backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use nyasah_core::HttpSettings;

use crate::error::ProviderError;
use crate::provider::Provider;
use crate::sentiment::{parse_sentiment_score, sentiment_prompt};
use crate::transport::{non_empty, normalize_base_url, JsonTransport};

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

pub struct OpenAiProvider {
    transport: JsonTransport,
    api_key: String,
    model: String,
    endpoint: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiProvider {
    /// Creates a provider pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Unavailable`] if the HTTP client cannot be built.
    pub fn new(api_key: &str, model: &str, http: &HttpSettings) -> Result<Self, ProviderError> {
        Self::with_base_url(api_key, model, DEFAULT_BASE_URL, http)
    }

    /// Creates a provider with a custom base URL (compatible gateways, tests).
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::InvalidEndpoint`] if `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        model: &str,
        base_url: &str,
        http: &HttpSettings,
    ) -> Result<Self, ProviderError> {
        let base = normalize_base_url(base_url)?;
        Ok(Self {
            transport: JsonTransport::new("openai", http)?,
            api_key: api_key.to_owned(),
            model: model.to_owned(),
            endpoint: format!("{base}/v1/chat/completions"),
        })
    }

    async fn complete(
        &self,
        prompt: &str,
        max_tokens: Option<u32>,
        temperature: Option<f64>,
    ) -> Result<String, ProviderError> {
        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens,
            temperature,
        };

        let response: ChatResponse = self
            .transport
            .post(&self.endpoint, Some(&self.api_key), &request)
            .await?;

        let provider = self.transport.provider();
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(ProviderError::NoResponse { provider })?;
        non_empty(provider, content)
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    async fn process_query(&self, query: &str) -> Result<String, ProviderError> {
        self.complete(query, None, None).await
    }

    async fn analyze_sentiment(&self, text: &str) -> Result<f64, ProviderError> {
        let reply = self.complete(&sentiment_prompt(text), None, None).await?;
        parse_sentiment_score(self.transport.provider(), &reply)
    }

    async fn generate_text(
        &self,
        prompt: &str,
        max_tokens: u32,
        temperature: f64,
    ) -> Result<String, ProviderError> {
        self.complete(prompt, Some(max_tokens), Some(temperature))
            .await
    }
}
