//! Hosted inference endpoint addressed per model name.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use nyasah_core::HttpSettings;

use crate::error::ProviderError;
use crate::provider::Provider;
use crate::sentiment::label_to_score;
use crate::transport::{non_empty, normalize_base_url, JsonTransport};

const DEFAULT_BASE_URL: &str = "https://api-inference.huggingface.co";
pub const DEFAULT_MODEL: &str = "gpt2";
/// Classifier used for sentiment regardless of the configured text model.
pub const SENTIMENT_MODEL: &str = "finiteautomata/bertweet-base-sentiment-analysis";

pub struct HuggingFaceProvider {
    transport: JsonTransport,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parameters: Option<GenerationParameters>,
}

#[derive(Serialize)]
struct GenerationParameters {
    max_length: u32,
    temperature: f64,
}

#[derive(Deserialize)]
struct GeneratedText {
    generated_text: String,
}

#[derive(Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

impl HuggingFaceProvider {
    /// # Errors
    ///
    /// Returns [`ProviderError::Unavailable`] if the HTTP client cannot be built.
    pub fn new(api_key: &str, model: &str, http: &HttpSettings) -> Result<Self, ProviderError> {
        Self::with_base_url(api_key, model, DEFAULT_BASE_URL, http)
    }

    /// # Errors
    ///
    /// Returns [`ProviderError::InvalidEndpoint`] if `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        model: &str,
        base_url: &str,
        http: &HttpSettings,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            transport: JsonTransport::new("huggingface", http)?,
            api_key: api_key.to_owned(),
            base_url: normalize_base_url(base_url)?,
            model: model.to_owned(),
        })
    }

    fn model_url(&self, model: &str) -> String {
        format!("{}/models/{model}", self.base_url)
    }

    async fn generate(
        &self,
        inputs: &str,
        parameters: Option<GenerationParameters>,
    ) -> Result<String, ProviderError> {
        let request = InferenceRequest { inputs, parameters };
        let generated: Vec<GeneratedText> = self
            .transport
            .post(&self.model_url(&self.model), Some(&self.api_key), &request)
            .await?;

        let provider = self.transport.provider();
        let first = generated
            .into_iter()
            .next()
            .ok_or(ProviderError::NoResponse { provider })?;
        non_empty(provider, first.generated_text)
    }
}

#[async_trait]
impl Provider for HuggingFaceProvider {
    async fn process_query(&self, query: &str) -> Result<String, ProviderError> {
        self.generate(query, None).await
    }

    async fn analyze_sentiment(&self, text: &str) -> Result<f64, ProviderError> {
        let request = InferenceRequest {
            inputs: text,
            parameters: None,
        };
        let results: Vec<Vec<LabelScore>> = self
            .transport
            .post(&self.model_url(SENTIMENT_MODEL), Some(&self.api_key), &request)
            .await?;

        // The classifier returns labels sorted by confidence; the first wins.
        let top = results
            .into_iter()
            .next()
            .and_then(|labels| labels.into_iter().next())
            .ok_or(ProviderError::NoResponse {
                provider: self.transport.provider(),
            })?;
        Ok(label_to_score(&top.label, top.score))
    }

    async fn generate_text(
        &self,
        prompt: &str,
        max_tokens: u32,
        temperature: f64,
    ) -> Result<String, ProviderError> {
        self.generate(
            prompt,
            Some(GenerationParameters {
                max_length: max_tokens,
                temperature,
            }),
        )
        .await
    }
}
