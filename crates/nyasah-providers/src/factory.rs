//! Resolve a configured provider name to a concrete backend.

use std::str::FromStr;
use std::sync::Arc;

use nyasah_core::{HttpSettings, ProviderConfig};

use crate::error::ProviderError;
use crate::huggingface::{self, HuggingFaceProvider};
use crate::llama::LlamaProvider;
use crate::openai::{self, OpenAiProvider};
use crate::provider::Provider;

/// The closed set of backends the factory knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    HuggingFace,
    Llama,
}

impl ProviderKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::HuggingFace => "huggingface",
            ProviderKind::Llama => "llama",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = ProviderError;

    /// `meta` is accepted as an alias for the local llama server.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "huggingface" => Ok(ProviderKind::HuggingFace),
            "llama" | "meta" => Ok(ProviderKind::Llama),
            _ => Err(ProviderError::UnsupportedProvider(s.to_string())),
        }
    }
}

/// Build the backend named by `config.provider`.
///
/// Required options per backend:
///
/// | Backend       | Required     | Optional                 |
/// |---------------|--------------|--------------------------|
/// | `openai`      | `api_key`    | `model`, `base_url`      |
/// | `huggingface` | `api_key`    | `model`, `base_url`      |
/// | `llama`       | `server_url` |                          |
///
/// # Errors
///
/// - [`ProviderError::UnsupportedProvider`] for an unknown provider name.
/// - [`ProviderError::MissingCredential`] when a required option is absent or blank.
/// - [`ProviderError::InvalidEndpoint`] when a URL option does not parse.
pub fn create_provider(
    config: &ProviderConfig,
    http: &HttpSettings,
) -> Result<Arc<dyn Provider>, ProviderError> {
    let kind: ProviderKind = config.provider.parse()?;
    let require = |key: &'static str| {
        config.option(key).ok_or(ProviderError::MissingCredential {
            provider: kind.as_str(),
            key,
        })
    };

    let provider: Arc<dyn Provider> = match kind {
        ProviderKind::OpenAi => {
            let api_key = require(ProviderConfig::API_KEY)?;
            let model = config
                .option(ProviderConfig::MODEL)
                .unwrap_or(openai::DEFAULT_MODEL);
            match config.option(ProviderConfig::BASE_URL) {
                Some(base) => Arc::new(OpenAiProvider::with_base_url(api_key, model, base, http)?),
                None => Arc::new(OpenAiProvider::new(api_key, model, http)?),
            }
        }
        ProviderKind::HuggingFace => {
            let api_key = require(ProviderConfig::API_KEY)?;
            let model = config
                .option(ProviderConfig::MODEL)
                .unwrap_or(huggingface::DEFAULT_MODEL);
            match config.option(ProviderConfig::BASE_URL) {
                Some(base) => Arc::new(HuggingFaceProvider::with_base_url(
                    api_key, model, base, http,
                )?),
                None => Arc::new(HuggingFaceProvider::new(api_key, model, http)?),
            }
        }
        ProviderKind::Llama => {
            let server_url = require(ProviderConfig::SERVER_URL)?;
            Arc::new(LlamaProvider::new(server_url, http)?)
        }
    };

    tracing::info!(provider = %kind, "inference provider ready");
    Ok(provider)
}
