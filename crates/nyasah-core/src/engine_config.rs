use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A named provider plus its string options (credential, model, endpoint).
///
/// The provider name is not validated here; the provider factory rejects
/// names it does not know.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub provider: String,
    #[serde(default)]
    pub options: HashMap<String, String>,
}

impl ProviderConfig {
    pub const API_KEY: &'static str = "api_key";
    pub const MODEL: &'static str = "model";
    pub const SERVER_URL: &'static str = "server_url";
    pub const BASE_URL: &'static str = "base_url";

    #[must_use]
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            options: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_option(mut self, key: &str, value: impl Into<String>) -> Self {
        self.options.insert(key.to_string(), value.into());
        self
    }

    /// Look up an option, treating blank values as absent.
    #[must_use]
    pub fn option(&self, key: &str) -> Option<&str> {
        self.options
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut options: Vec<(&str, &str)> = self
            .options
            .iter()
            .map(|(k, v)| {
                if k == Self::API_KEY {
                    (k.as_str(), "[redacted]")
                } else {
                    (k.as_str(), v.as_str())
                }
            })
            .collect();
        options.sort_unstable();
        f.debug_struct("ProviderConfig")
            .field("provider", &self.provider)
            .field("options", &options)
            .finish()
    }
}

/// Transport knobs applied to every provider call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpSettings {
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            max_retries: 3,
            backoff_base_ms: 500,
        }
    }
}

/// Parameters for free-text recommendation generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationSettings {
    pub max_tokens: u32,
    pub temperature: f64,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            max_tokens: 1000,
            temperature: 0.45,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub provider: ProviderConfig,
    pub http: HttpSettings,
    pub generation: GenerationSettings,
    /// Number of trend windows, newest first.
    pub time_frames: usize,
    /// Width of each trend window in days.
    pub frame_days: u32,
    /// Upper bound on concurrent provider calls or fetches per operation.
    pub max_concurrency: usize,
    pub log_level: String,
}

impl EngineConfig {
    /// Defaults for everything except the provider selection.
    #[must_use]
    pub fn with_provider(provider: ProviderConfig) -> Self {
        Self {
            provider,
            http: HttpSettings::default(),
            generation: GenerationSettings::default(),
            time_frames: 12,
            frame_days: 7,
            max_concurrency: 4,
            log_level: "info".to_string(),
        }
    }
}
