//! JSON-over-HTTP plumbing shared by the hosted and local backends.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use nyasah_core::HttpSettings;

use crate::error::ProviderError;
use crate::retry::Backoff;

pub(crate) struct JsonTransport {
    client: Client,
    provider: &'static str,
    backoff: Backoff,
}

impl JsonTransport {
    /// # Errors
    ///
    /// Returns [`ProviderError::Unavailable`] if the underlying
    /// `reqwest::Client` cannot be constructed.
    pub(crate) fn new(provider: &'static str, http: &HttpSettings) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(http.request_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("nyasah/0.1 (insights-engine)")
            .build()?;

        Ok(Self {
            client,
            provider,
            backoff: Backoff::from_settings(http),
        })
    }

    pub(crate) fn provider(&self) -> &'static str {
        self.provider
    }

    /// POST `body` as JSON and decode the reply, retrying transient failures.
    pub(crate) async fn post<B, R>(
        &self,
        url: &str,
        bearer: Option<&str>,
        body: &B,
    ) -> Result<R, ProviderError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        self.backoff
            .run(self.provider, || self.post_once(url, bearer, body))
            .await
    }

    async fn post_once<B, R>(
        &self,
        url: &str,
        bearer: Option<&str>,
        body: &B,
    ) -> Result<R, ProviderError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let mut request = self.client.post(url).json(body);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                provider: self.provider,
                status: status.as_u16(),
            });
        }

        let text = response.text().await?;
        tracing::debug!(provider = self.provider, bytes = text.len(), "provider replied");
        serde_json::from_str(&text).map_err(|e| ProviderError::MalformedResponse {
            provider: self.provider,
            reason: e.to_string(),
        })
    }
}

/// Validate a base URL and strip any trailing slash so paths can be appended.
///
/// # Errors
///
/// Returns [`ProviderError::InvalidEndpoint`] when `raw` does not parse.
pub(crate) fn normalize_base_url(raw: &str) -> Result<String, ProviderError> {
    let trimmed = raw.trim().trim_end_matches('/');
    Url::parse(trimmed).map_err(|e| ProviderError::InvalidEndpoint {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    Ok(trimmed.to_string())
}

/// Reject blank generated text as an empty result.
pub(crate) fn non_empty(provider: &'static str, text: String) -> Result<String, ProviderError> {
    if text.trim().is_empty() {
        return Err(ProviderError::NoResponse { provider });
    }
    Ok(text)
}
