use async_trait::async_trait;

use crate::error::ProviderError;

/// Capability set every inference backend exposes.
///
/// Callers hold a `dyn Provider` and never learn which backend answers;
/// swapping one for another changes latency and quality, not behavior.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Free-form request/response. The reply has no schema.
    async fn process_query(&self, query: &str) -> Result<String, ProviderError>;

    /// Sentiment of `text` as a single score in `[-1.0, 1.0]`.
    async fn analyze_sentiment(&self, text: &str) -> Result<f64, ProviderError>;

    /// Bounded generation.
    async fn generate_text(
        &self,
        prompt: &str,
        max_tokens: u32,
        temperature: f64,
    ) -> Result<String, ProviderError>;
}
