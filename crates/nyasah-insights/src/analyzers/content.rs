use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use nyasah_core::{QueryAnswer, Review, SocialProofEvent};
use nyasah_providers::Provider;

use super::{EngagementAnalyzer, KeywordAnalyzer, SentimentAnalyzer};
use crate::cancel::cancellable;
use crate::error::InsightsError;
use crate::performers::top_performers;
use crate::signals::{average_engagement, top_keywords, CONTENT_KEYWORD_LIMIT};
use crate::timeframe::TimeFrame;
use crate::types::TrendReport;

fn query_prompt(query: &str) -> String {
    format!(
        "As an AI assistant for an e-commerce social proof platform, answer the following query:\n\n\
         Query: \"\"\"{query}\"\"\"\n\n\
         Provide a clear, concise, and helpful response based on the available data and best practices."
    )
}

/// Answers free-form queries and assembles combined trend reports.
#[derive(Clone)]
pub struct ContentAnalyzer {
    provider: Arc<dyn Provider>,
    sentiment: SentimentAnalyzer,
    keywords: KeywordAnalyzer,
    engagement: EngagementAnalyzer,
}

impl ContentAnalyzer {
    #[must_use]
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self {
            sentiment: SentimentAnalyzer::new(Arc::clone(&provider)),
            keywords: KeywordAnalyzer::new(Arc::clone(&provider)),
            engagement: EngagementAnalyzer::new(),
            provider,
        }
    }

    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.sentiment = self.sentiment.with_concurrency(concurrency);
        self.keywords = self.keywords.with_concurrency(concurrency);
        self
    }

    /// Forward `query` to the provider inside the assistant template.
    ///
    /// # Errors
    ///
    /// Propagates the provider failure, or [`InsightsError::Cancelled`].
    pub async fn process_query(
        &self,
        tenant_id: Uuid,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<QueryAnswer, InsightsError> {
        let response = cancellable(cancel, self.provider.process_query(&query_prompt(query))).await?;
        tracing::debug!(tenant = %tenant_id, chars = response.len(), "answered query");
        Ok(QueryAnswer {
            tenant_id,
            query: query.to_string(),
            response,
        })
    }

    /// The ten most frequent key phrases in `text`.
    ///
    /// # Errors
    ///
    /// Propagates the provider failure, or [`InsightsError::Cancelled`].
    pub async fn extract_keywords(
        &self,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, InsightsError> {
        let keywords = self.keywords.extract(text, cancel).await?;
        Ok(top_keywords(&keywords, CONTENT_KEYWORD_LIMIT))
    }

    #[must_use]
    pub fn engagement_score(&self, reviews: &[Review], proofs: &[SocialProofEvent]) -> f64 {
        average_engagement(reviews, proofs)
    }

    /// Sentiment, engagement and keyword trends plus the top performers
    /// across every frame.
    ///
    /// The two provider-backed trends run concurrently. Either failing
    /// fails the report.
    ///
    /// # Errors
    ///
    /// The first provider failure, or [`InsightsError::Cancelled`].
    pub async fn analyze_trends(
        &self,
        tenant_id: Uuid,
        frames: &[TimeFrame],
        now: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> Result<TrendReport, InsightsError> {
        let (sentiment, keywords) = tokio::try_join!(
            self.sentiment.trend(frames, cancel),
            self.keywords.trend(frames, cancel),
        )?;
        let engagement = self.engagement.trend(frames);

        let reviews: Vec<Review> = frames.iter().flat_map(|f| f.reviews.clone()).collect();
        let proofs: Vec<SocialProofEvent> = frames.iter().flat_map(|f| f.proofs.clone()).collect();

        tracing::info!(
            tenant = %tenant_id,
            frames = frames.len(),
            reviews = reviews.len(),
            proofs = proofs.len(),
            "trend analysis complete"
        );

        Ok(TrendReport {
            tenant_id,
            sentiment,
            engagement,
            keywords,
            top_performers: top_performers(&reviews, &proofs),
            analyzed_at: now,
        })
    }
}
