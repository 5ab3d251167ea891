//! The service facade callers drive.
//!
//! The active provider sits behind a lock and is cloned out once at the
//! start of every operation, so a concurrent [`InsightsEngine::reconfigure`]
//! only affects operations that start after it.

use std::sync::Arc;

use chrono::{TimeDelta, Utc};
use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use nyasah_core::{
    EngineConfig, Entity, GenerationSettings, HttpSettings, InsightsSnapshot, ProviderConfig,
    QueryAnswer, Recommendation, Review, ReviewEnrichment, SocialProofEvent,
};
use nyasah_providers::{create_provider, Provider, ProviderError};

use crate::aggregator::{sentiment_trend, snapshot, summarize};
use crate::analyzers::{ContentAnalyzer, KeywordAnalyzer, SentimentAnalyzer};
use crate::cancel::cancellable;
use crate::error::InsightsError;
use crate::recommender::{self, Recommender};
use crate::repository::RecordRepository;
use crate::timeframe::{frame_windows, load_time_frames, FrameWindow};
use crate::types::TrendReport;

pub struct InsightsEngine {
    provider: RwLock<Arc<dyn Provider>>,
    repository: Arc<dyn RecordRepository>,
    generation: GenerationSettings,
    time_frames: usize,
    frame_width: TimeDelta,
    concurrency: usize,
}

impl InsightsEngine {
    /// Build the configured provider and wire it to `repository`.
    ///
    /// # Errors
    ///
    /// Fails with [`InsightsError::Provider`] if the provider cannot be
    /// constructed (unknown name, missing credential, bad endpoint).
    pub fn new(
        config: &EngineConfig,
        repository: Arc<dyn RecordRepository>,
    ) -> Result<Self, InsightsError> {
        let provider = create_provider(&config.provider, &config.http)?;
        Ok(Self::with_provider(config, provider, repository))
    }

    /// Use an already-built provider instead of the configured one.
    #[must_use]
    pub fn with_provider(
        config: &EngineConfig,
        provider: Arc<dyn Provider>,
        repository: Arc<dyn RecordRepository>,
    ) -> Self {
        Self {
            provider: RwLock::new(provider),
            repository,
            generation: config.generation,
            time_frames: config.time_frames,
            frame_width: TimeDelta::days(i64::from(config.frame_days)),
            concurrency: config.max_concurrency.max(1),
        }
    }

    /// Build a new provider and swap it in.
    ///
    /// The new provider is fully constructed before the swap; on error the
    /// previous provider stays active.
    ///
    /// # Errors
    ///
    /// Any [`ProviderError`] from construction.
    pub fn reconfigure(
        &self,
        config: &ProviderConfig,
        http: &HttpSettings,
    ) -> Result<(), ProviderError> {
        let provider = create_provider(config, http)?;
        self.replace_provider(provider);
        tracing::info!(provider = %config.provider, "provider reconfigured");
        Ok(())
    }

    pub fn replace_provider(&self, provider: Arc<dyn Provider>) {
        *self.provider.write() = provider;
    }

    fn provider(&self) -> Arc<dyn Provider> {
        Arc::clone(&*self.provider.read())
    }

    fn windows(&self) -> Vec<FrameWindow> {
        frame_windows(Utc::now(), self.time_frames, self.frame_width)
    }

    async fn entity_records(
        &self,
        entity_id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<(Entity, Vec<Review>, Vec<SocialProofEvent>), InsightsError> {
        let entity = cancellable(cancel, self.repository.entity(entity_id))
            .await?
            .ok_or(InsightsError::EntityNotFound(entity_id))?;
        let (reviews, proofs) = tokio::try_join!(
            cancellable(cancel, self.repository.entity_reviews(entity_id)),
            cancellable(cancel, self.repository.entity_proofs(entity_id)),
        )?;
        Ok((entity, reviews, proofs))
    }

    /// Answer a free-form tenant query.
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
        ContentAnalyzer::new(self.provider())
            .process_query(tenant_id, query, cancel)
            .await
    }

    /// Derive sentiment and keywords for each review, in input order.
    ///
    /// All or nothing: if any single call fails, nothing is returned.
    ///
    /// # Errors
    ///
    /// The first provider failure, or [`InsightsError::Cancelled`].
    pub async fn enrich_reviews(
        &self,
        reviews: &[Review],
        cancel: &CancellationToken,
    ) -> Result<Vec<ReviewEnrichment>, InsightsError> {
        let provider = self.provider();
        let sentiment =
            SentimentAnalyzer::new(Arc::clone(&provider)).with_concurrency(self.concurrency);
        let keywords = KeywordAnalyzer::new(provider).with_concurrency(self.concurrency);

        let (scores, keyword_sets) = tokio::try_join!(
            sentiment.analyze_batch(reviews, cancel),
            keywords.extract_batch(reviews, cancel),
        )?;

        tracing::info!(reviews = reviews.len(), "enriched reviews");
        Ok(reviews
            .iter()
            .zip(scores)
            .zip(keyword_sets)
            .map(|((review, sentiment), keywords)| ReviewEnrichment {
                review_id: review.id,
                sentiment,
                keywords,
            })
            .collect())
    }

    /// Suggested actions for one entity. Degrades to the fixed fallback list
    /// when the provider fails.
    ///
    /// # Errors
    ///
    /// [`InsightsError::EntityNotFound`], a repository failure, or
    /// [`InsightsError::Cancelled`].
    pub async fn generate_actions(
        &self,
        entity_id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, InsightsError> {
        let provider = self.provider();
        let (entity, reviews, proofs) = self.entity_records(entity_id, cancel).await?;
        let summary = summarize(&reviews, &proofs);
        Recommender::new(provider, self.generation)
            .generate_actions(&entity, &summary, reviews.len(), cancel)
            .await
    }

    /// Rating, sentiment, engagement, keywords, trend and actions for one
    /// entity, from its stored (already enriched) records.
    ///
    /// # Errors
    ///
    /// [`InsightsError::EntityNotFound`], a repository failure, or
    /// [`InsightsError::Cancelled`]. Provider failures do not fail the
    /// snapshot; actions fall back to the fixed list.
    pub async fn generate_entity_insights(
        &self,
        entity_id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<InsightsSnapshot, InsightsError> {
        let provider = self.provider();
        let (entity, reviews, proofs) = self.entity_records(entity_id, cancel).await?;

        let summary = summarize(&reviews, &proofs);
        let trend = sentiment_trend(&self.windows(), &reviews);
        let actions = Recommender::new(provider, self.generation)
            .generate_actions(&entity, &summary, reviews.len(), cancel)
            .await?;

        tracing::info!(
            entity = %entity_id,
            reviews = reviews.len(),
            proofs = proofs.len(),
            "generated entity insights"
        );
        Ok(snapshot(entity_id, summary, trend, actions, Utc::now()))
    }

    /// Confidence-ranked recommendations from the tenant's proof history.
    ///
    /// # Errors
    ///
    /// A repository failure, or [`InsightsError::Cancelled`].
    pub async fn generate_recommendations(
        &self,
        tenant_id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<Vec<Recommendation>, InsightsError> {
        recommender::generate_recommendations(
            self.repository.as_ref(),
            tenant_id,
            Utc::now(),
            cancel,
        )
        .await
    }

    /// Sentiment, engagement and keyword trends over the configured windows.
    ///
    /// # Errors
    ///
    /// The first provider or repository failure, or
    /// [`InsightsError::Cancelled`].
    pub async fn analyze_trends(
        &self,
        tenant_id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<TrendReport, InsightsError> {
        let provider = self.provider();
        let now = Utc::now();
        let windows = frame_windows(now, self.time_frames, self.frame_width);
        let frames = load_time_frames(
            self.repository.as_ref(),
            tenant_id,
            &windows,
            self.concurrency,
            cancel,
        )
        .await?;

        ContentAnalyzer::new(provider)
            .with_concurrency(self.concurrency)
            .analyze_trends(tenant_id, &frames, now, cancel)
            .await
    }
}
