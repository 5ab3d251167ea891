use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};
use tokio_util::sync::CancellationToken;

use nyasah_core::Review;
use nyasah_providers::Provider;

use super::{windows_of, DEFAULT_CONCURRENCY};
use crate::cancel::cancellable;
use crate::error::InsightsError;
use crate::signals::average;
use crate::timeframe::TimeFrame;
use crate::types::SentimentTrend;

/// Scores review text through the provider.
#[derive(Clone)]
pub struct SentimentAnalyzer {
    provider: Arc<dyn Provider>,
    concurrency: usize,
}

impl SentimentAnalyzer {
    #[must_use]
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self {
            provider,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Score one review's content in [-1.0, 1.0].
    ///
    /// # Errors
    ///
    /// Propagates the provider failure, or [`InsightsError::Cancelled`].
    pub async fn analyze(
        &self,
        review: &Review,
        cancel: &CancellationToken,
    ) -> Result<f64, InsightsError> {
        let score = cancellable(cancel, self.provider.analyze_sentiment(&review.content)).await?;
        tracing::debug!(review = %review.id, score, "scored review sentiment");
        Ok(score)
    }

    /// Score every review, in input order.
    ///
    /// All or nothing: one failed call fails the batch and no scores are
    /// returned.
    ///
    /// # Errors
    ///
    /// The first provider failure, or [`InsightsError::Cancelled`].
    pub async fn analyze_batch(
        &self,
        reviews: &[Review],
        cancel: &CancellationToken,
    ) -> Result<Vec<f64>, InsightsError> {
        stream::iter(reviews)
            .map(|review| self.analyze(review, cancel))
            .buffered(self.concurrency)
            .try_collect()
            .await
    }

    /// Mean fresh sentiment per frame.
    ///
    /// Every review across every frame is scored through one bounded stream
    /// so parallelism stays capped regardless of frame count.
    ///
    /// # Errors
    ///
    /// The first provider failure, or [`InsightsError::Cancelled`].
    pub async fn trend(
        &self,
        frames: &[TimeFrame],
        cancel: &CancellationToken,
    ) -> Result<SentimentTrend, InsightsError> {
        let scored: Vec<(usize, f64)> = stream::iter(
            frames
                .iter()
                .enumerate()
                .flat_map(|(i, frame)| frame.reviews.iter().map(move |r| (i, r))),
        )
        .map(|(i, review)| async move {
            let score = self.analyze(review, cancel).await?;
            Ok::<_, InsightsError>((i, score))
        })
        .buffered(self.concurrency)
        .try_collect()
        .await?;

        let mut per_frame: Vec<Vec<f64>> = vec![Vec::new(); frames.len()];
        for (i, score) in scored {
            per_frame[i].push(score);
        }

        Ok(SentimentTrend {
            frames: windows_of(frames),
            averages: per_frame.iter().map(|scores| average(scores)).collect(),
        })
    }
}
