use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};
use tokio_util::sync::CancellationToken;

use nyasah_core::Review;
use nyasah_providers::Provider;

use super::{windows_of, DEFAULT_CONCURRENCY};
use crate::cancel::cancellable;
use crate::error::InsightsError;
use crate::signals::{parse_keywords, tally_keywords};
use crate::timeframe::TimeFrame;
use crate::types::KeywordTrend;

fn keyword_prompt(text: &str) -> String {
    format!(
        "Extract key phrases and topics from the following text:\n\n\
         Text: \"\"\"{text}\"\"\"\n\n\
         Return only the key phrases, separated by commas:"
    )
}

/// Pulls key phrases out of free text through the provider.
#[derive(Clone)]
pub struct KeywordAnalyzer {
    provider: Arc<dyn Provider>,
    concurrency: usize,
}

impl KeywordAnalyzer {
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

    /// Key phrases in the order the provider listed them.
    ///
    /// # Errors
    ///
    /// Propagates the provider failure, or [`InsightsError::Cancelled`].
    pub async fn extract(
        &self,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, InsightsError> {
        let reply = cancellable(cancel, self.provider.process_query(&keyword_prompt(text))).await?;
        Ok(parse_keywords(&reply))
    }

    /// Extract keywords for every review, all or nothing.
    ///
    /// # Errors
    ///
    /// The first provider failure, or [`InsightsError::Cancelled`].
    pub async fn extract_batch(
        &self,
        reviews: &[Review],
        cancel: &CancellationToken,
    ) -> Result<Vec<Vec<String>>, InsightsError> {
        stream::iter(reviews)
            .map(|review| self.extract(&review.content, cancel))
            .buffered(self.concurrency)
            .try_collect()
            .await
    }

    /// Keyword frequency per frame, from freshly extracted review keywords.
    ///
    /// # Errors
    ///
    /// The first provider failure, or [`InsightsError::Cancelled`].
    pub async fn trend(
        &self,
        frames: &[TimeFrame],
        cancel: &CancellationToken,
    ) -> Result<KeywordTrend, InsightsError> {
        let extracted: Vec<(usize, Vec<String>)> = stream::iter(
            frames
                .iter()
                .enumerate()
                .flat_map(|(i, frame)| frame.reviews.iter().map(move |r| (i, r))),
        )
        .map(|(i, review)| async move {
            let keywords = self.extract(&review.content, cancel).await?;
            Ok::<_, InsightsError>((i, keywords))
        })
        .buffered(self.concurrency)
        .try_collect()
        .await?;

        let mut per_frame: Vec<Vec<String>> = vec![Vec::new(); frames.len()];
        for (i, keywords) in extracted {
            per_frame[i].extend(keywords);
        }

        Ok(KeywordTrend {
            frames: windows_of(frames),
            frequencies: per_frame.iter().map(tally_keywords).collect(),
        })
    }
}
