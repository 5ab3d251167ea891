//! Per-entity summaries built from already-enriched records.
//!
//! Nothing here calls a provider. Review `sentiment` and `keywords` must
//! already be populated (see the engine's `enrich_reviews`).

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use nyasah_core::{InsightsSnapshot, Review, SocialProofEvent};

use crate::signals::{
    average, average_sentiment, proof_engagement, review_engagement, top_keywords,
    SUMMARY_KEYWORD_LIMIT,
};
use crate::timeframe::{group_by_time_frames, FrameWindow};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightSummary {
    pub average_rating: f64,
    /// Mean engagement over records that have at least one view.
    pub engagement_rate: f64,
    pub sentiment_score: f64,
    pub top_keywords: Vec<String>,
}

/// Summarize one entity's records.
#[must_use]
pub fn summarize(reviews: &[Review], proofs: &[SocialProofEvent]) -> InsightSummary {
    let ratings: Vec<f64> = reviews.iter().map(|r| f64::from(r.rating)).collect();

    // Unviewed records carry no engagement signal and are left out of the mean.
    let ratios: Vec<f64> = reviews
        .iter()
        .filter(|r| r.engagement.views > 0)
        .map(review_engagement)
        .chain(
            proofs
                .iter()
                .filter(|p| p.performance.views > 0)
                .map(proof_engagement),
        )
        .collect();

    InsightSummary {
        average_rating: average(&ratings),
        engagement_rate: average(&ratios),
        sentiment_score: average_sentiment(reviews),
        top_keywords: top_keywords(
            reviews.iter().flat_map(|r| r.keywords.iter()),
            SUMMARY_KEYWORD_LIMIT,
        ),
    }
}

/// Stored-sentiment mean per window, index 0 the newest.
#[must_use]
pub fn sentiment_trend(windows: &[FrameWindow], reviews: &[Review]) -> Vec<f64> {
    group_by_time_frames(windows, reviews, &[])
        .iter()
        .map(|f| average_sentiment(&f.reviews))
        .collect()
}

/// Assemble the snapshot handed back to the caller.
#[must_use]
pub fn snapshot(
    entity_id: Uuid,
    summary: InsightSummary,
    sentiment_trend: Vec<f64>,
    recommended_actions: Vec<String>,
    generated_at: DateTime<Utc>,
) -> InsightsSnapshot {
    InsightsSnapshot {
        entity_id,
        average_rating: summary.average_rating,
        sentiment_score: summary.sentiment_score,
        sentiment_trend,
        top_keywords: summary.top_keywords,
        engagement_score: summary.engagement_rate,
        recommended_actions,
        generated_at,
    }
}
