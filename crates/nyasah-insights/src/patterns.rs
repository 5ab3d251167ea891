//! Historical performance patterns and their recommendation text.
//!
//! Each detector buckets a set of proof events along one dimension and
//! measures how many of them cleared [`SUCCESS_THRESHOLD`]. Buckets live in
//! a `BTreeMap`, so the dominant bucket is deterministic: highest count
//! wins and ties go to the lexically smallest key.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use nyasah_core::{InsightCategory, Recommendation, SocialProofEvent};

/// Content detector only scans events whose engagement rate is above this.
pub const CONTENT_ENGAGEMENT_FLOOR: f64 = 0.7;
/// An event counts as a success when its engagement rate is above this.
pub const SUCCESS_THRESHOLD: f64 = 0.5;
/// Timing detector scans at most this many of the newest events.
pub const TIMING_SAMPLE_LIMIT: usize = 1000;
/// Sample size at which the volume term of [`confidence`] saturates.
const CONFIDENCE_SATURATION: f64 = 1000.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pattern {
    pub category: InsightCategory,
    pub sample_size: usize,
    /// Fraction of the sample above [`SUCCESS_THRESHOLD`].
    pub success_rate: f64,
    pub distribution: BTreeMap<String, usize>,
}

impl Pattern {
    fn from_events<F>(category: InsightCategory, events: &[SocialProofEvent], bucket: F) -> Self
    where
        F: Fn(&SocialProofEvent) -> String,
    {
        let mut distribution = BTreeMap::new();
        let mut successes = 0usize;
        for event in events {
            *distribution.entry(bucket(event)).or_insert(0) += 1;
            if event.performance.engagement_rate > SUCCESS_THRESHOLD {
                successes += 1;
            }
        }

        #[allow(clippy::cast_precision_loss)]
        let success_rate = if events.is_empty() {
            0.0
        } else {
            successes as f64 / events.len() as f64
        };

        Self {
            category,
            sample_size: events.len(),
            success_rate,
            distribution,
        }
    }

    #[must_use]
    pub fn confidence(&self) -> f64 {
        confidence(self.sample_size, self.success_rate)
    }

    /// The bucket with the highest count.
    #[must_use]
    pub fn dominant_bucket(&self) -> Option<&str> {
        let mut best: Option<(&str, usize)> = None;
        for (key, &count) in &self.distribution {
            if best.is_none_or(|(_, top)| count > top) {
                best = Some((key.as_str(), count));
            }
        }
        best.map(|(key, _)| key)
    }

    #[must_use]
    pub fn recommendation_text(&self) -> String {
        recommendation_text(self.category, self.dominant_bucket())
    }

    #[must_use]
    pub fn to_recommendation(&self, tenant_id: Uuid, now: DateTime<Utc>) -> Recommendation {
        Recommendation {
            tenant_id,
            category: self.category,
            suggestion: self.recommendation_text(),
            confidence: self.confidence(),
            created_at: now,
        }
    }
}

/// Media-type distribution of high-engagement events.
#[must_use]
pub fn analyze_content_pattern(events: &[SocialProofEvent]) -> Pattern {
    Pattern::from_events(InsightCategory::Content, events, |e| {
        e.media_type.as_str().to_string()
    })
}

/// Hour-of-day (UTC, two digits) distribution.
#[must_use]
pub fn analyze_timing_pattern(events: &[SocialProofEvent]) -> Pattern {
    Pattern::from_events(InsightCategory::Timing, events, |e| {
        e.created_at.format("%H").to_string()
    })
}

/// Event-kind distribution.
#[must_use]
pub fn analyze_placement_pattern(events: &[SocialProofEvent]) -> Pattern {
    Pattern::from_events(InsightCategory::Placement, events, |e| {
        e.kind.as_str().to_string()
    })
}

/// `clamp(min(sample / 1000, 1) * 0.4 + success_rate * 0.6, 0, 1)`.
#[must_use]
pub fn confidence(sample_size: usize, success_rate: f64) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let volume = (sample_size as f64 / CONFIDENCE_SATURATION).min(1.0);
    (volume * 0.4 + success_rate * 0.6).clamp(0.0, 1.0)
}

#[must_use]
pub fn recommendation_text(category: InsightCategory, dominant: Option<&str>) -> String {
    match (category, dominant) {
        (InsightCategory::Content, Some("image")) => {
            "Increase usage of visual content, particularly product images and customer photos"
                .to_string()
        }
        (InsightCategory::Content, Some("video")) => {
            "Focus on video content, such as customer testimonials and product demonstrations"
                .to_string()
        }
        (InsightCategory::Content, _) => {
            "Diversify your content mix with both visual and textual social proof".to_string()
        }
        (InsightCategory::Timing, Some(hour)) => format!(
            "Schedule social proof displays during peak engagement hours around {hour}:00"
        ),
        (InsightCategory::Timing, None) => {
            "Distribute social proof displays throughout the day".to_string()
        }
        (InsightCategory::Placement, Some("purchase")) => {
            "Emphasize recent purchase notifications to create urgency".to_string()
        }
        (InsightCategory::Placement, Some("review")) => {
            "Highlight customer reviews prominently on product pages".to_string()
        }
        (InsightCategory::Placement, Some("view")) => {
            "Display real-time viewer counts to show product popularity".to_string()
        }
        (InsightCategory::Placement, _) => {
            "Use a mix of social proof types across your site".to_string()
        }
    }
}
