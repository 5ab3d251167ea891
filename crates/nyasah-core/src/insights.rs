//! Results the engine hands back to its caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The dimension a mined pattern (and its recommendation) is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightCategory {
    Content,
    Timing,
    Placement,
}

impl InsightCategory {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            InsightCategory::Content => "content",
            InsightCategory::Timing => "timing",
            InsightCategory::Placement => "placement",
        }
    }
}

impl std::fmt::Display for InsightCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A confidence-scored suggestion, persisted by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub tenant_id: Uuid,
    pub category: InsightCategory,
    pub suggestion: String,
    /// Blend of sample size and success rate, in [0.0, 1.0].
    pub confidence: f64,
    pub created_at: DateTime<Utc>,
}

/// Point-in-time analytics for one entity.
///
/// Replaces any previously cached snapshot for the same entity; it has no
/// identity of its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightsSnapshot {
    pub entity_id: Uuid,
    /// Mean star rating. 0.0 when the entity has no reviews.
    pub average_rating: f64,
    /// Mean stored review sentiment. 0.0 when the entity has no reviews.
    pub sentiment_score: f64,
    /// Per-frame mean sentiment; index 0 is the most recent frame.
    pub sentiment_trend: Vec<f64>,
    /// At most five keywords, most frequent first.
    pub top_keywords: Vec<String>,
    pub engagement_score: f64,
    pub recommended_actions: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

/// Sentiment and keywords derived for one review, for the caller to store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewEnrichment {
    pub review_id: Uuid,
    pub sentiment: f64,
    pub keywords: Vec<String>,
}

/// A free-form query and the provider's answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryAnswer {
    pub tenant_id: Uuid,
    pub query: String,
    pub response: String,
}
