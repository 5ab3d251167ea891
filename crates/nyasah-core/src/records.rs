//! Records supplied by the persistence layer.
//!
//! These are read immutably by the engine. Derived values (sentiment,
//! keywords) are returned separately so the caller decides what to store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A tenant-owned object that reviews and proof events attach to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Engagement counters recorded against a review.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewEngagement {
    pub views: u64,
    pub likes: u64,
    pub shares: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub entity_id: Uuid,
    pub tenant_id: Uuid,
    /// Star rating, 1 through 5.
    pub rating: u8,
    pub content: String,
    #[serde(default)]
    pub verified: bool,
    /// Previously derived sentiment in [-1.0, 1.0]; 0.0 until analyzed.
    #[serde(default)]
    pub sentiment: f64,
    /// Previously extracted keywords; empty until analyzed.
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub engagement: ReviewEngagement,
    pub created_at: DateTime<Utc>,
}

/// The user action a social proof event records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProofKind {
    Purchase,
    Review,
    View,
    Enrollment,
}

impl ProofKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ProofKind::Purchase => "purchase",
            ProofKind::Review => "review",
            ProofKind::View => "view",
            ProofKind::Enrollment => "enrollment",
        }
    }
}

impl std::fmt::Display for ProofKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
    Text,
}

impl MediaType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
            MediaType::Text => "text",
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display performance recorded against a proof event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProofPerformance {
    pub views: u64,
    pub conversions: u64,
    /// Fraction of displays that produced an interaction, in [0.0, 1.0].
    pub engagement_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialProofEvent {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub entity_id: Uuid,
    pub kind: ProofKind,
    pub media_type: MediaType,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub performance: ProofPerformance,
    pub created_at: DateTime<Utc>,
}
