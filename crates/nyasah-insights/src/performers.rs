use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use nyasah_core::{ProofKind, Review, SocialProofEvent};

use crate::signals::{proof_engagement, review_engagement};

pub const TOP_PERFORMER_LIMIT: usize = 10;

/// What a ranked record is. Proof events keep their own event type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformerKind {
    Review,
    SocialProof(ProofKind),
}

impl PerformerKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PerformerKind::Review => "review",
            PerformerKind::SocialProof(kind) => kind.as_str(),
        }
    }
}

/// A single record ranked by its engagement ratio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopPerformer {
    pub kind: PerformerKind,
    pub id: Uuid,
    /// Ranking key: `(likes + shares) / views` for reviews, `conversions / views` for events.
    pub score: f64,
    pub content: String,
    /// Reported engagement: the review ratio, or the event's stored `engagement_rate`.
    pub engagement: f64,
    pub created_on: NaiveDate,
}

/// The best-engaging reviews and events, highest score first.
///
/// Reviews are ranked ahead of events on equal scores, then input order.
#[must_use]
pub fn top_performers(reviews: &[Review], proofs: &[SocialProofEvent]) -> Vec<TopPerformer> {
    let mut ranked: Vec<TopPerformer> = reviews
        .iter()
        .map(|r| {
            let ratio = review_engagement(r);
            TopPerformer {
                kind: PerformerKind::Review,
                id: r.id,
                score: ratio,
                content: r.content.clone(),
                engagement: ratio,
                created_on: r.created_at.date_naive(),
            }
        })
        .chain(proofs.iter().map(|p| TopPerformer {
            kind: PerformerKind::SocialProof(p.kind),
            id: p.id,
            score: proof_engagement(p),
            content: p.content.clone(),
            engagement: p.performance.engagement_rate,
            created_on: p.created_at.date_naive(),
        }))
        .collect();

    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked.truncate(TOP_PERFORMER_LIMIT);
    ranked
}
