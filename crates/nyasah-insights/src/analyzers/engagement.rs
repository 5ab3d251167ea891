use nyasah_core::{Review, SocialProofEvent};

use super::windows_of;
use crate::signals::{average_engagement, proof_engagement, review_engagement};
use crate::timeframe::TimeFrame;
use crate::types::EngagementTrend;

/// Engagement arithmetic. Makes no provider calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct EngagementAnalyzer;

impl EngagementAnalyzer {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Mean of one review's and one event's engagement ratios.
    #[must_use]
    pub fn analyze(&self, review: &Review, proof: &SocialProofEvent) -> f64 {
        (review_engagement(review) + proof_engagement(proof)) / 2.0
    }

    #[must_use]
    pub fn trend(&self, frames: &[TimeFrame]) -> EngagementTrend {
        EngagementTrend {
            frames: windows_of(frames),
            averages: frames
                .iter()
                .map(|f| average_engagement(&f.reviews, &f.proofs))
                .collect(),
        }
    }
}
