//! Pattern mining over tenant history and free-text action generation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use nyasah_core::{Entity, GenerationSettings, Recommendation};
use nyasah_providers::Provider;

use crate::aggregator::InsightSummary;
use crate::cancel::cancellable;
use crate::error::InsightsError;
use crate::patterns::{
    analyze_content_pattern, analyze_placement_pattern, analyze_timing_pattern, Pattern,
    CONTENT_ENGAGEMENT_FLOOR, TIMING_SAMPLE_LIMIT,
};
use crate::repository::{ProofQuery, RecordRepository};
use crate::signals::parse_recommendations;

/// Returned by [`Recommender::generate_actions`] when the provider fails.
pub const FALLBACK_ACTIONS: [&str; 3] = [
    "Highlight positive reviews",
    "Add customer photos",
    "Display purchase notifications",
];

#[must_use]
pub fn fallback_actions() -> Vec<String> {
    FALLBACK_ACTIONS.iter().map(|s| (*s).to_string()).collect()
}

fn actions_prompt(entity: &Entity, summary: &InsightSummary, review_count: usize) -> String {
    format!(
        "Based on the following product insights, suggest specific actions to improve social proof and engagement:\n\n\
         Product: {}\n\
         Average Rating: {:.2}\n\
         Review Count: {}\n\
         Engagement Rate: {:.2}\n\n\
         Provide 3-5 specific, actionable recommendations:",
        entity.name, summary.average_rating, review_count, summary.engagement_rate
    )
}

/// Turns an entity summary into suggested actions via the provider.
#[derive(Clone)]
pub struct Recommender {
    provider: Arc<dyn Provider>,
    generation: GenerationSettings,
}

impl Recommender {
    #[must_use]
    pub fn new(provider: Arc<dyn Provider>, generation: GenerationSettings) -> Self {
        Self {
            provider,
            generation,
        }
    }

    /// Ask the provider for 3-5 actions for `entity`.
    ///
    /// A provider failure, or a reply with no usable lines, is logged and
    /// answered with [`FALLBACK_ACTIONS`] instead of an error.
    ///
    /// # Errors
    ///
    /// Only [`InsightsError::Cancelled`].
    pub async fn generate_actions(
        &self,
        entity: &Entity,
        summary: &InsightSummary,
        review_count: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, InsightsError> {
        let prompt = actions_prompt(entity, summary, review_count);
        let call = self.provider.generate_text(
            &prompt,
            self.generation.max_tokens,
            self.generation.temperature,
        );

        match cancellable(cancel, call).await {
            Ok(reply) => {
                let actions = parse_recommendations(&reply);
                if actions.is_empty() {
                    tracing::warn!(
                        entity = %entity.id,
                        "provider returned no usable actions, using fallback"
                    );
                    return Ok(fallback_actions());
                }
                Ok(actions)
            }
            Err(InsightsError::Provider(e)) => {
                tracing::warn!(
                    entity = %entity.id,
                    error = %e,
                    "action generation failed, using fallback"
                );
                Ok(fallback_actions())
            }
            Err(e) => Err(e),
        }
    }
}

/// Run the three detectors over `tenant_id`'s history.
///
/// Returned in content, timing, placement order.
///
/// # Errors
///
/// A repository failure, or [`InsightsError::Cancelled`].
pub async fn detect_patterns(
    repository: &dyn RecordRepository,
    tenant_id: Uuid,
    cancel: &CancellationToken,
) -> Result<Vec<Pattern>, InsightsError> {
    let (high_engagement, recent, all) = tokio::try_join!(
        cancellable(
            cancel,
            repository.tenant_proofs(tenant_id, ProofQuery::EngagementAbove(CONTENT_ENGAGEMENT_FLOOR)),
        ),
        cancellable(
            cancel,
            repository.tenant_proofs(tenant_id, ProofQuery::MostRecent(TIMING_SAMPLE_LIMIT)),
        ),
        cancellable(cancel, repository.tenant_proofs(tenant_id, ProofQuery::All)),
    )?;

    let patterns = vec![
        analyze_content_pattern(&high_engagement),
        analyze_timing_pattern(&recent),
        analyze_placement_pattern(&all),
    ];
    for pattern in &patterns {
        tracing::debug!(
            tenant = %tenant_id,
            category = %pattern.category,
            sample_size = pattern.sample_size,
            success_rate = pattern.success_rate,
            "detected pattern"
        );
    }
    Ok(patterns)
}

/// One recommendation per detected pattern, most confident first.
///
/// # Errors
///
/// A repository failure, or [`InsightsError::Cancelled`].
pub async fn generate_recommendations(
    repository: &dyn RecordRepository,
    tenant_id: Uuid,
    now: DateTime<Utc>,
    cancel: &CancellationToken,
) -> Result<Vec<Recommendation>, InsightsError> {
    let mut recommendations: Vec<Recommendation> = detect_patterns(repository, tenant_id, cancel)
        .await?
        .iter()
        .map(|p| p.to_recommendation(tenant_id, now))
        .collect();
    recommendations.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    Ok(recommendations)
}
