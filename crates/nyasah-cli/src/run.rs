//! Command execution. Every command prints one pretty JSON document.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use nyasah_core::{EngineConfig, Review};
use nyasah_insights::{Dataset, InMemoryRepository, InsightsEngine};

use crate::Commands;

/// Read a dataset file, or an empty dataset when no path is given.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid dataset JSON.
pub(crate) fn load_dataset(path: Option<&Path>) -> anyhow::Result<Dataset> {
    let Some(path) = path else {
        return Ok(Dataset::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read dataset {}", path.display()))?;
    parse_dataset(&raw).with_context(|| format!("invalid dataset {}", path.display()))
}

pub(crate) fn parse_dataset(raw: &str) -> anyhow::Result<Dataset> {
    Ok(serde_json::from_str(raw)?)
}

/// Reviews to enrich: all of them, or one entity's.
pub(crate) fn select_reviews(dataset: &Dataset, entity: Option<uuid::Uuid>) -> Vec<Review> {
    dataset
        .reviews
        .iter()
        .filter(|r| entity.is_none_or(|id| r.entity_id == id))
        .cloned()
        .collect()
}

fn to_json<T: Serialize>(value: &T) -> anyhow::Result<String> {
    serde_json::to_string_pretty(value).context("failed to render output")
}

/// Build the engine over `data_path` and run `command`.
///
/// # Errors
///
/// Returns an error on dataset, provider construction, or analysis failure.
pub(crate) async fn execute(
    config: &EngineConfig,
    data_path: Option<&Path>,
    command: Commands,
    cancel: &CancellationToken,
) -> anyhow::Result<String> {
    let dataset = load_dataset(data_path)?;
    tracing::debug!(
        entities = dataset.entities.len(),
        reviews = dataset.reviews.len(),
        proof_events = dataset.proof_events.len(),
        "dataset loaded"
    );

    let enrich_targets = match &command {
        Commands::Enrich { entity } => select_reviews(&dataset, *entity),
        _ => Vec::new(),
    };

    let repository = Arc::new(InMemoryRepository::from_dataset(dataset));
    let engine = InsightsEngine::new(config, repository)?;

    match command {
        Commands::Query { tenant, text } => {
            to_json(&engine.process_query(tenant, &text, cancel).await?)
        }
        Commands::Insights { entity } => {
            to_json(&engine.generate_entity_insights(entity, cancel).await?)
        }
        Commands::Actions { entity } => to_json(&engine.generate_actions(entity, cancel).await?),
        Commands::Recommend { tenant } => {
            to_json(&engine.generate_recommendations(tenant, cancel).await?)
        }
        Commands::Trends { tenant } => to_json(&engine.analyze_trends(tenant, cancel).await?),
        Commands::Enrich { .. } => {
            to_json(&engine.enrich_reviews(&enrich_targets, cancel).await?)
        }
    }
}
