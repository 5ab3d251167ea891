//! Read-only access to stored records.
//!
//! The persistence layer lives outside this crate. Analysis code only sees
//! the [`RecordRepository`] trait, which the caller implements over its own
//! store. [`InMemoryRepository`] backs the CLI and the tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use nyasah_core::{Entity, Review, SocialProofEvent};

/// Opaque failure reported by a repository implementation.
#[derive(Debug, Error)]
#[error("repository error: {0}")]
pub struct RepositoryError(pub String);

/// Which of a tenant's proof events a pattern detector scans.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProofQuery {
    /// Events whose `performance.engagement_rate` is strictly above the bound.
    EngagementAbove(f64),
    /// The `n` most recently created events.
    MostRecent(usize),
    All,
}

/// Tenant-scoped record queries.
///
/// Results are assumed already validated and tenant-scoped; the engine does
/// no authorization of its own. Range queries are half-open `[start, end)`.
#[async_trait]
pub trait RecordRepository: Send + Sync {
    async fn entity(&self, entity_id: Uuid) -> Result<Option<Entity>, RepositoryError>;

    async fn entity_reviews(&self, entity_id: Uuid) -> Result<Vec<Review>, RepositoryError>;

    async fn entity_proofs(
        &self,
        entity_id: Uuid,
    ) -> Result<Vec<SocialProofEvent>, RepositoryError>;

    async fn tenant_reviews_between(
        &self,
        tenant_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Review>, RepositoryError>;

    async fn tenant_proofs_between(
        &self,
        tenant_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<SocialProofEvent>, RepositoryError>;

    async fn tenant_proofs(
        &self,
        tenant_id: Uuid,
        query: ProofQuery,
    ) -> Result<Vec<SocialProofEvent>, RepositoryError>;
}

/// A full record dump, as loaded from a JSON file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub reviews: Vec<Review>,
    #[serde(default)]
    pub proof_events: Vec<SocialProofEvent>,
}

/// Vector-backed repository. Answers every query with a linear scan.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    entities: Vec<Entity>,
    reviews: Vec<Review>,
    proofs: Vec<SocialProofEvent>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new(
        entities: Vec<Entity>,
        reviews: Vec<Review>,
        proofs: Vec<SocialProofEvent>,
    ) -> Self {
        Self {
            entities,
            reviews,
            proofs,
        }
    }

    #[must_use]
    pub fn from_dataset(dataset: Dataset) -> Self {
        Self::new(dataset.entities, dataset.reviews, dataset.proof_events)
    }
}

fn in_range(at: DateTime<Utc>, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
    start <= at && at < end
}

#[async_trait]
impl RecordRepository for InMemoryRepository {
    async fn entity(&self, entity_id: Uuid) -> Result<Option<Entity>, RepositoryError> {
        Ok(self.entities.iter().find(|e| e.id == entity_id).cloned())
    }

    async fn entity_reviews(&self, entity_id: Uuid) -> Result<Vec<Review>, RepositoryError> {
        Ok(self
            .reviews
            .iter()
            .filter(|r| r.entity_id == entity_id)
            .cloned()
            .collect())
    }

    async fn entity_proofs(
        &self,
        entity_id: Uuid,
    ) -> Result<Vec<SocialProofEvent>, RepositoryError> {
        Ok(self
            .proofs
            .iter()
            .filter(|p| p.entity_id == entity_id)
            .cloned()
            .collect())
    }

    async fn tenant_reviews_between(
        &self,
        tenant_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Review>, RepositoryError> {
        Ok(self
            .reviews
            .iter()
            .filter(|r| r.tenant_id == tenant_id && in_range(r.created_at, start, end))
            .cloned()
            .collect())
    }

    async fn tenant_proofs_between(
        &self,
        tenant_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<SocialProofEvent>, RepositoryError> {
        Ok(self
            .proofs
            .iter()
            .filter(|p| p.tenant_id == tenant_id && in_range(p.created_at, start, end))
            .cloned()
            .collect())
    }

    async fn tenant_proofs(
        &self,
        tenant_id: Uuid,
        query: ProofQuery,
    ) -> Result<Vec<SocialProofEvent>, RepositoryError> {
        let tenant = self.proofs.iter().filter(|p| p.tenant_id == tenant_id);
        let events = match query {
            ProofQuery::EngagementAbove(bound) => tenant
                .filter(|p| p.performance.engagement_rate > bound)
                .cloned()
                .collect(),
            ProofQuery::MostRecent(limit) => {
                let mut events: Vec<SocialProofEvent> = tenant.cloned().collect();
                events.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                events.truncate(limit);
                events
            }
            ProofQuery::All => tenant.cloned().collect(),
        };
        Ok(events)
    }
}
