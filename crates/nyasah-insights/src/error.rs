use thiserror::Error;
use uuid::Uuid;

use nyasah_providers::ProviderError;

use crate::repository::RepositoryError;

/// Any failure surfaced by an analysis operation.
///
/// Callers typically render all of these as a generic "analysis failed".
#[derive(Debug, Error)]
pub enum InsightsError {
    #[error("analysis failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("analysis failed: {0}")]
    Repository(#[from] RepositoryError),

    #[error("analysis cancelled")]
    Cancelled,

    #[error("entity {0} not found")]
    EntityNotFound(Uuid),
}
