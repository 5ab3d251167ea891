//! Shared domain records and configuration for the nyasah insights engine.
//!
//! The persistence and HTTP layers own reviews, social proof events and
//! entities; this crate only describes their shape so the engine can read
//! them and hand back derived results.

pub mod config;
pub mod engine_config;
pub mod insights;
pub mod records;

use thiserror::Error;

pub use config::{build_engine_config, load_engine_config, load_engine_config_from_env};
pub use config::load_provider_config;
pub use engine_config::{EngineConfig, GenerationSettings, HttpSettings, ProviderConfig};
pub use insights::{
    InsightCategory, InsightsSnapshot, QueryAnswer, Recommendation, ReviewEnrichment,
};
pub use records::{
    Entity, MediaType, ProofKind, ProofPerformance, Review, ReviewEngagement, SocialProofEvent,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read provider config {path}: {source}")]
    ProviderFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse provider config: {0}")]
    ProviderFileParse(#[from] serde_yaml::Error),
}
