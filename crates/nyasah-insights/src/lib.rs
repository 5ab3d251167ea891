//! Insights and recommendation engine.
//!
//! Turns tenant-scoped reviews and social proof events into sentiment,
//! keyword and engagement signals, fixed-width trend series, per-entity
//! snapshots, and confidence-ranked recommendations. Records come in
//! through [`RecordRepository`]; model inference goes out through a
//! [`nyasah_providers::Provider`]. [`InsightsEngine`] ties the two together.

pub mod aggregator;
pub mod analyzers;
pub mod engine;
pub mod error;
pub mod patterns;
pub mod performers;
pub mod recommender;
pub mod repository;
pub mod signals;
pub mod timeframe;
pub mod types;

mod cancel;

pub use aggregator::InsightSummary;
pub use analyzers::{ContentAnalyzer, EngagementAnalyzer, KeywordAnalyzer, SentimentAnalyzer};
pub use engine::InsightsEngine;
pub use error::InsightsError;
pub use patterns::Pattern;
pub use performers::{PerformerKind, TopPerformer};
pub use recommender::{Recommender, FALLBACK_ACTIONS};
pub use repository::{Dataset, InMemoryRepository, ProofQuery, RecordRepository, RepositoryError};
pub use signals::KeywordCount;
pub use timeframe::{FrameWindow, TimeFrame};
pub use types::{EngagementTrend, KeywordTrend, SentimentTrend, TrendReport};
