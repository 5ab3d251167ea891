//! Analyzers turn raw records into one category of derived signal each.
//!
//! All provider-backed work fans out through order-preserving `buffered`
//! streams capped at the analyzer's concurrency. The first failure aborts
//! the whole call; no analyzer returns partial results.

use crate::timeframe::{FrameWindow, TimeFrame};

pub mod content;
pub mod engagement;
pub mod keyword;
pub mod sentiment;

pub use content::ContentAnalyzer;
pub use engagement::EngagementAnalyzer;
pub use keyword::KeywordAnalyzer;
pub use sentiment::SentimentAnalyzer;

/// In-flight provider calls per analyzer when none is configured.
pub const DEFAULT_CONCURRENCY: usize = 4;

fn windows_of(frames: &[TimeFrame]) -> Vec<FrameWindow> {
    frames.iter().map(|f| f.window).collect()
}
