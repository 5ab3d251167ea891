//! Typed trend results. Every series is parallel to its `frames`, with
//! index 0 the most recent window.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::performers::TopPerformer;
use crate::signals::KeywordCount;
use crate::timeframe::FrameWindow;

/// Mean provider-scored sentiment per frame. Empty frames score `0.0`.
#[derive(Debug, Clone, Serialize)]
pub struct SentimentTrend {
    pub frames: Vec<FrameWindow>,
    pub averages: Vec<f64>,
}

/// Mean engagement ratio per frame across reviews and proof events.
#[derive(Debug, Clone, Serialize)]
pub struct EngagementTrend {
    pub frames: Vec<FrameWindow>,
    pub averages: Vec<f64>,
}

/// Keyword frequency table per frame, most frequent first.
#[derive(Debug, Clone, Serialize)]
pub struct KeywordTrend {
    pub frames: Vec<FrameWindow>,
    pub frequencies: Vec<Vec<KeywordCount>>,
}

/// Combined trend report for one tenant.
#[derive(Debug, Clone, Serialize)]
pub struct TrendReport {
    pub tenant_id: Uuid,
    pub sentiment: SentimentTrend,
    pub engagement: EngagementTrend,
    pub keywords: KeywordTrend,
    pub top_performers: Vec<TopPerformer>,
    pub analyzed_at: DateTime<Utc>,
}
