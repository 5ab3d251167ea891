//! Fixed-width historical windows and record bucketing.
//!
//! Windows are generated newest first: frame 0 ends at `now`, frame 1 ends
//! where frame 0 starts, and so on. Each window is half-open `[start, end)`,
//! so contiguous windows never share a timestamp.

use chrono::{DateTime, TimeDelta, Utc};
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use nyasah_core::{Review, SocialProofEvent};

use crate::cancel::cancellable;
use crate::error::InsightsError;
use crate::repository::RecordRepository;

pub const DEFAULT_FRAME_COUNT: usize = 12;
pub const DEFAULT_FRAME_DAYS: u32 = 7;

/// Half-open interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl FrameWindow {
    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at < self.end
    }
}

/// A window plus the records whose creation time falls inside it.
#[derive(Debug, Clone)]
pub struct TimeFrame {
    pub window: FrameWindow,
    pub reviews: Vec<Review>,
    pub proofs: Vec<SocialProofEvent>,
}

impl TimeFrame {
    #[must_use]
    pub fn empty(window: FrameWindow) -> Self {
        Self {
            window,
            reviews: Vec::new(),
            proofs: Vec::new(),
        }
    }
}

/// `count` contiguous windows of `width`, ending at `now` and walking backward.
///
/// The series stops early at the first window whose start falls outside the
/// representable date range.
#[must_use]
pub fn frame_windows(now: DateTime<Utc>, count: usize, width: TimeDelta) -> Vec<FrameWindow> {
    let mut windows = Vec::with_capacity(count.min(1024));
    let mut end = now;
    for _ in 0..count {
        let Some(start) = end.checked_sub_signed(width) else {
            tracing::warn!(
                requested = count,
                built = windows.len(),
                "frame window underflows the date range, truncating series"
            );
            break;
        };
        windows.push(FrameWindow { start, end });
        end = start;
    }
    windows
}

/// The default trend layout: twelve 7-day windows ending at `now`.
#[must_use]
pub fn default_windows(now: DateTime<Utc>) -> Vec<FrameWindow> {
    frame_windows(
        now,
        DEFAULT_FRAME_COUNT,
        TimeDelta::days(i64::from(DEFAULT_FRAME_DAYS)),
    )
}

fn frame_index(windows: &[FrameWindow], at: DateTime<Utc>) -> Option<usize> {
    windows.iter().position(|w| w.contains(at))
}

/// Distribute records into `windows`. Records outside every window are dropped.
#[must_use]
pub fn group_by_time_frames(
    windows: &[FrameWindow],
    reviews: &[Review],
    proofs: &[SocialProofEvent],
) -> Vec<TimeFrame> {
    let mut frames: Vec<TimeFrame> = windows.iter().copied().map(TimeFrame::empty).collect();

    for review in reviews {
        if let Some(i) = frame_index(windows, review.created_at) {
            frames[i].reviews.push(review.clone());
        }
    }
    for proof in proofs {
        if let Some(i) = frame_index(windows, proof.created_at) {
            frames[i].proofs.push(proof.clone());
        }
    }

    frames
}

/// Fetch each window's tenant records from `repository`.
///
/// Windows are fetched concurrently (at most `concurrency` at a time) and
/// returned in window order. Any failed fetch fails the whole load.
///
/// # Errors
///
/// Returns [`InsightsError::Repository`] on a failed fetch or
/// [`InsightsError::Cancelled`] if `cancel` fires first.
pub async fn load_time_frames(
    repository: &dyn RecordRepository,
    tenant_id: Uuid,
    windows: &[FrameWindow],
    concurrency: usize,
    cancel: &CancellationToken,
) -> Result<Vec<TimeFrame>, InsightsError> {
    stream::iter(windows.iter().copied())
        .map(|window| async move {
            let (reviews, proofs) = tokio::try_join!(
                cancellable(
                    cancel,
                    repository.tenant_reviews_between(tenant_id, window.start, window.end)
                ),
                cancellable(
                    cancel,
                    repository.tenant_proofs_between(tenant_id, window.start, window.end)
                ),
            )?;

            // Enforce the half-open rule even if a repository's range is inclusive.
            let reviews: Vec<Review> = reviews
                .into_iter()
                .filter(|r| window.contains(r.created_at))
                .collect();
            let proofs: Vec<SocialProofEvent> = proofs
                .into_iter()
                .filter(|p| window.contains(p.created_at))
                .collect();

            tracing::debug!(
                tenant = %tenant_id,
                start = %window.start,
                reviews = reviews.len(),
                proofs = proofs.len(),
                "loaded time frame"
            );
            Ok::<_, InsightsError>(TimeFrame {
                window,
                reviews,
                proofs,
            })
        })
        .buffered(concurrency.max(1))
        .try_collect()
        .await
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use nyasah_core::ReviewEngagement;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn review_at(at: DateTime<Utc>) -> Review {
        Review {
            id: Uuid::new_v4(),
            entity_id: Uuid::nil(),
            tenant_id: Uuid::nil(),
            rating: 5,
            content: String::new(),
            verified: true,
            sentiment: 0.0,
            keywords: Vec::new(),
            engagement: ReviewEngagement::default(),
            created_at: at,
        }
    }

    fn ids(frame: &TimeFrame) -> Vec<Uuid> {
        let mut ids: Vec<Uuid> = frame.reviews.iter().map(|r| r.id).collect();
        ids.sort();
        ids
    }

    #[test]
    fn default_windows_are_contiguous_newest_first() {
        let windows = default_windows(now());
        assert_eq!(windows.len(), 12);
        assert_eq!(windows[0].end, now());
        assert_eq!(windows[0].start, now() - TimeDelta::days(7));
        for pair in windows.windows(2) {
            assert_eq!(pair[1].end, pair[0].start, "windows must be contiguous");
        }
        assert_eq!(windows[11].start, now() - TimeDelta::days(84));
    }

    #[test]
    fn oversized_width_truncates_instead_of_overflowing() {
        let windows = frame_windows(now(), 12, TimeDelta::days(200_000_000));
        assert!(windows.is_empty());

        let windows = frame_windows(now(), 12, TimeDelta::days(36_500_000));
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].end, now());
        assert_eq!(windows[1].end, windows[0].start);
    }

    #[test]
    fn records_outside_all_windows_are_dropped() {
        let windows = default_windows(now());
        let reviews = vec![
            review_at(now() - TimeDelta::days(100)),
            review_at(now() + TimeDelta::hours(1)),
            review_at(now() - TimeDelta::hours(1)),
        ];
        let frames = group_by_time_frames(&windows, &reviews, &[]);
        let placed: usize = frames.iter().map(|f| f.reviews.len()).sum();
        assert_eq!(placed, 1);
        assert_eq!(frames[0].reviews.len(), 1);
    }

    #[test]
    fn boundary_record_lands_in_the_frame_it_starts() {
        let windows = default_windows(now());
        let boundary = windows[0].start;
        let frames = group_by_time_frames(&windows, &[review_at(boundary)], &[]);
        assert_eq!(frames[0].reviews.len(), 1);
        assert!(frames[1].reviews.is_empty());
    }

    #[test]
    fn record_at_now_is_outside_frame_zero() {
        let windows = default_windows(now());
        let frames = group_by_time_frames(&windows, &[review_at(now())], &[]);
        assert!(frames.iter().all(|f| f.reviews.is_empty()));
    }

    #[test]
    fn rebucketing_a_union_is_idempotent() {
        let windows = default_windows(now());
        let reviews: Vec<Review> = (0..40)
            .map(|h| review_at(now() - TimeDelta::hours(h * 9 + 1)))
            .collect();
        let frames = group_by_time_frames(&windows, &reviews, &[]);

        let union: Vec<Review> = frames[2]
            .reviews
            .iter()
            .chain(frames[3].reviews.iter())
            .cloned()
            .collect();
        let rebucketed = group_by_time_frames(&windows, &union, &[]);

        assert_eq!(ids(&rebucketed[2]), ids(&frames[2]));
        assert_eq!(ids(&rebucketed[3]), ids(&frames[3]));
        for (i, frame) in rebucketed.iter().enumerate() {
            if i != 2 && i != 3 {
                assert!(frame.reviews.is_empty());
            }
        }
    }
}
