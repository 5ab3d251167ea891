//! Pure signal arithmetic over review and proof-event sets.
//!
//! Nothing here fails: empty inputs and zero denominators resolve to `0.0`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use nyasah_core::{Review, SocialProofEvent};

/// Keyword budget for content analysis.
pub const CONTENT_KEYWORD_LIMIT: usize = 10;
/// Keyword budget for per-entity insight summaries.
pub const SUMMARY_KEYWORD_LIMIT: usize = 5;

/// One keyword and how many times it was seen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordCount {
    pub keyword: String,
    pub count: usize,
}

#[allow(clippy::cast_precision_loss)]
fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    numerator as f64 / denominator as f64
}

#[allow(clippy::cast_precision_loss)]
fn mean(sum: f64, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    sum / count as f64
}

/// `(likes + shares) / views`, or `0.0` when the review has no views.
#[must_use]
pub fn review_engagement(review: &Review) -> f64 {
    let e = review.engagement;
    ratio(e.likes.saturating_add(e.shares), e.views)
}

/// `conversions / views`, or `0.0` when the event has no views.
#[must_use]
pub fn proof_engagement(proof: &SocialProofEvent) -> f64 {
    ratio(proof.performance.conversions, proof.performance.views)
}

/// Mean stored sentiment across `reviews`.
#[must_use]
pub fn average_sentiment(reviews: &[Review]) -> f64 {
    mean(reviews.iter().map(|r| r.sentiment).sum(), reviews.len())
}

/// Mean engagement ratio across every review and event, zero-view records included.
#[must_use]
pub fn average_engagement(reviews: &[Review], proofs: &[SocialProofEvent]) -> f64 {
    let total: f64 = reviews.iter().map(review_engagement).sum::<f64>()
        + proofs.iter().map(proof_engagement).sum::<f64>();
    mean(total, reviews.len() + proofs.len())
}

#[must_use]
pub fn average(scores: &[f64]) -> f64 {
    mean(scores.iter().sum(), scores.len())
}

/// Count keyword occurrences, most frequent first.
///
/// Ties keep first-seen order.
pub fn tally_keywords<I, S>(keywords: I) -> Vec<KeywordCount>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<KeywordCount> = Vec::new();

    for keyword in keywords {
        let keyword = keyword.as_ref();
        if let Some(&slot) = index.get(keyword) {
            counts[slot].count += 1;
        } else {
            index.insert(keyword.to_string(), counts.len());
            counts.push(KeywordCount {
                keyword: keyword.to_string(),
                count: 1,
            });
        }
    }

    // sort_by is stable, which is what preserves first-seen order on ties.
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// The `limit` most frequent keywords.
pub fn top_keywords<I, S>(keywords: I, limit: usize) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tally_keywords(keywords)
        .into_iter()
        .take(limit)
        .map(|kc| kc.keyword)
        .collect()
}

/// Split a comma-separated model reply into trimmed, non-empty phrases.
#[must_use]
pub fn parse_keywords(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split a free-text model reply into one suggestion per line.
///
/// Leading list markers (`1.`, `2)`, `-`, `*`, `•`) are stripped and blank
/// lines dropped.
#[must_use]
pub fn parse_recommendations(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| {
            line.trim()
                .trim_start_matches(|c: char| {
                    c.is_ascii_digit() || matches!(c, '.' | ')' | '-' | '*' | '•') || c.is_whitespace()
                })
                .trim_end()
        })
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use nyasah_core::{MediaType, ProofKind, ProofPerformance, ReviewEngagement};
    use uuid::Uuid;

    use super::*;

    fn review(sentiment: f64, views: u64, likes: u64, shares: u64) -> Review {
        Review {
            id: Uuid::new_v4(),
            entity_id: Uuid::nil(),
            tenant_id: Uuid::nil(),
            rating: 4,
            content: String::new(),
            verified: false,
            sentiment,
            keywords: Vec::new(),
            engagement: ReviewEngagement {
                views,
                likes,
                shares,
            },
            created_at: Utc::now(),
        }
    }

    fn proof(views: u64, conversions: u64) -> SocialProofEvent {
        SocialProofEvent {
            id: Uuid::new_v4(),
            tenant_id: Uuid::nil(),
            entity_id: Uuid::nil(),
            kind: ProofKind::Purchase,
            media_type: MediaType::Text,
            content: String::new(),
            performance: ProofPerformance {
                views,
                conversions,
                engagement_rate: 0.0,
            },
            created_at: Utc::now(),
        }
    }

    #[test]
    fn review_engagement_zero_views_is_zero() {
        assert_eq!(review_engagement(&review(0.0, 0, 10, 10)), 0.0);
    }

    #[test]
    fn review_engagement_stays_in_unit_range() {
        for (views, likes, shares) in [(10, 0, 0), (10, 3, 2), (10, 6, 4), (1, 1, 0), (1000, 999, 1)] {
            let e = review_engagement(&review(0.0, views, likes, shares));
            assert!((0.0..=1.0).contains(&e), "ratio {e} out of range for {views}/{likes}/{shares}");
        }
        assert!((review_engagement(&review(0.0, 10, 3, 2)) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn proof_engagement_guards_zero_views() {
        assert_eq!(proof_engagement(&proof(0, 5)), 0.0);
        assert!((proof_engagement(&proof(20, 5)) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn average_sentiment_empty_is_zero() {
        assert_eq!(average_sentiment(&[]), 0.0);
    }

    #[test]
    fn average_sentiment_ignores_order() {
        let a = vec![review(0.8, 0, 0, 0), review(0.1, 0, 0, 0), review(0.5, 0, 0, 0)];
        let mut b = a.clone();
        b.reverse();
        let avg = average_sentiment(&a);
        assert!((avg - 1.4 / 3.0).abs() < 1e-12);
        assert!((avg - average_sentiment(&b)).abs() < 1e-12);
    }

    #[test]
    fn average_engagement_counts_zero_view_records() {
        let reviews = vec![review(0.0, 10, 5, 5), review(0.0, 0, 0, 0)];
        let proofs = vec![proof(10, 5)];
        // (1.0 + 0.0 + 0.5) / 3
        assert!((average_engagement(&reviews, &proofs) - 0.5).abs() < 1e-12);
        assert_eq!(average_engagement(&[], &[]), 0.0);
    }

    #[test]
    fn average_of_scores() {
        assert_eq!(average(&[]), 0.0);
        assert!((average(&[0.2, 0.4]) - 0.3).abs() < 1e-12);
    }

    #[test]
    fn tally_breaks_ties_by_first_seen() {
        let counts = tally_keywords(["price", "quality", "shipping", "quality", "price", "support"]);
        let order: Vec<&str> = counts.iter().map(|c| c.keyword.as_str()).collect();
        assert_eq!(order, vec!["price", "quality", "shipping", "support"]);
        assert_eq!(counts[0].count, 2);
        assert_eq!(counts[2].count, 1);
    }

    #[test]
    fn top_keywords_never_exceeds_limit() {
        let words: Vec<String> = (0..20).map(|i| format!("kw{i}")).collect();
        assert_eq!(top_keywords(&words, CONTENT_KEYWORD_LIMIT).len(), 10);
        assert_eq!(top_keywords(&words, SUMMARY_KEYWORD_LIMIT).len(), 5);
        assert_eq!(top_keywords(["a", "b"], SUMMARY_KEYWORD_LIMIT), vec!["a", "b"]);
    }

    #[test]
    fn parse_keywords_trims_and_drops_empty() {
        assert_eq!(
            parse_keywords(" fast shipping, ,great value ,, support\n"),
            vec!["fast shipping", "great value", "support"]
        );
        assert!(parse_keywords("  ").is_empty());
    }

    #[test]
    fn parse_recommendations_strips_numbering() {
        let reply = "Here are some ideas:\n\n1. Feature video testimonials\n2) Show live viewer counts\n- Add review photos\n";
        assert_eq!(
            parse_recommendations(reply),
            vec![
                "Here are some ideas:",
                "Feature video testimonials",
                "Show live viewer counts",
                "Add review photos"
            ]
        );
    }
}
