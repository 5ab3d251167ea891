//! End-to-end tests for the engine facade, using a scripted in-process
//! provider and the in-memory repository.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use nyasah_core::{
    EngineConfig, Entity, HttpSettings, InsightCategory, MediaType, ProofKind, ProofPerformance,
    ProviderConfig, Review, ReviewEngagement, SocialProofEvent,
};
use nyasah_insights::{
    ContentAnalyzer, InMemoryRepository, InsightsEngine, InsightsError, PerformerKind,
    FALLBACK_ACTIONS,
};
use nyasah_providers::{Provider, ProviderError};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Answers from fixed tables keyed by review content.
#[derive(Default)]
struct ScriptedProvider {
    name: &'static str,
    sentiments: HashMap<String, f64>,
    keywords: HashMap<String, String>,
    generated: Option<String>,
    fail_sentiment_for: Option<String>,
}

impl ScriptedProvider {
    fn named(name: &'static str) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    fn sentiment(mut self, text: &str, score: f64) -> Self {
        self.sentiments.insert(text.to_string(), score);
        self
    }

    fn keywords(mut self, text: &str, reply: &str) -> Self {
        self.keywords.insert(text.to_string(), reply.to_string());
        self
    }

    fn generates(mut self, reply: &str) -> Self {
        self.generated = Some(reply.to_string());
        self
    }

    fn failing_sentiment_for(mut self, text: &str) -> Self {
        self.fail_sentiment_for = Some(text.to_string());
        self
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    async fn process_query(&self, query: &str) -> Result<String, ProviderError> {
        if query.starts_with("Extract key phrases") {
            let reply = self
                .keywords
                .iter()
                .find(|(text, _)| query.contains(&format!("\"\"\"{text}\"\"\"")))
                .map(|(_, reply)| reply.clone())
                .unwrap_or_default();
            return Ok(reply);
        }
        Ok(format!("{} answered", self.name))
    }

    async fn analyze_sentiment(&self, text: &str) -> Result<f64, ProviderError> {
        if self.fail_sentiment_for.as_deref() == Some(text) {
            return Err(ProviderError::Status {
                provider: "scripted",
                status: 503,
            });
        }
        Ok(self.sentiments.get(text).copied().unwrap_or(0.0))
    }

    async fn generate_text(
        &self,
        _prompt: &str,
        _max_tokens: u32,
        _temperature: f64,
    ) -> Result<String, ProviderError> {
        self.generated
            .clone()
            .ok_or(ProviderError::NoResponse {
                provider: "scripted",
            })
    }
}

/// Never answers.
struct StalledProvider;

#[async_trait]
impl Provider for StalledProvider {
    async fn process_query(&self, _query: &str) -> Result<String, ProviderError> {
        std::future::pending().await
    }

    async fn analyze_sentiment(&self, _text: &str) -> Result<f64, ProviderError> {
        std::future::pending().await
    }

    async fn generate_text(
        &self,
        _prompt: &str,
        _max_tokens: u32,
        _temperature: f64,
    ) -> Result<String, ProviderError> {
        std::future::pending().await
    }
}

fn config() -> EngineConfig {
    EngineConfig::with_provider(ProviderConfig::new("scripted"))
}

fn entity(tenant: Uuid) -> Entity {
    Entity {
        id: Uuid::new_v4(),
        tenant_id: tenant,
        name: "Trail Runner 2".to_string(),
        description: "Lightweight trail shoe".to_string(),
    }
}

fn review(entity: &Entity, rating: u8, content: &str, created_at: DateTime<Utc>) -> Review {
    Review {
        id: Uuid::new_v4(),
        entity_id: entity.id,
        tenant_id: entity.tenant_id,
        rating,
        content: content.to_string(),
        verified: true,
        sentiment: 0.0,
        keywords: Vec::new(),
        engagement: ReviewEngagement::default(),
        created_at,
    }
}

fn proof(
    entity: &Entity,
    kind: ProofKind,
    media_type: MediaType,
    rate: f64,
    created_at: DateTime<Utc>,
) -> SocialProofEvent {
    SocialProofEvent {
        id: Uuid::new_v4(),
        tenant_id: entity.tenant_id,
        entity_id: entity.id,
        kind,
        media_type,
        content: format!("{kind} via {media_type}"),
        performance: ProofPerformance {
            views: 100,
            conversions: 10,
            engagement_rate: rate,
        },
        created_at,
    }
}

fn engine_with(provider: impl Provider + 'static, repo: InMemoryRepository) -> InsightsEngine {
    InsightsEngine::with_provider(&config(), Arc::new(provider), Arc::new(repo))
}

// ---------------------------------------------------------------------------
// Construction and reconfiguration
// ---------------------------------------------------------------------------

#[test]
fn unknown_provider_fails_engine_construction() {
    let config = EngineConfig::with_provider(ProviderConfig::new("claude"));
    let result = InsightsEngine::new(&config, Arc::new(InMemoryRepository::default()));
    assert!(
        matches!(
            result,
            Err(InsightsError::Provider(ProviderError::UnsupportedProvider(ref name))) if name == "claude"
        ),
        "expected UnsupportedProvider"
    );
}

#[tokio::test]
async fn replaced_provider_serves_later_calls() {
    let engine = engine_with(ScriptedProvider::named("first"), InMemoryRepository::default());
    let cancel = CancellationToken::new();
    let tenant = Uuid::new_v4();

    let before = engine.process_query(tenant, "hello", &cancel).await.unwrap();
    assert_eq!(before.response, "first answered");
    assert_eq!(before.tenant_id, tenant);
    assert_eq!(before.query, "hello");

    engine.replace_provider(Arc::new(ScriptedProvider::named("second")));
    let after = engine.process_query(tenant, "hello", &cancel).await.unwrap();
    assert_eq!(after.response, "second answered");
}

#[tokio::test]
async fn failed_reconfigure_keeps_previous_provider() {
    let engine = engine_with(ScriptedProvider::named("first"), InMemoryRepository::default());
    let err = engine
        .reconfigure(&ProviderConfig::new("openai"), &HttpSettings::default())
        .unwrap_err();
    assert!(matches!(err, ProviderError::MissingCredential { .. }));

    let answer = engine
        .process_query(Uuid::new_v4(), "still there?", &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(answer.response, "first answered");
}

#[test]
fn reconfigure_accepts_valid_backend() {
    let engine = engine_with(ScriptedProvider::named("first"), InMemoryRepository::default());
    let llama = ProviderConfig::new("meta")
        .with_option(ProviderConfig::SERVER_URL, "http://localhost:8080");
    assert!(engine.reconfigure(&llama, &HttpSettings::default()).is_ok());
}

// ---------------------------------------------------------------------------
// Entity insights and actions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn entity_insights_from_enriched_reviews() {
    let tenant = Uuid::new_v4();
    let shoe = entity(tenant);
    let now = Utc::now();
    let mut reviews = vec![
        review(&shoe, 5, "love them", now - TimeDelta::hours(2)),
        review(&shoe, 3, "a bit narrow", now - TimeDelta::hours(5)),
        review(&shoe, 4, "solid grip", now - TimeDelta::hours(9)),
    ];
    for (r, (s, kw)) in reviews.iter_mut().zip([
        (0.8, vec!["comfort", "grip"]),
        (0.1, vec!["fit"]),
        (0.5, vec!["grip"]),
    ]) {
        r.sentiment = s;
        r.keywords = kw.into_iter().map(str::to_string).collect();
    }
    let repo = InMemoryRepository::new(vec![shoe.clone()], reviews, Vec::new());
    let engine = engine_with(
        ScriptedProvider::named("p").generates("1. Feature grip photos\n2. Add size guide\n"),
        repo,
    );

    let snapshot = engine
        .generate_entity_insights(shoe.id, &CancellationToken::new())
        .await
        .expect("insights should build");

    assert_eq!(snapshot.entity_id, shoe.id);
    assert!((snapshot.average_rating - 4.0).abs() < 1e-12);
    assert!((snapshot.sentiment_score - 0.4667).abs() < 1e-4);
    assert_eq!(snapshot.top_keywords, vec!["grip", "comfort", "fit"]);
    assert_eq!(snapshot.sentiment_trend.len(), 12);
    assert!((snapshot.sentiment_trend[0] - 0.4667).abs() < 1e-4);
    assert!(snapshot.sentiment_trend[1..].iter().all(|v| v.abs() < 1e-12));
    assert_eq!(
        snapshot.recommended_actions,
        vec!["Feature grip photos", "Add size guide"]
    );
}

#[tokio::test]
async fn unreachable_provider_yields_fallback_actions() {
    let tenant = Uuid::new_v4();
    let shoe = entity(tenant);
    let repo = InMemoryRepository::new(
        vec![shoe.clone()],
        vec![review(&shoe, 5, "great", Utc::now())],
        Vec::new(),
    );
    let mut config = EngineConfig::with_provider(
        ProviderConfig::new("llama").with_option(ProviderConfig::SERVER_URL, "http://127.0.0.1:1"),
    );
    config.http = HttpSettings {
        request_timeout_secs: 2,
        max_retries: 0,
        backoff_base_ms: 0,
    };
    let engine = InsightsEngine::new(&config, Arc::new(repo)).unwrap();

    let actions = engine
        .generate_actions(shoe.id, &CancellationToken::new())
        .await
        .expect("provider failure must not propagate");
    assert_eq!(actions, FALLBACK_ACTIONS.to_vec());
}

#[tokio::test]
async fn empty_generation_yields_fallback_actions() {
    let shoe = entity(Uuid::new_v4());
    let repo = InMemoryRepository::new(vec![shoe.clone()], Vec::new(), Vec::new());
    let engine = engine_with(ScriptedProvider::named("p"), repo);

    let snapshot = engine
        .generate_entity_insights(shoe.id, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(snapshot.recommended_actions, FALLBACK_ACTIONS.to_vec());
    assert!(snapshot.average_rating.abs() < 1e-12);
    assert!(snapshot.engagement_score.abs() < 1e-12);
}

#[tokio::test]
async fn unknown_entity_is_reported() {
    let engine = engine_with(ScriptedProvider::named("p"), InMemoryRepository::default());
    let missing = Uuid::new_v4();
    let err = engine
        .generate_entity_insights(missing, &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, InsightsError::EntityNotFound(id) if id == missing));
}

// ---------------------------------------------------------------------------
// Enrichment
// ---------------------------------------------------------------------------

#[tokio::test]
async fn enrichment_returns_values_in_input_order() {
    let shoe = entity(Uuid::new_v4());
    let reviews = vec![
        review(&shoe, 5, "love them", Utc::now()),
        review(&shoe, 1, "fell apart", Utc::now()),
    ];
    let provider = ScriptedProvider::named("p")
        .sentiment("love them", 0.9)
        .sentiment("fell apart", -0.7)
        .keywords("love them", "comfort, style")
        .keywords("fell apart", " durability ,, sole ");
    let engine = engine_with(provider, InMemoryRepository::default());

    let enriched = engine
        .enrich_reviews(&reviews, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(enriched.len(), 2);
    assert_eq!(enriched[0].review_id, reviews[0].id);
    assert!((enriched[0].sentiment - 0.9).abs() < 1e-12);
    assert_eq!(enriched[0].keywords, vec!["comfort", "style"]);
    assert_eq!(enriched[1].review_id, reviews[1].id);
    assert!((enriched[1].sentiment + 0.7).abs() < 1e-12);
    assert_eq!(enriched[1].keywords, vec!["durability", "sole"]);
}

#[tokio::test]
async fn one_failed_score_fails_the_whole_batch() {
    let shoe = entity(Uuid::new_v4());
    let reviews: Vec<Review> = (0..6)
        .map(|i| review(&shoe, 4, &format!("review {i}"), Utc::now()))
        .collect();
    let engine = engine_with(
        ScriptedProvider::named("p").failing_sentiment_for("review 3"),
        InMemoryRepository::default(),
    );

    let err = engine
        .enrich_reviews(&reviews, &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        InsightsError::Provider(ProviderError::Status { status: 503, .. })
    ));
    assert_eq!(err.to_string(), "analysis failed: scripted returned HTTP 503");
}

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cancellation_interrupts_a_stalled_provider() {
    let engine = engine_with(StalledProvider, InMemoryRepository::default());
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        engine.process_query(Uuid::new_v4(), "anything", &cancel),
    )
    .await
    .expect("cancellation should end the call");
    assert!(matches!(result, Err(InsightsError::Cancelled)));
}

#[tokio::test]
async fn cancellation_does_not_degrade_to_fallback() {
    let shoe = entity(Uuid::new_v4());
    let repo = InMemoryRepository::new(vec![shoe.clone()], Vec::new(), Vec::new());
    let engine = engine_with(StalledProvider, repo);
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let result = engine.generate_actions(shoe.id, &cancel).await;
    assert!(matches!(result, Err(InsightsError::Cancelled)));
}

// ---------------------------------------------------------------------------
// Trends and recommendations
// ---------------------------------------------------------------------------

#[tokio::test]
async fn trend_series_are_newest_first() {
    let tenant = Uuid::new_v4();
    let shoe = entity(tenant);
    let now = Utc::now();
    let mut recent = review(&shoe, 5, "superb quality", now - TimeDelta::days(1));
    recent.engagement = ReviewEngagement {
        views: 10,
        likes: 6,
        shares: 2,
    };
    let older = review(&shoe, 2, "slow shipping", now - TimeDelta::days(15));
    let ancient = review(&shoe, 1, "ignored", now - TimeDelta::days(400));
    let other_tenant = review(&entity(Uuid::new_v4()), 5, "not mine", now - TimeDelta::days(1));

    let repo = InMemoryRepository::new(
        Vec::new(),
        vec![recent.clone(), older, ancient, other_tenant],
        vec![proof(
            &shoe,
            ProofKind::Purchase,
            MediaType::Image,
            0.4,
            now - TimeDelta::days(3),
        )],
    );
    let provider = ScriptedProvider::named("p")
        .sentiment("superb quality", 0.9)
        .sentiment("slow shipping", -0.6)
        .keywords("superb quality", "quality")
        .keywords("slow shipping", "shipping, delivery");
    let engine = engine_with(provider, repo);

    let report = engine
        .analyze_trends(tenant, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.tenant_id, tenant);
    assert_eq!(report.sentiment.averages.len(), 12);
    assert!(report.sentiment.frames[0].end > report.sentiment.frames[1].end);
    assert!((report.sentiment.averages[0] - 0.9).abs() < 1e-12);
    assert!(report.sentiment.averages[1].abs() < 1e-12);
    assert!((report.sentiment.averages[2] + 0.6).abs() < 1e-12);

    // (0.8 + 0.1) / 2 for frame 0: one review and one event
    assert!((report.engagement.averages[0] - 0.45).abs() < 1e-12);

    assert_eq!(report.keywords.frequencies[0][0].keyword, "quality");
    assert_eq!(report.keywords.frequencies[2].len(), 2);
    assert!(report.keywords.frequencies[5].is_empty());

    assert_eq!(report.top_performers[0].id, recent.id);
    assert_eq!(report.top_performers[0].kind, PerformerKind::Review);
    assert_eq!(report.top_performers.len(), 3);
}

#[tokio::test]
async fn recommendations_are_ranked_by_confidence() {
    let tenant = Uuid::new_v4();
    let shoe = entity(tenant);
    let at = |hour| Utc.with_ymd_and_hms(2025, 4, 1, hour, 0, 0).unwrap();
    let proofs = vec![
        proof(&shoe, ProofKind::Purchase, MediaType::Image, 0.9, at(14)),
        proof(&shoe, ProofKind::Purchase, MediaType::Image, 0.8, at(14)),
        proof(&shoe, ProofKind::View, MediaType::Video, 0.2, at(9)),
        proof(&shoe, ProofKind::Review, MediaType::Text, 0.3, at(20)),
    ];
    let engine = engine_with(
        ScriptedProvider::named("p"),
        InMemoryRepository::new(Vec::new(), Vec::new(), proofs),
    );

    let recs = engine
        .generate_recommendations(tenant, &CancellationToken::new())
        .await
        .unwrap();

    let categories: Vec<InsightCategory> = recs.iter().map(|r| r.category).collect();
    assert_eq!(
        categories,
        vec![
            InsightCategory::Content,
            InsightCategory::Timing,
            InsightCategory::Placement
        ]
    );
    assert!(recs.windows(2).all(|w| w[0].confidence >= w[1].confidence));
    assert!((recs[0].confidence - 0.6008).abs() < 1e-9);
    assert!(recs[0].suggestion.starts_with("Increase usage of visual content"));
    assert_eq!(
        recs[1].suggestion,
        "Schedule social proof displays during peak engagement hours around 14:00"
    );
    assert_eq!(
        recs[2].suggestion,
        "Emphasize recent purchase notifications to create urgency"
    );
    assert!(recs.iter().all(|r| r.tenant_id == tenant));
}

#[tokio::test]
async fn content_keywords_are_capped_at_ten() {
    let reply = (1..=12).map(|i| format!("topic {i}")).collect::<Vec<_>>().join(", ");
    let analyzer = ContentAnalyzer::new(Arc::new(
        ScriptedProvider::named("p").keywords("long review", &reply),
    ));
    let keywords = analyzer
        .extract_keywords("long review", &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(keywords.len(), 10);
    assert_eq!(keywords[0], "topic 1");
    assert_eq!(keywords[9], "topic 10");
}
