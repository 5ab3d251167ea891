//! Prompt-based sentiment scoring for backends without a classifier endpoint.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ProviderError;

static SCORE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-+]?(?:\d+\.\d*|\.\d+|\d+)").expect("valid score regex"));

pub(crate) fn sentiment_prompt(text: &str) -> String {
    format!(
        "Analyze the sentiment of the following text and return a score between -1 (very negative) and 1 (very positive):\n\n\
         Text: \"\"\"{text}\"\"\"\n\n\
         Score:"
    )
}

/// Pull the first decimal number out of a model reply and clamp it to [-1, 1].
///
/// Models tend to answer with `0.8`, `Score: -0.35` or `0.9 (positive)`; all
/// of those parse. A reply with no number at all is malformed.
pub(crate) fn parse_sentiment_score(
    provider: &'static str,
    reply: &str,
) -> Result<f64, ProviderError> {
    let raw = SCORE_RE
        .find(reply)
        .ok_or_else(|| ProviderError::MalformedResponse {
            provider,
            reason: format!("no sentiment score in reply: {:?}", truncate(reply)),
        })?;

    let score: f64 = raw
        .as_str()
        .parse()
        .map_err(|e: std::num::ParseFloatError| ProviderError::MalformedResponse {
            provider,
            reason: e.to_string(),
        })?;

    if !score.is_finite() {
        return Err(ProviderError::MalformedResponse {
            provider,
            reason: format!("non-finite sentiment score {score}"),
        });
    }

    Ok(score.clamp(-1.0, 1.0))
}

/// Map a classifier label/score pair onto the signed sentiment scale.
pub(crate) fn label_to_score(label: &str, score: f64) -> f64 {
    match label.to_ascii_uppercase().as_str() {
        "POS" | "POSITIVE" => score.clamp(0.0, 1.0),
        "NEG" | "NEGATIVE" => -score.clamp(0.0, 1.0),
        _ => 0.0,
    }
}

fn truncate(reply: &str) -> String {
    reply.chars().take(80).collect()
}
