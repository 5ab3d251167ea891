use std::path::Path;

use crate::engine_config::{EngineConfig, GenerationSettings, HttpSettings, ProviderConfig};
use crate::ConfigError;

/// Model used by the local llama server when `NYASAH_MODEL` is unset.
pub const LOCAL_DEFAULT_MODEL: &str = "llama3.2";

/// Upper bound on `NYASAH_TIME_FRAMES × NYASAH_FRAME_DAYS`.
pub const MAX_HISTORY_DAYS: u64 = 36_500;

/// Load engine configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_engine_config() -> Result<EngineConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_engine_config_from_env()
}

/// Load engine configuration from environment variables already in the process.
///
/// Unlike [`load_engine_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_engine_config_from_env() -> Result<EngineConfig, ConfigError> {
    build_engine_config(|key| std::env::var(key))
}

/// Build engine configuration using the provided env-var lookup function.
///
/// Only options that are actually set end up in the provider option map, so
/// the provider factory can tell a missing credential from an empty one.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for unparseable or out-of-range values.
pub fn build_engine_config<F>(lookup: F) -> Result<EngineConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_positive_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let value = or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if value == 0 {
            return Err(invalid(var, "must be at least 1".to_string()));
        }
        Ok(value)
    };

    let mut provider = ProviderConfig::new(or_default("NYASAH_PROVIDER", "meta"));
    let optional = [
        ("NYASAH_API_KEY", ProviderConfig::API_KEY),
        ("NYASAH_MODEL", ProviderConfig::MODEL),
        ("NYASAH_LLAMA_SERVER_URL", ProviderConfig::SERVER_URL),
        ("NYASAH_PROVIDER_BASE_URL", ProviderConfig::BASE_URL),
    ];
    for (var, key) in optional {
        if let Ok(value) = lookup(var) {
            provider = provider.with_option(key, value);
        }
    }
    // Hosted backends pick their own default model.
    let local = matches!(
        provider.provider.trim().to_ascii_lowercase().as_str(),
        "llama" | "meta"
    );
    if local && provider.option(ProviderConfig::MODEL).is_none() {
        provider = provider.with_option(ProviderConfig::MODEL, LOCAL_DEFAULT_MODEL);
    }

    let temperature = or_default("NYASAH_TEMPERATURE", "0.45")
        .parse::<f64>()
        .map_err(|e| invalid("NYASAH_TEMPERATURE", e.to_string()))?;
    if !(0.0..=2.0).contains(&temperature) {
        return Err(invalid(
            "NYASAH_TEMPERATURE",
            format!("{temperature} is outside 0.0..=2.0"),
        ));
    }

    let generation = GenerationSettings {
        max_tokens: parse_u32("NYASAH_MAX_TOKENS", "1000")?,
        temperature,
    };

    let http = HttpSettings {
        request_timeout_secs: parse_u64("NYASAH_PROVIDER_TIMEOUT_SECS", "30")?,
        max_retries: parse_u32("NYASAH_PROVIDER_MAX_RETRIES", "3")?,
        backoff_base_ms: parse_u64("NYASAH_PROVIDER_BACKOFF_BASE_MS", "500")?,
    };

    let time_frames = parse_positive_usize("NYASAH_TIME_FRAMES", "12")?;
    let frame_days = parse_u32("NYASAH_FRAME_DAYS", "7")?;
    if frame_days == 0 {
        return Err(invalid("NYASAH_FRAME_DAYS", "must be at least 1".to_string()));
    }
    let history_days = u64::try_from(time_frames)
        .unwrap_or(u64::MAX)
        .saturating_mul(u64::from(frame_days));
    if history_days > MAX_HISTORY_DAYS {
        return Err(invalid(
            "NYASAH_FRAME_DAYS",
            format!(
                "{time_frames} frames of {frame_days} days exceed the {MAX_HISTORY_DAYS}-day history limit"
            ),
        ));
    }
    let max_concurrency = parse_positive_usize("NYASAH_MAX_CONCURRENCY", "4")?;
    let log_level = or_default("NYASAH_LOG_LEVEL", "info");

    Ok(EngineConfig {
        provider,
        http,
        generation,
        time_frames,
        frame_days,
        max_concurrency,
        log_level,
    })
}

/// Load a provider selection from a YAML file.
///
/// ```yaml
/// provider: huggingface
/// options:
///   api_key: hf_xxx
///   model: gpt2
/// ```
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read or parsed.
pub fn load_provider_config(path: &Path) -> Result<ProviderConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ProviderFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let config: ProviderConfig = serde_yaml::from_str(&content)?;
    Ok(config)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
