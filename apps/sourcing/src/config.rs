use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::github::DEFAULT_API_URL;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or numbers don't parse.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub github_token: Option<String>,
    pub github_api_url: String,
    pub llm_timeout: Duration,
    pub github_timeout: Duration,
    pub github_search_timeout: Duration,
    /// Max in-flight repository fetches during enrichment. Always >= 1.
    pub enrich_concurrency: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            github_token: optional_env("GITHUB_TOKEN"),
            github_api_url: optional_env("GITHUB_API_URL")
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            llm_timeout: Duration::from_secs(parse_env("LLM_TIMEOUT_SECS", 120)?),
            github_timeout: Duration::from_secs(parse_env("GITHUB_TIMEOUT_SECS", 10)?),
            github_search_timeout: Duration::from_secs(parse_env(
                "GITHUB_SEARCH_TIMEOUT_SECS",
                30,
            )?),
            enrich_concurrency: parse_env::<usize>("ENRICH_CONCURRENCY", 4)?.max(1),
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Unset and blank are both treated as absent.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}
