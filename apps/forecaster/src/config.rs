use anyhow::{bail, Context, Result};

use crate::sources::google::GoogleCredentials;
use crate::sources::reddit::RedditCredentials;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or no source is configured.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub anthropic_api_key: String,
    pub reddit: Option<RedditCredentials>,
    pub google: Option<GoogleCredentials>,
    pub twitter_bearer_token: Option<String>,
    pub retention_days: u32,
    pub question_horizon_days: u32,
    /// Per-subreddit submission limit.
    pub document_limit: u32,
    pub source_max_retries: u32,
    pub persist_rejected: bool,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| {
            var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
        };

        let reddit = match (var("REDDIT_CLIENT_ID"), var("REDDIT_CLIENT_SECRET")) {
            (Some(client_id), Some(client_secret)) => Some(RedditCredentials {
                client_id,
                client_secret,
                user_agent: var("REDDIT_USER_AGENT").unwrap_or_else(|| {
                    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
                }),
            }),
            _ => None,
        };

        let google = match (var("GOOGLE_API_KEY"), var("GOOGLE_CSE_ID")) {
            (Some(api_key), Some(cse_id)) => Some(GoogleCredentials { api_key, cse_id }),
            _ => None,
        };

        let config = Config {
            database_url: require("DATABASE_URL")?,
            anthropic_api_key: require("ANTHROPIC_API_KEY")?,
            reddit,
            google,
            twitter_bearer_token: var("TWITTER_BEARER_TOKEN"),
            retention_days: parse_days(var("RETENTION_DAYS"), "RETENTION_DAYS", 21)?,
            question_horizon_days: parse_days(
                var("QUESTION_HORIZON_DAYS"),
                "QUESTION_HORIZON_DAYS",
                21,
            )?,
            document_limit: parse_or(var("DOCUMENT_LIMIT"), "DOCUMENT_LIMIT", 50)?,
            source_max_retries: parse_or(var("SOURCE_MAX_RETRIES"), "SOURCE_MAX_RETRIES", 3)?,
            persist_rejected: parse_or(var("PERSIST_REJECTED"), "PERSIST_REJECTED", true)?,
            rust_log: var("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        };

        if config.enabled_sources() == 0 {
            bail!(
                "No document source configured: set REDDIT_CLIENT_ID/REDDIT_CLIENT_SECRET, \
                 GOOGLE_API_KEY/GOOGLE_CSE_ID or TWITTER_BEARER_TOKEN"
            );
        }

        Ok(config)
    }

    pub fn enabled_sources(&self) -> usize {
        [
            self.reddit.is_some(),
            self.google.is_some(),
            self.twitter_bearer_token.is_some(),
        ]
        .into_iter()
        .filter(|enabled| *enabled)
        .count()
    }
}

/// Upper bound for day-count settings (about ten years).
const MAX_DAYS: u32 = 3650;

fn parse_days(raw: Option<String>, key: &str, default: u32) -> Result<u32> {
    let days = parse_or(raw, key, default)?;
    if !(1..=MAX_DAYS).contains(&days) {
        bail!("{key} must be between 1 and {MAX_DAYS} days, got {days}");
    }
    Ok(days)
}

fn parse_or<T>(raw: Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
{
    match raw {
        Some(value) => value
            .trim()
            .parse::<T>()
            .ok()
            .with_context(|| format!("{key} has an invalid value: '{value}'")),
        None => Ok(default),
    }
}
