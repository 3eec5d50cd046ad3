mod analysis;
mod clock;
mod config;
mod db;
mod detection;
mod errors;
mod llm_client;
mod models;
mod pipeline;
mod retention;
mod retry;
mod sources;

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::db::{create_pool, init_schema};
use crate::llm_client::LlmClient;
use crate::pipeline::{Pipeline, PipelineSettings};
use crate::retention::manager::fetch_older_than;
use crate::retention::store::{EventStore, PgEventStore};
use crate::retry::RetryPolicy;
use crate::sources::google::GoogleSearchSource;
use crate::sources::reddit::RedditSource;
use crate::sources::twitter::TwitterSource;
use crate::sources::{DocumentSource, CATEGORIES};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting forecaster v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL; the run cannot proceed without it
    let db = create_pool(&config.database_url).await?;
    init_schema(&db).await?;
    let store: Arc<dyn EventStore> = Arc::new(PgEventStore::new(db));

    // Initialize LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone())?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let sources = build_sources(&config)?;
    info!(
        "Sources enabled: {}",
        sources.iter().map(|s| s.name()).collect::<Vec<_>>().join(", ")
    );

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let now = clock.now();

    // Stale rows are only reported here; they are swept by the next insert
    match fetch_older_than(store.as_ref(), now, config.retention_days).await {
        Ok(stale) => {
            info!(
                "{} records older than {} days will be swept on the next save",
                stale.len(),
                config.retention_days
            );
            for record in &stale {
                if let Ok(json) = serde_json::to_string(record) {
                    debug!("Stale record: {json}");
                }
            }
        }
        Err(e) => warn!("Could not read stale records: {e}"),
    }

    let settings = PipelineSettings {
        retention_days: config.retention_days,
        horizon_days: config.question_horizon_days,
        persist_rejected: config.persist_rejected,
        retry: RetryPolicy::with_max_retries(config.source_max_retries),
    };

    let pipeline = Pipeline::new(sources, Arc::new(llm), store, clock, settings);
    let report = pipeline.run(CATEGORIES).await;
    report.log_summary();

    Ok(())
}

/// Builds one source per configured credential set.
fn build_sources(config: &Config) -> Result<Vec<Box<dyn DocumentSource>>> {
    let mut sources: Vec<Box<dyn DocumentSource>> = Vec::new();

    if let Some(credentials) = &config.reddit {
        sources.push(Box::new(RedditSource::new(
            credentials.clone(),
            config.document_limit,
        )?));
    }
    if let Some(credentials) = &config.google {
        sources.push(Box::new(GoogleSearchSource::new(credentials.clone())?));
    }
    if let Some(token) = &config.twitter_bearer_token {
        sources.push(Box::new(TwitterSource::new(token.clone())?));
    }

    Ok(sources)
}
