//! Document sources: external feeds of candidate documents.
//!
//! Each source declares which timeframe filter variant its documents need
//! and how a category maps onto its search API.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::detection::timeframe::FilterStrictness;
use crate::models::document::CandidateDocument;
use crate::retry::Transient;

pub mod categories;
pub mod google;
mod http;
pub mod reddit;
pub mod retry;
pub mod twitter;

pub use categories::{Category, CATEGORIES};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Rate limited (retry after {retry_after:?})")]
    RateLimited { retry_after: Option<Duration> },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Authentication failed: {0}")]
    Auth(String),
}

impl Transient for SourceError {
    fn is_transient(&self) -> bool {
        matches!(self, SourceError::RateLimited { .. })
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            SourceError::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}

/// One search request against a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPlan {
    pub topic: String,
    pub query: String,
    pub limit: u32,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentSource: Send + Sync {
    fn name(&self) -> &'static str;

    fn strictness(&self) -> FilterStrictness;

    /// How to search this source for `category`, or `None` when the source
    /// does not cover it.
    fn plan(&self, category: &Category) -> Option<SearchPlan>;

    async fn search(
        &self,
        topic: &str,
        query: &str,
        limit: u32,
    ) -> Result<Vec<CandidateDocument>, SourceError>;
}
