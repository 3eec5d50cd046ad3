//! Reddit source: subreddit search through the OAuth API (app-only credentials).
//!
//! Posts are ingested documents, so they go through the strict timeframe filter.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::detection::timeframe::FilterStrictness;
use crate::models::document::CandidateDocument;
use crate::sources::http::{build_http_client, check_status};
use crate::sources::{Category, DocumentSource, SearchPlan, SourceError};

const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
const API_BASE: &str = "https://oauth.reddit.com";
/// Query run against every subreddit.
pub const REDDIT_QUERY: &str = "upcoming OR scheduled OR next week";
/// Refresh the token this long before Reddit says it expires.
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
}

struct AccessToken {
    value: String,
    expires_at: Instant,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    children: Vec<ListingChild>,
}

#[derive(Debug, Deserialize)]
struct ListingChild {
    data: Submission,
}

#[derive(Debug, Deserialize)]
struct Submission {
    title: String,
    #[serde(default)]
    selftext: String,
    url: Option<String>,
}

impl From<Submission> for CandidateDocument {
    fn from(s: Submission) -> Self {
        let document = CandidateDocument::new(s.selftext).with_title(s.title);
        match s.url {
            Some(url) => document.with_url(url),
            None => document,
        }
    }
}

pub struct RedditSource {
    client: Client,
    credentials: RedditCredentials,
    limit: u32,
    token: Mutex<Option<AccessToken>>,
}

impl RedditSource {
    pub fn new(credentials: RedditCredentials, limit: u32) -> Result<Self, SourceError> {
        Ok(Self {
            client: build_http_client()?,
            credentials,
            limit,
            token: Mutex::new(None),
        })
    }

    /// Returns a cached bearer token, fetching a new one when absent or about to expire.
    async fn bearer_token(&self) -> Result<String, SourceError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() + TOKEN_REFRESH_MARGIN < token.expires_at {
                return Ok(token.value.clone());
            }
        }

        let response = self
            .client
            .post(TOKEN_URL)
            .header(reqwest::header::USER_AGENT, &self.credentials.user_agent)
            .basic_auth(
                &self.credentials.client_id,
                Some(&self.credentials.client_secret),
            )
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(SourceError::Auth(format!(
                "Reddit rejected client credentials ({status})"
            )));
        }

        let token: TokenResponse = check_status(response).await?.json().await?;
        info!("Obtained Reddit access token (expires in {}s)", token.expires_in);

        let value = token.access_token.clone();
        *cached = Some(AccessToken {
            value: token.access_token,
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        });
        Ok(value)
    }
}

#[async_trait]
impl DocumentSource for RedditSource {
    fn name(&self) -> &'static str {
        "reddit"
    }

    fn strictness(&self) -> FilterStrictness {
        FilterStrictness::Strict
    }

    fn plan(&self, category: &Category) -> Option<SearchPlan> {
        Some(SearchPlan {
            topic: category.label.to_string(),
            query: REDDIT_QUERY.to_string(),
            limit: self.limit,
        })
    }

    async fn search(
        &self,
        topic: &str,
        query: &str,
        limit: u32,
    ) -> Result<Vec<CandidateDocument>, SourceError> {
        let token = self.bearer_token().await?;
        let url = format!("{API_BASE}/r/{topic}/search");
        let limit = limit.to_string();

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, &self.credentials.user_agent)
            .bearer_auth(token)
            .query(&[
                ("q", query),
                ("restrict_sr", "on"),
                ("sort", "relevance"),
                ("t", "all"),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?;

        let listing: Listing = check_status(response).await?.json().await?;
        let documents = listing_documents(listing);
        debug!("Reddit /r/{topic}: {} submissions", documents.len());
        Ok(documents)
    }
}

fn listing_documents(listing: Listing) -> Vec<CandidateDocument> {
    listing
        .data
        .children
        .into_iter()
        .map(|child| child.data.into())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::CATEGORIES;

    fn source() -> RedditSource {
        RedditSource::new(
            RedditCredentials {
                client_id: "id".to_string(),
                client_secret: "secret".to_string(),
                user_agent: "forecaster-test/0.1".to_string(),
            },
            50,
        )
        .unwrap()
    }

    #[test]
    fn test_listing_maps_submissions_to_documents() {
        let json = r#"{
            "kind": "Listing",
            "data": {
                "after": null,
                "children": [
                    {"kind": "t3", "data": {
                        "title": "Finals schedule",
                        "selftext": "The finals are scheduled for next year",
                        "url": "https://www.reddit.com/r/nba/comments/abc/finals_schedule/"
                    }},
                    {"kind": "t3", "data": {
                        "title": "Link post",
                        "url": "https://example.com/article"
                    }}
                ]
            }
        }"#;
        let listing: Listing = serde_json::from_str(json).unwrap();
        let docs = listing_documents(listing);

        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].content, "The finals are scheduled for next year");
        assert_eq!(docs[0].title.as_deref(), Some("Finals schedule"));
        assert_eq!(docs[1].content, "");
        assert_eq!(docs[1].url.as_deref(), Some("https://example.com/article"));
    }

    #[test]
    fn test_plan_searches_subreddit_named_after_category() {
        let nba = CATEGORIES.iter().find(|c| c.label == "nba").unwrap();
        let plan = source().plan(nba).unwrap();
        assert_eq!(plan.topic, "nba");
        assert_eq!(plan.query, REDDIT_QUERY);
        assert_eq!(plan.limit, 50);
    }

    #[test]
    fn test_posts_use_strict_filter() {
        assert_eq!(source().strictness(), FilterStrictness::Strict);
        assert_eq!(source().name(), "reddit");
    }
}
