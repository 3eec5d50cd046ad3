//! Twitter source: v2 recent search, bearer-token auth.
//! Only categories flagged `on_twitter` are searched. Tweets are filtered loosely.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::detection::timeframe::FilterStrictness;
use crate::models::document::CandidateDocument;
use crate::sources::http::{build_http_client, check_status};
use crate::sources::{Category, DocumentSource, SearchPlan, SourceError};

const SEARCH_URL: &str = "https://api.twitter.com/2/tweets/search/recent";
const DEFAULT_RESULTS: u32 = 10;
// API bounds for max_results
const MIN_RESULTS: u32 = 10;
const MAX_RESULTS: u32 = 100;

#[derive(Debug, Deserialize)]
struct RecentSearchResponse {
    #[serde(default)]
    data: Vec<Tweet>,
}

#[derive(Debug, Deserialize)]
struct Tweet {
    id: String,
    text: String,
}

impl From<Tweet> for CandidateDocument {
    fn from(tweet: Tweet) -> Self {
        CandidateDocument::new(tweet.text)
            .with_url(format!("https://twitter.com/user/status/{}", tweet.id))
    }
}

pub struct TwitterSource {
    client: Client,
    bearer_token: String,
}

impl TwitterSource {
    pub fn new(bearer_token: String) -> Result<Self, SourceError> {
        Ok(Self {
            client: build_http_client()?,
            bearer_token,
        })
    }
}

#[async_trait]
impl DocumentSource for TwitterSource {
    fn name(&self) -> &'static str {
        "twitter"
    }

    fn strictness(&self) -> FilterStrictness {
        FilterStrictness::Loose
    }

    fn plan(&self, category: &Category) -> Option<SearchPlan> {
        category.on_twitter.then(|| SearchPlan {
            topic: category.label.to_string(),
            query: category.web_query.to_string(),
            limit: DEFAULT_RESULTS,
        })
    }

    async fn search(
        &self,
        topic: &str,
        query: &str,
        limit: u32,
    ) -> Result<Vec<CandidateDocument>, SourceError> {
        let max_results = limit.clamp(MIN_RESULTS, MAX_RESULTS).to_string();

        let response = self
            .client
            .get(SEARCH_URL)
            .bearer_auth(&self.bearer_token)
            .query(&[
                ("query", query),
                ("max_results", max_results.as_str()),
                ("tweet.fields", "created_at"),
            ])
            .send()
            .await?;

        let body: RecentSearchResponse = check_status(response).await?.json().await?;
        debug!("Twitter '{topic}': {} tweets", body.data.len());
        Ok(body.data.into_iter().map(CandidateDocument::from).collect())
    }
}
