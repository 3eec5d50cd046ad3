//! Google Custom Search source. Results are snippets, filtered loosely.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::detection::timeframe::FilterStrictness;
use crate::models::document::CandidateDocument;
use crate::sources::http::{build_http_client, check_status};
use crate::sources::{Category, DocumentSource, SearchPlan, SourceError};

const SEARCH_URL: &str = "https://www.googleapis.com/customsearch/v1";
/// The Custom Search API returns at most 10 results per request.
const MAX_RESULTS: u32 = 10;

#[derive(Debug, Clone)]
pub struct GoogleCredentials {
    pub api_key: String,
    pub cse_id: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    title: Option<String>,
    link: Option<String>,
    snippet: Option<String>,
}

pub struct GoogleSearchSource {
    client: Client,
    credentials: GoogleCredentials,
}

impl GoogleSearchSource {
    pub fn new(credentials: GoogleCredentials) -> Result<Self, SourceError> {
        Ok(Self {
            client: build_http_client()?,
            credentials,
        })
    }
}

#[async_trait]
impl DocumentSource for GoogleSearchSource {
    fn name(&self) -> &'static str {
        "google"
    }

    fn strictness(&self) -> FilterStrictness {
        FilterStrictness::Loose
    }

    fn plan(&self, category: &Category) -> Option<SearchPlan> {
        Some(SearchPlan {
            topic: category.label.to_string(),
            query: category.web_query.to_string(),
            limit: MAX_RESULTS,
        })
    }

    async fn search(
        &self,
        topic: &str,
        query: &str,
        limit: u32,
    ) -> Result<Vec<CandidateDocument>, SourceError> {
        let num = limit.clamp(1, MAX_RESULTS).to_string();

        let response = self
            .client
            .get(SEARCH_URL)
            .query(&[
                ("q", query),
                ("key", self.credentials.api_key.as_str()),
                ("cx", self.credentials.cse_id.as_str()),
                ("num", num.as_str()),
            ])
            .send()
            .await?;

        let body: SearchResponse = check_status(response).await?.json().await?;
        let documents = search_documents(body);
        debug!("Google '{topic}': {} results with snippets", documents.len());
        Ok(documents)
    }
}

// Results without a snippet have nothing to filter or analyse.
fn search_documents(body: SearchResponse) -> Vec<CandidateDocument> {
    body.items
        .into_iter()
        .filter_map(|item| {
            let mut document = CandidateDocument::new(item.snippet?);
            if let Some(title) = item.title {
                document = document.with_title(title);
            }
            if let Some(link) = item.link {
                document = document.with_url(link);
            }
            Some(document)
        })
        .collect()
}
