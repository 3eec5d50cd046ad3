//! Rate-limit retry for source searches.
//!
//! Only `SourceError::RateLimited` is retried; every other failure returns at once.

use crate::models::document::CandidateDocument;
use crate::retry::{retry_transient, RetryPolicy};
use crate::sources::{DocumentSource, SearchPlan, SourceError};

/// Runs `plan` against `source`, waiting and retrying while the source rate-limits.
pub async fn search_with_retry(
    source: &dyn DocumentSource,
    plan: &SearchPlan,
    policy: &RetryPolicy,
) -> Result<Vec<CandidateDocument>, SourceError> {
    let label = format!("{} search for '{}'", source.name(), plan.topic);
    retry_transient(policy, &label, move || {
        source.search(&plan.topic, &plan.query, plan.limit)
    })
    .await
}
