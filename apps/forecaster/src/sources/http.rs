// HTTP plumbing shared by the source clients.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use tracing::warn;

use crate::retry::retry_after_header;
use crate::sources::SourceError;

const USER_AGENT: &str = concat!("forecaster/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub fn build_http_client() -> Result<Client, SourceError> {
    Ok(Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()?)
}

/// Maps 429 to `RateLimited` and other non-2xx statuses to `Api`.
pub async fn check_status(response: Response) -> Result<Response, SourceError> {
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(SourceError::RateLimited {
            retry_after: retry_after_header(response.headers()),
        });
    }

    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        warn!("Source API returned {status}: {message}");
        return Err(SourceError::Api {
            status: status.as_u16(),
            message,
        });
    }

    Ok(response)
}
