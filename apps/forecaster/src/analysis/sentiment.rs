//! Sentiment scorer: labels a document positive, neutral or negative.
//!
//! The label set is not enforced: unexpected answers are stored as given and logged.

use std::str::FromStr;

use tracing::warn;

use crate::analysis::prompts::{fill_template, SENTIMENT_PROMPT_TEMPLATE};
use crate::errors::GenerationError;
use crate::llm_client::TextGenerator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }
}

impl FromStr for Sentiment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "positive" => Ok(Sentiment::Positive),
            "neutral" => Ok(Sentiment::Neutral),
            "negative" => Ok(Sentiment::Negative),
            other => Err(format!("unknown sentiment '{other}'")),
        }
    }
}

/// Asks the generator for the sentiment of `content`.
/// Returns the normalised (trimmed, lower-case, no trailing period) answer.
pub async fn score_sentiment(
    generator: &dyn TextGenerator,
    content: &str,
) -> Result<String, GenerationError> {
    let prompt = fill_template(SENTIMENT_PROMPT_TEMPLATE, &[("document", content)]);
    let answer = generator.generate(&prompt).await?;

    let label = answer
        .trim()
        .trim_end_matches('.')
        .trim_matches('"')
        .trim()
        .to_lowercase();

    if label.is_empty() {
        return Err(GenerationError::EmptyResponse {
            step: "sentiment scoring",
        });
    }

    match label.parse::<Sentiment>() {
        Ok(sentiment) => Ok(sentiment.as_str().to_string()),
        Err(e) => {
            warn!("Sentiment outside the expected set, keeping as-is: {e}");
            Ok(label)
        }
    }
}
