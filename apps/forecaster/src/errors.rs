use thiserror::Error;

use crate::analysis::parsing::ParseError;
use crate::llm_client::LlmError;

/// Failure of a language-model backed step (classify, score, synthesize).
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Unparseable generator output: {0}")]
    Parse(#[from] ParseError),

    #[error("Generator returned an empty answer for {step}")]
    EmptyResponse { step: &'static str },
}

/// Failure of the event store. Connection and write errors both land here.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Error raised by one document's sub-pipeline.
/// Never escapes the orchestrator: the document is logged and skipped.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl PipelineError {
    /// True when the generator answered but its output lacked the expected markers.
    pub fn is_unparseable(&self) -> bool {
        matches!(self, PipelineError::Generation(GenerationError::Parse(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_failure_is_classified_as_unparseable() {
        let err = PipelineError::from(GenerationError::from(ParseError::MissingQuestionMarker));
        assert!(err.is_unparseable());
    }

    #[test]
    fn test_llm_failure_is_not_unparseable() {
        let err = PipelineError::from(GenerationError::from(LlmError::EmptyContent));
        assert!(!err.is_unparseable());
    }

    #[test]
    fn test_store_failure_message() {
        let err = PipelineError::from(StoreError::from(sqlx::Error::PoolClosed));
        assert!(err.to_string().starts_with("Database error: "));
        assert!(!err.is_unparseable());
    }
}
