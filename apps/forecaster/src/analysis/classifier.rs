//! Event classifier: labels a document with a free-form event category.

use crate::analysis::prompts::{fill_template, CLASSIFY_PROMPT_TEMPLATE};
use crate::errors::GenerationError;
use crate::llm_client::TextGenerator;

/// Asks the generator for the event category of `content`.
/// The label is whatever the model answers, trimmed; an empty answer is an error.
pub async fn classify_event(
    generator: &dyn TextGenerator,
    content: &str,
) -> Result<String, GenerationError> {
    let prompt = fill_template(CLASSIFY_PROMPT_TEMPLATE, &[("document", content)]);
    let answer = generator.generate(&prompt).await?;

    let label = answer.trim().trim_matches('"').trim();
    if label.is_empty() {
        return Err(GenerationError::EmptyResponse {
            step: "event classification",
        });
    }
    Ok(label.to_string())
}
