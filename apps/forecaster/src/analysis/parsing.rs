//! Parsing of free-form generator output.
//!
//! Kept apart from the synthesizer so a structured-output contract can replace
//! marker search without touching the pipeline.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

pub const QUESTION_MARKER: &str = "Generated Question:";
pub const PROBABILITY_MARKER: &str = "Probability:";

static YES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"Yes (\d+%)").expect("valid yes regex"));
static NO_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"No (\d+%)").expect("valid no regex"));
static NO_TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bNo\b").expect("valid token regex"));

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("missing 'Generated Question:' marker")]
    MissingQuestionMarker,

    #[error("empty question after 'Generated Question:' marker")]
    EmptyQuestion,
}

/// Question and probabilities pulled out of a generation response.
/// Either probability may be absent when the output does not match `Yes <n>%` / `No <n>%`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedQuestion {
    pub question: String,
    pub yes_probability: Option<String>,
    pub no_probability: Option<String>,
}

/// Extracts the question between the two markers (or up to the end of the text
/// when the probability marker is missing) and the Yes/No percentages.
pub fn parse_generation(text: &str) -> Result<GeneratedQuestion, ParseError> {
    let start = text
        .find(QUESTION_MARKER)
        .map(|idx| idx + QUESTION_MARKER.len())
        .ok_or(ParseError::MissingQuestionMarker)?;

    let rest = &text[start..];
    let end = rest.find(PROBABILITY_MARKER).unwrap_or(rest.len());
    let question = clean_question(&rest[..end]);

    if question.is_empty() {
        return Err(ParseError::EmptyQuestion);
    }

    Ok(GeneratedQuestion {
        question,
        yes_probability: capture(&YES_RE, text),
        no_probability: capture(&NO_RE, text),
    })
}

/// True when the validation answer contains the standalone token "No".
pub fn is_rejection(validation_response: &str) -> bool {
    NO_TOKEN_RE.is_match(validation_response)
}

// Trims whitespace and the list markers models like to put before the next line.
fn clean_question(raw: &str) -> String {
    raw.trim()
        .trim_end_matches(|c: char| c == '-' || c == '*' || c.is_whitespace())
        .trim()
        .to_string()
}

fn capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text).map(|caps| caps[1].to_string())
}
