// Prompt-driven analysis of candidate documents.
// All LLM calls go through the TextGenerator trait, never the HTTP client directly.

pub mod classifier;
pub mod dates;
pub mod parsing;
pub mod prompts;
pub mod sentiment;
pub mod synthesizer;
