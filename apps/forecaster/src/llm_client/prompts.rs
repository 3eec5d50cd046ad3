// Shared prompt constants.
// Each component that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// System prompt used for every plain-text generation call.
/// Components parse free text, so the model must not wrap answers in markup.
pub const PLAIN_TEXT_SYSTEM: &str = "You are a precise assistant that analyses news and \
    social-media posts about upcoming events. \
    Answer exactly in the format the user asks for. \
    Do NOT use markdown formatting or code fences. \
    Do NOT include explanations or apologies unless asked.";
