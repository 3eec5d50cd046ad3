// Cheap text heuristics run before any LLM call.

pub mod timeframe;
