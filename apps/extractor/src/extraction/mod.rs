// Extraction service: prompt building, the bounded retry loop and its handler.
// All backend calls go through llm_client.

pub mod extractor;
pub mod handlers;
pub mod prompts;
