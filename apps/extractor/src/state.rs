use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::CompletionBackend;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Completion backend. `LlmClient` in production.
    pub backend: Arc<dyn CompletionBackend>,
    /// Loaded once at startup and never mutated.
    pub config: Arc<Config>,
}
