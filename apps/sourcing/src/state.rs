use std::sync::Arc;

use crate::config::Config;
use crate::github::ProfileSearch;
use crate::llm_client::LlmBackend;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Inference backend. Production: `LlmClient` (Anthropic).
    pub llm: Arc<dyn LlmBackend>,
    /// Profile search backend. Production: `GitHubClient`.
    pub profiles: Arc<dyn ProfileSearch>,
    pub config: Config,
}
