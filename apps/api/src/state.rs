use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::ModelBackend;
use crate::report::clock::Clock;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable model backend. Default: OllamaClient.
    pub model: Arc<dyn ModelBackend>,
    /// Source of report date and time. Tests pin it with `FixedClock`.
    pub clock: Arc<dyn Clock>,
}
