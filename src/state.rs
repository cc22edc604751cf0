//! Application state shared across handlers

use crate::service::AiService;

/// State threaded through the axum router
#[derive(Clone)]
pub struct AppState {
    /// The AI orchestrator
    pub service: AiService,
}

impl AppState {
    /// Create state around a service
    pub fn new(service: AiService) -> Self {
        Self { service }
    }
}
