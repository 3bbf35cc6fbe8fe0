//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::service::CheckinService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Check-in service for all request logic.
    pub checkin_service: Arc<CheckinService>,
}

impl AppState {
    /// Wraps a check-in service for sharing across handlers.
    #[must_use]
    pub fn new(checkin_service: CheckinService) -> Self {
        Self {
            checkin_service: Arc::new(checkin_service),
        }
    }
}
