//! # checkin-gateway
//!
//! QR-code event check-in service.
//!
//! Registrants are provisioned with a unique opaque token that is embedded
//! in a QR code pointing at `/checkin?token=...`. Scanning the code resolves
//! the token to a registrant, marks them checked in exactly once, and
//! renders an HTML confirmation page.
//!
//! ## Architecture
//!
//! ```text
//! Scanner (HTTP GET /checkin?token=...)
//!     │
//!     ├── Handlers + HTML page (api/)
//!     │
//!     ├── CheckinService (service/)
//!     │     ├── TokenResolver
//!     │     └── Pending → Checked state machine
//!     │
//!     └── RegistrantStore (store/)
//!           ├── PostgreSQL (sqlx)
//!           └── In-memory
//! ```
//!
//! The store is the only shared resource. The check-in write is a single
//! conditional update, so the first scan wins and every later or
//! concurrent scan observes "already checked in".

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod service;
pub mod store;

use std::sync::Arc;
use std::time::Duration;

use axum::error_handling::HandleErrorLayer;
use axum::{BoxError, Router};
use tower::ServiceBuilder;
use tower::timeout::TimeoutLayer;
use tower::timeout::error::Elapsed;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::error::CheckinError;

/// Builds the full application: routes, tracing, and request timeout.
///
/// A request that outlives `request_timeout` gets the HTML failure page
/// with a 5xx status, like any other server-side fault.
pub fn build_app(state: AppState, request_timeout: Duration) -> Router {
    api::build_router()
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .layer(TimeoutLayer::new(request_timeout)),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn handle_middleware_error(err: BoxError) -> CheckinError {
    if err.is::<Elapsed>() {
        CheckinError::Timeout
    } else {
        CheckinError::Internal(err.to_string())
    }
}

/// Opens the configured registrant store.
///
/// # Errors
///
/// Returns [`store::StoreError::Backend`] if the PostgreSQL store cannot
/// connect or migrate.
pub async fn open_store(
    config: &config::CheckinConfig,
) -> Result<Arc<dyn store::RegistrantStore>, store::StoreError> {
    let store: Arc<dyn store::RegistrantStore> = match config.store_backend {
        config::StoreBackend::Postgres => Arc::new(store::PostgresStore::connect(config).await?),
        config::StoreBackend::Memory => {
            tracing::warn!("using in-memory store; registrants are lost on restart");
            Arc::new(store::InMemoryStore::new())
        }
    };
    Ok(store)
}
