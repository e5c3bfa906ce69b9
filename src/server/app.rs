//! Axum application setup
//!
//! Routes are built first so plugins can decorate them, then the
//! middleware stack and shared state are applied.

use crate::config::Store;
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Resolved settings store
    pub store: Arc<Store>,
    /// Server start time for uptime calculation
    pub start_time: std::time::Instant,
}

/// Undecorated application routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/ping", get(super::handlers::ping))
        .route("/tag_updates", post(super::handlers::publish_tag_updates))
}

/// Finish a (decorated) router with middleware and state
pub fn create_app(router: Router<AppState>, store: Arc<Store>) -> Router {
    let state = AppState {
        store,
        start_time: std::time::Instant::now(),
    };

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
