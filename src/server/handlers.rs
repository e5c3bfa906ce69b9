//! HTTP request handlers

use crate::{
    queue::TagPublisher,
    server::app::AppState,
    types::{ErrorResponse, PingResponse},
    utils::version,
};
use axum::{
    Extension,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
};
use serde_json::Value;

/// Ping endpoint for health checks
///
/// GET /ping
pub async fn ping(
    State(state): State<AppState>,
    Extension(publisher): Extension<TagPublisher>,
) -> Json<PingResponse> {
    let uptime = state.start_time.elapsed().as_secs();
    let response = PingResponse::new(uptime, version::get_version(), publisher.exchange_name())
        .with_environment(state.store.env());

    tracing::debug!(
        "Ping response: uptime={}s, version={}",
        uptime,
        version::get_version()
    );
    Json(response)
}

/// Publish tag updates endpoint
///
/// POST /tag_updates
///
/// Forwards the JSON body to the tag updates exchange as-is. Accepted means
/// handed to the broker client, not delivered.
pub async fn publish_tag_updates(
    Extension(publisher): Extension<TagPublisher>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    let Json(tags) = payload.map_err(|rejection| {
        tracing::debug!("Rejected tag update body: {}", rejection);
        (
            rejection.status(),
            Json(ErrorResponse::new(rejection.body_text())),
        )
    })?;

    publisher.publish_tag_updates(&tags).await;
    Ok(StatusCode::ACCEPTED)
}
