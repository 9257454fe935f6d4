//! Subscriber API endpoints
//!
//! Public signup for the new-post email list.

use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::Deserialize;

use crate::api::middleware::{ApiError, AppState};
use crate::models::Subscriber;

/// Build the subscriber router (public)
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(subscribe))
}

#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    pub email: String,
}

/// POST /api/v1/subscribers - Join the mailing list
async fn subscribe(
    State(state): State<AppState>,
    Json(req): Json<SubscribeRequest>,
) -> Result<(StatusCode, Json<Subscriber>), ApiError> {
    let subscriber = state.subscriber_service.subscribe(&req.email).await?;
    Ok((StatusCode::CREATED, Json(subscriber)))
}
