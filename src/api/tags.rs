//! Tag API endpoints

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::Tag;

/// Build the tag router (authenticated)
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_tags).post(create_tag))
}

#[derive(Debug, Deserialize)]
pub struct CreateTagRequest {
    pub name: String,
}

/// GET /api/v1/tags - All tags, alphabetical
async fn list_tags(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<Json<Vec<Tag>>, ApiError> {
    Ok(Json(state.tag_service.list().await?))
}

/// POST /api/v1/tags - Create a tag
async fn create_tag(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Json(req): Json<CreateTagRequest>,
) -> Result<(StatusCode, Json<Tag>), ApiError> {
    let tag = state.tag_service.create(&req.name).await?;
    Ok((StatusCode::CREATED, Json(tag)))
}
