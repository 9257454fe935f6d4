//! Category API endpoints

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::Category;

/// Build the category router (authenticated)
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_categories).post(create_category))
}

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
}

/// GET /api/v1/categories - All categories, alphabetical
async fn list_categories(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<Json<Vec<Category>>, ApiError> {
    Ok(Json(state.category_service.list().await?))
}

/// POST /api/v1/categories - Create a category
async fn create_category(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Json(req): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    let category = state.category_service.create(&req.name).await?;
    Ok((StatusCode::CREATED, Json(category)))
}
