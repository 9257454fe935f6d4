//! Post API endpoints
//!
//! The admin panel's post workflow: listing, form option lookups,
//! create/update via multipart forms (the cover image rides along with the
//! text fields), deletion, and the moderation queue.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::Serialize;

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::{
    Category, CreatePostInput, ImageUpload, Post, Tag, UpdatePostInput,
};
use crate::services::ApprovalOutcome;

/// Build the post router (authenticated)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_posts).post(create_post))
        .route("/new", get(new_post_form))
        .route("/{id}", get(get_post).put(update_post).delete(delete_post))
        .route("/{id}/edit", get(edit_post_form))
}

/// Build the moderation router (admin only)
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/pending", get(pending_posts))
        .route("/{id}/approval", put(approve_post))
}

/// Response for a post with its associations
#[derive(Debug, Serialize)]
pub struct PostResponse {
    #[serde(flatten)]
    pub post: Post,
    pub categories: Vec<Category>,
    pub tags: Vec<Tag>,
}

/// Response carrying the category/tag choices for the post forms
#[derive(Debug, Serialize)]
pub struct FormOptionsResponse {
    pub categories: Vec<Category>,
    pub tags: Vec<Tag>,
}

/// Response for the edit form: the post plus the form choices
#[derive(Debug, Serialize)]
pub struct EditFormResponse {
    pub post: PostResponse,
    pub options: FormOptionsResponse,
}

/// Response for create/update/approval, with a human-readable notice
#[derive(Debug, Serialize)]
pub struct PostActionResponse {
    pub message: String,
    pub post: Post,
}

/// GET /api/v1/posts - List all posts, newest first
async fn list_posts(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<Json<Vec<Post>>, ApiError> {
    Ok(Json(state.post_service.list().await?))
}

/// GET /api/v1/posts/new - Category and tag choices for the create form
async fn new_post_form(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<Json<FormOptionsResponse>, ApiError> {
    let options = state.post_service.form_options().await?;
    Ok(Json(FormOptionsResponse {
        categories: options.categories,
        tags: options.tags,
    }))
}

/// GET /api/v1/posts/{id}/edit - The post plus form choices, pre-fill ready
async fn edit_post_form(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<Json<EditFormResponse>, ApiError> {
    let detail = state.post_service.get(id).await?;
    let options = state.post_service.form_options().await?;
    Ok(Json(EditFormResponse {
        post: PostResponse {
            post: detail.post,
            categories: detail.categories,
            tags: detail.tags,
        },
        options: FormOptionsResponse {
            categories: options.categories,
            tags: options.tags,
        },
    }))
}

/// GET /api/v1/posts/{id} - A single post with its associations
async fn get_post(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<Json<PostResponse>, ApiError> {
    let detail = state.post_service.get(id).await?;
    Ok(Json(PostResponse {
        post: detail.post,
        categories: detail.categories,
        tags: detail.tags,
    }))
}

/// POST /api/v1/posts - Create a post from a multipart form
async fn create_post(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<PostActionResponse>), ApiError> {
    let form = read_post_form(multipart).await?;

    let input = CreatePostInput {
        title: form.title,
        body: form.body,
        category_ids: form.category_ids,
        tag_ids: form.tag_ids,
        status: form.status,
        image: form.image,
    };

    let post = state.post_service.create(user.0.id, input).await?;

    Ok((
        StatusCode::CREATED,
        Json(PostActionResponse {
            message: "Post created successfully".to_string(),
            post,
        }),
    ))
}

/// PUT /api/v1/posts/{id} - Update a post from a multipart form
async fn update_post(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<Json<PostActionResponse>, ApiError> {
    let form = read_post_form(multipart).await?;

    let input = UpdatePostInput {
        title: form.title,
        body: form.body,
        category_ids: form.category_ids,
        tag_ids: form.tag_ids,
        status: form.status,
        image: form.image,
    };

    let post = state.post_service.update(id, input).await?;

    Ok(Json(PostActionResponse {
        message: "Post updated successfully".to_string(),
        post,
    }))
}

/// DELETE /api/v1/posts/{id} - Delete a post and its stored image
async fn delete_post(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.post_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/admin/posts/pending - Posts awaiting approval
async fn pending_posts(
    State(state): State<AppState>,
) -> Result<Json<Vec<Post>>, ApiError> {
    Ok(Json(state.post_service.pending().await?))
}

/// PUT /api/v1/admin/posts/{id}/approval - Approve a pending post
async fn approve_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let message = match state.post_service.approve(id).await? {
        ApprovalOutcome::Approved => "Post approved successfully",
        ApprovalOutcome::AlreadyApproved => "Post is already approved",
    };
    Ok(Json(serde_json::json!({ "message": message })))
}

/// Raw fields read out of a post form submission.
struct PostForm {
    title: String,
    body: String,
    category_ids: Vec<i64>,
    tag_ids: Vec<i64>,
    status: bool,
    image: Option<ImageUpload>,
}

/// Read a post form out of a multipart body.
///
/// Text fields arrive once; `categories` and `tags` repeat, one value per
/// selection. The `status` checkbox is present only when checked. A `file`
/// field with no filename (an empty file input) counts as no upload.
async fn read_post_form(mut multipart: Multipart) -> Result<PostForm, ApiError> {
    let mut form = PostForm {
        title: String::new(),
        body: String::new(),
        category_ids: Vec::new(),
        tag_ids: Vec::new(),
        status: false,
        image: None,
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation_error(format!("Failed to read multipart: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "title" => form.title = read_text(field).await?,
            "body" => form.body = read_text(field).await?,
            "categories" => form.category_ids.push(read_id(field).await?),
            "tags" => form.tag_ids.push(read_id(field).await?),
            "status" => {
                let value = read_text(field).await?;
                form.status = matches!(value.as_str(), "on" | "true" | "1");
            }
            "image" => {
                let filename = field.file_name().unwrap_or("").to_string();
                if filename.is_empty() {
                    continue;
                }
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| {
                        ApiError::validation_error(format!("Failed to read image: {}", e))
                    })?
                    .to_vec();
                form.image = Some(ImageUpload {
                    filename,
                    content_type,
                    data,
                });
            }
            _ => {}
        }
    }

    Ok(form)
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::validation_error(format!("Failed to read field: {}", e)))
}

async fn read_id(field: axum::extract::multipart::Field<'_>) -> Result<i64, ApiError> {
    let value = read_text(field).await?;
    value
        .trim()
        .parse()
        .map_err(|_| ApiError::validation_error(format!("Invalid id: {}", value)))
}
