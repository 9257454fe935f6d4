//! Post model
//!
//! This module provides:
//! - `Post` entity representing a blog post in the admin panel
//! - Input types for creating and updating posts
//! - `ImageUpload` carrying an uploaded cover image through the workflow

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel filename used when a post has no uploaded cover image.
///
/// A post always has an image reference; this placeholder stands in for a
/// real file and must never be deleted from storage.
pub const DEFAULT_IMAGE: &str = "default.png";

/// Post entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Unique identifier
    pub id: i64,
    /// Owning author user ID
    pub author_id: i64,
    /// Post title
    pub title: String,
    /// URL-friendly slug, recomputed from the title on every save
    pub slug: String,
    /// Stored cover image filename (never empty, `default.png` when absent)
    pub image: String,
    /// Post body
    pub body: String,
    /// Published flag, editor-controlled
    pub status: bool,
    /// Public visibility flag, workflow-controlled
    pub is_approved: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post record. The ID is assigned by the database.
    pub fn new(
        author_id: i64,
        title: String,
        slug: String,
        image: String,
        body: String,
        status: bool,
        is_approved: bool,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            author_id,
            title,
            slug,
            image,
            body,
            status,
            is_approved,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Full replacement values for a post row.
///
/// Every field is written on update: the slug is recomputed from the title
/// and both flags are re-derived, mirroring the form submission.
#[derive(Debug, Clone)]
pub struct PostChanges {
    /// New title
    pub title: String,
    /// Recomputed slug
    pub slug: String,
    /// Stored image filename (previous one if no new upload)
    pub image: String,
    /// New body
    pub body: String,
    /// Published flag
    pub status: bool,
    /// Visibility flag
    pub is_approved: bool,
}

/// An uploaded cover image, as read out of a multipart request.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// Original client filename (used for the extension)
    pub filename: String,
    /// MIME type reported by the client
    pub content_type: String,
    /// Raw file bytes
    pub data: Vec<u8>,
}

impl ImageUpload {
    /// Whether the reported MIME type is an image type.
    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }

    /// File extension taken from the original filename, falling back to the
    /// MIME subtype when the client sent a bare name.
    pub fn extension(&self) -> String {
        std::path::Path::new(&self.filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_else(|| {
                self.content_type
                    .strip_prefix("image/")
                    .unwrap_or("png")
                    .to_string()
            })
    }
}

/// Input for creating a new post
#[derive(Debug, Clone, Default)]
pub struct CreatePostInput {
    /// Post title (required)
    pub title: String,
    /// Post body (required)
    pub body: String,
    /// Categories to attach (required, at least one)
    pub category_ids: Vec<i64>,
    /// Tags to attach (required, at least one)
    pub tag_ids: Vec<i64>,
    /// Published checkbox; absent means draft
    pub status: bool,
    /// Uploaded cover image; the sentinel filename is stored when absent
    pub image: Option<ImageUpload>,
}

/// Input for updating an existing post
///
/// Same shape as [`CreatePostInput`]; the image is optional here and the
/// previous stored file is replaced when a new one is supplied.
#[derive(Debug, Clone, Default)]
pub struct UpdatePostInput {
    /// New title (required)
    pub title: String,
    /// New body (required)
    pub body: String,
    /// Categories to sync (required, replaces the full set)
    pub category_ids: Vec<i64>,
    /// Tags to sync (required, replaces the full set)
    pub tag_ids: Vec<i64>,
    /// Published checkbox; absent means draft
    pub status: bool,
    /// Replacement cover image (optional)
    pub image: Option<ImageUpload>,
}
