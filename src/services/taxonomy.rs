//! Category and tag management
//!
//! Both taxonomies behave identically: a name is slugified on create,
//! duplicate slugs are rejected with a conflict, and listing is
//! alphabetical. Kept as two services so each endpoint group owns one.

use crate::db::repositories::{CategoryRepository, SubscriberRepository, TagRepository};
use crate::models::{Category, Subscriber, Tag};
use crate::services::post::generate_slug;
use anyhow::Context;
use std::sync::Arc;

/// Error types for taxonomy and subscriber operations
#[derive(Debug, thiserror::Error)]
pub enum TaxonomyServiceError {
    /// An entry with the same slug or email already exists
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// The submitted name or email failed validation
    #[error("Validation failed: {0}")]
    ValidationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Category management service
pub struct CategoryService {
    categories: Arc<dyn CategoryRepository>,
}

impl CategoryService {
    pub fn new(categories: Arc<dyn CategoryRepository>) -> Self {
        Self { categories }
    }

    /// Create a category from a display name.
    pub async fn create(&self, name: &str) -> Result<Category, TaxonomyServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TaxonomyServiceError::ValidationError(
                "name is required".to_string(),
            ));
        }

        let slug = generate_slug(name);
        if self
            .categories
            .get_by_slug(&slug)
            .await
            .context("Failed to check category slug")?
            .is_some()
        {
            return Err(TaxonomyServiceError::AlreadyExists(slug));
        }

        Ok(self
            .categories
            .create(&Category::new(slug, name.to_string()))
            .await
            .context("Failed to create category")?)
    }

    /// All categories, alphabetical.
    pub async fn list(&self) -> Result<Vec<Category>, TaxonomyServiceError> {
        Ok(self
            .categories
            .list()
            .await
            .context("Failed to list categories")?)
    }
}

/// Tag management service
pub struct TagService {
    tags: Arc<dyn TagRepository>,
}

impl TagService {
    pub fn new(tags: Arc<dyn TagRepository>) -> Self {
        Self { tags }
    }

    /// Create a tag from a display name.
    pub async fn create(&self, name: &str) -> Result<Tag, TaxonomyServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TaxonomyServiceError::ValidationError(
                "name is required".to_string(),
            ));
        }

        let slug = generate_slug(name);
        if self
            .tags
            .get_by_slug(&slug)
            .await
            .context("Failed to check tag slug")?
            .is_some()
        {
            return Err(TaxonomyServiceError::AlreadyExists(slug));
        }

        Ok(self
            .tags
            .create(&Tag::new(slug, name.to_string()))
            .await
            .context("Failed to create tag")?)
    }

    /// All tags, alphabetical.
    pub async fn list(&self) -> Result<Vec<Tag>, TaxonomyServiceError> {
        Ok(self.tags.list().await.context("Failed to list tags")?)
    }
}

/// Subscriber signup service
pub struct SubscriberService {
    subscribers: Arc<dyn SubscriberRepository>,
}

impl SubscriberService {
    pub fn new(subscribers: Arc<dyn SubscriberRepository>) -> Self {
        Self { subscribers }
    }

    /// Sign an email address up for new-post notices.
    pub async fn subscribe(&self, email: &str) -> Result<Subscriber, TaxonomyServiceError> {
        let email = email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(TaxonomyServiceError::ValidationError(
                "a valid email is required".to_string(),
            ));
        }

        if self
            .subscribers
            .get_by_email(&email)
            .await
            .context("Failed to check subscriber email")?
            .is_some()
        {
            return Err(TaxonomyServiceError::AlreadyExists(email));
        }

        Ok(self
            .subscribers
            .create(&Subscriber::new(email))
            .await
            .context("Failed to create subscriber")?)
    }
}
