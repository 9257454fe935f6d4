//! Tag repository
//!
//! Database operations for tags, same shape as the category repository.

use crate::models::Tag;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use std::sync::Arc;

/// Tag repository trait
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// Create a new tag
    async fn create(&self, tag: &Tag) -> Result<Tag>;

    /// Get tag by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Tag>>;

    /// Get tag by slug
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Tag>>;

    /// List all tags
    async fn list(&self) -> Result<Vec<Tag>>;
}

/// SQLx-based tag repository implementation
pub struct SqlxTagRepository {
    pool: SqlitePool,
}

impl SqlxTagRepository {
    /// Create a new SQLx tag repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn TagRepository> {
        Arc::new(Self::new(pool))
    }
}

fn tag_from_row(row: &SqliteRow) -> Tag {
    Tag {
        id: row.get("id"),
        slug: row.get("slug"),
        name: row.get("name"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl TagRepository for SqlxTagRepository {
    async fn create(&self, tag: &Tag) -> Result<Tag> {
        let now = Utc::now();

        let result = sqlx::query("INSERT INTO tags (slug, name, created_at) VALUES (?, ?, ?)")
            .bind(&tag.slug)
            .bind(&tag.name)
            .bind(now)
            .execute(&self.pool)
            .await
            .context("Failed to insert tag")?;

        let mut created = tag.clone();
        created.id = result.last_insert_rowid();
        created.created_at = now;
        Ok(created)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Tag>> {
        let row = sqlx::query("SELECT id, slug, name, created_at FROM tags WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch tag by id")?;

        Ok(row.as_ref().map(tag_from_row))
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Tag>> {
        let row = sqlx::query("SELECT id, slug, name, created_at FROM tags WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch tag by slug")?;

        Ok(row.as_ref().map(tag_from_row))
    }

    async fn list(&self) -> Result<Vec<Tag>> {
        let rows = sqlx::query("SELECT id, slug, name, created_at FROM tags ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list tags")?;

        Ok(rows.iter().map(tag_from_row).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup() -> SqlxTagRepository {
        let pool = create_test_pool().await.expect("pool");
        migrations::run_migrations(&pool).await.expect("migrations");
        SqlxTagRepository::new(pool)
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        let repo = setup().await;
        let created = repo
            .create(&Tag::new("rust".to_string(), "Rust".to_string()))
            .await
            .expect("create");

        assert!(created.id > 0);
        let fetched = repo.get_by_slug("rust").await.expect("get").expect("some");
        assert_eq!(fetched.name, "Rust");
    }

    #[tokio::test]
    async fn test_list() {
        let repo = setup().await;
        repo.create(&Tag::new("rust".to_string(), "Rust".to_string()))
            .await
            .expect("create");
        repo.create(&Tag::new("axum".to_string(), "Axum".to_string()))
            .await
            .expect("create");

        let all = repo.list().await.expect("list");
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "Axum");
    }
}
