//! Category repository
//!
//! Database operations for categories. The whole list is fetched when
//! building post forms; there is no pagination.

use crate::models::Category;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use std::sync::Arc;

/// Category repository trait
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Create a new category
    async fn create(&self, category: &Category) -> Result<Category>;

    /// Get category by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Category>>;

    /// Get category by slug
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>>;

    /// List all categories
    async fn list(&self) -> Result<Vec<Category>>;
}

/// SQLx-based category repository implementation
pub struct SqlxCategoryRepository {
    pool: SqlitePool,
}

impl SqlxCategoryRepository {
    /// Create a new SQLx category repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn CategoryRepository> {
        Arc::new(Self::new(pool))
    }
}

fn category_from_row(row: &SqliteRow) -> Category {
    Category {
        id: row.get("id"),
        slug: row.get("slug"),
        name: row.get("name"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl CategoryRepository for SqlxCategoryRepository {
    async fn create(&self, category: &Category) -> Result<Category> {
        let now = Utc::now();

        let result = sqlx::query("INSERT INTO categories (slug, name, created_at) VALUES (?, ?, ?)")
            .bind(&category.slug)
            .bind(&category.name)
            .bind(now)
            .execute(&self.pool)
            .await
            .context("Failed to insert category")?;

        let mut created = category.clone();
        created.id = result.last_insert_rowid();
        created.created_at = now;
        Ok(created)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Category>> {
        let row = sqlx::query("SELECT id, slug, name, created_at FROM categories WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch category by id")?;

        Ok(row.as_ref().map(category_from_row))
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        let row = sqlx::query("SELECT id, slug, name, created_at FROM categories WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch category by slug")?;

        Ok(row.as_ref().map(category_from_row))
    }

    async fn list(&self) -> Result<Vec<Category>> {
        let rows = sqlx::query("SELECT id, slug, name, created_at FROM categories ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list categories")?;

        Ok(rows.iter().map(category_from_row).collect())
    }
}
