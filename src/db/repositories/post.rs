//! Post repository
//!
//! Database operations for posts and their category/tag associations.
//!
//! This module provides:
//! - `PostRepository` trait defining the interface for post data access
//! - `SqlxPostRepository` implementing the trait for SQLite
//!
//! Association semantics follow the workflow contract: attach appends
//! idempotently, sync replaces the full set, and deletion detaches
//! everything inside the same transaction as the row delete.

use crate::models::{Category, Post, PostChanges, Tag};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use std::sync::Arc;

/// Post repository trait
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Create a new post
    async fn create(&self, post: &Post) -> Result<Post>;

    /// Get post by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Post>>;

    /// List all posts, newest first
    async fn list(&self) -> Result<Vec<Post>>;

    /// List posts awaiting approval
    async fn list_pending(&self) -> Result<Vec<Post>>;

    /// Replace all row values of a post
    async fn update(&self, id: i64, changes: &PostChanges) -> Result<Post>;

    /// Mark a post as approved
    async fn set_approved(&self, id: i64) -> Result<()>;

    /// Delete a post together with its category and tag associations,
    /// inside a single transaction
    async fn delete_with_associations(&self, id: i64) -> Result<()>;

    /// Attach categories without touching existing associations
    async fn attach_categories(&self, post_id: i64, category_ids: &[i64]) -> Result<()>;

    /// Attach tags without touching existing associations
    async fn attach_tags(&self, post_id: i64, tag_ids: &[i64]) -> Result<()>;

    /// Replace the category association set with exactly the given ids
    async fn sync_categories(&self, post_id: i64, category_ids: &[i64]) -> Result<()>;

    /// Replace the tag association set with exactly the given ids
    async fn sync_tags(&self, post_id: i64, tag_ids: &[i64]) -> Result<()>;

    /// Get categories attached to a post
    async fn categories_of(&self, post_id: i64) -> Result<Vec<Category>>;

    /// Get tags attached to a post
    async fn tags_of(&self, post_id: i64) -> Result<Vec<Tag>>;
}

/// SQLx-based post repository implementation
pub struct SqlxPostRepository {
    pool: SqlitePool,
}

impl SqlxPostRepository {
    /// Create a new SQLx post repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn PostRepository> {
        Arc::new(Self::new(pool))
    }
}

fn post_from_row(row: &SqliteRow) -> Post {
    Post {
        id: row.get("id"),
        author_id: row.get("author_id"),
        title: row.get("title"),
        slug: row.get("slug"),
        image: row.get("image"),
        body: row.get("body"),
        status: row.get("status"),
        is_approved: row.get("is_approved"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

const POST_COLUMNS: &str =
    "id, author_id, title, slug, image, body, status, is_approved, created_at, updated_at";

#[async_trait]
impl PostRepository for SqlxPostRepository {
    async fn create(&self, post: &Post) -> Result<Post> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO posts (author_id, title, slug, image, body, status, is_approved, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(post.author_id)
        .bind(&post.title)
        .bind(&post.slug)
        .bind(&post.image)
        .bind(&post.body)
        .bind(post.status)
        .bind(post.is_approved)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to insert post")?;

        let mut created = post.clone();
        created.id = result.last_insert_rowid();
        created.created_at = now;
        created.updated_at = now;
        Ok(created)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Post>> {
        let row = sqlx::query(&format!("SELECT {} FROM posts WHERE id = ?", POST_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch post by id")?;

        Ok(row.as_ref().map(post_from_row))
    }

    async fn list(&self) -> Result<Vec<Post>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM posts ORDER BY created_at DESC, id DESC",
            POST_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .context("Failed to list posts")?;

        Ok(rows.iter().map(post_from_row).collect())
    }

    async fn list_pending(&self) -> Result<Vec<Post>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM posts WHERE is_approved = 0 ORDER BY created_at DESC, id DESC",
            POST_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .context("Failed to list pending posts")?;

        Ok(rows.iter().map(post_from_row).collect())
    }

    async fn update(&self, id: i64, changes: &PostChanges) -> Result<Post> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE posts
            SET title = ?, slug = ?, image = ?, body = ?, status = ?, is_approved = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&changes.title)
        .bind(&changes.slug)
        .bind(&changes.image)
        .bind(&changes.body)
        .bind(changes.status)
        .bind(changes.is_approved)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update post")?;

        if result.rows_affected() == 0 {
            anyhow::bail!("Post not found: {}", id);
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Post disappeared after update: {}", id))
    }

    async fn set_approved(&self, id: i64) -> Result<()> {
        sqlx::query("UPDATE posts SET is_approved = 1, updated_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to approve post")?;
        Ok(())
    }

    async fn delete_with_associations(&self, id: i64) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin delete transaction")?;

        sqlx::query("DELETE FROM post_categories WHERE post_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("Failed to detach categories")?;

        sqlx::query("DELETE FROM post_tags WHERE post_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("Failed to detach tags")?;

        sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("Failed to delete post")?;

        tx.commit().await.context("Failed to commit delete")?;
        Ok(())
    }

    async fn attach_categories(&self, post_id: i64, category_ids: &[i64]) -> Result<()> {
        for category_id in category_ids {
            sqlx::query("INSERT OR IGNORE INTO post_categories (post_id, category_id) VALUES (?, ?)")
                .bind(post_id)
                .bind(category_id)
                .execute(&self.pool)
                .await
                .context("Failed to attach category")?;
        }
        Ok(())
    }

    async fn attach_tags(&self, post_id: i64, tag_ids: &[i64]) -> Result<()> {
        for tag_id in tag_ids {
            sqlx::query("INSERT OR IGNORE INTO post_tags (post_id, tag_id) VALUES (?, ?)")
                .bind(post_id)
                .bind(tag_id)
                .execute(&self.pool)
                .await
                .context("Failed to attach tag")?;
        }
        Ok(())
    }

    async fn sync_categories(&self, post_id: i64, category_ids: &[i64]) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin sync transaction")?;

        sqlx::query("DELETE FROM post_categories WHERE post_id = ?")
            .bind(post_id)
            .execute(&mut *tx)
            .await
            .context("Failed to clear categories")?;

        for category_id in category_ids {
            sqlx::query("INSERT OR IGNORE INTO post_categories (post_id, category_id) VALUES (?, ?)")
                .bind(post_id)
                .bind(category_id)
                .execute(&mut *tx)
                .await
                .context("Failed to insert category association")?;
        }

        tx.commit().await.context("Failed to commit category sync")?;
        Ok(())
    }

    async fn sync_tags(&self, post_id: i64, tag_ids: &[i64]) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin sync transaction")?;

        sqlx::query("DELETE FROM post_tags WHERE post_id = ?")
            .bind(post_id)
            .execute(&mut *tx)
            .await
            .context("Failed to clear tags")?;

        for tag_id in tag_ids {
            sqlx::query("INSERT OR IGNORE INTO post_tags (post_id, tag_id) VALUES (?, ?)")
                .bind(post_id)
                .bind(tag_id)
                .execute(&mut *tx)
                .await
                .context("Failed to insert tag association")?;
        }

        tx.commit().await.context("Failed to commit tag sync")?;
        Ok(())
    }

    async fn categories_of(&self, post_id: i64) -> Result<Vec<Category>> {
        let rows = sqlx::query(
            r#"
            SELECT c.id, c.slug, c.name, c.created_at
            FROM categories c
            INNER JOIN post_categories pc ON pc.category_id = c.id
            WHERE pc.post_id = ?
            ORDER BY c.name
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch post categories")?;

        Ok(rows
            .iter()
            .map(|row| Category {
                id: row.get("id"),
                slug: row.get("slug"),
                name: row.get("name"),
                created_at: row.get("created_at"),
            })
            .collect())
    }

    async fn tags_of(&self, post_id: i64) -> Result<Vec<Tag>> {
        let rows = sqlx::query(
            r#"
            SELECT t.id, t.slug, t.name, t.created_at
            FROM tags t
            INNER JOIN post_tags pt ON pt.tag_id = t.id
            WHERE pt.post_id = ?
            ORDER BY t.name
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch post tags")?;

        Ok(rows
            .iter()
            .map(|row| Tag {
                id: row.get("id"),
                slug: row.get("slug"),
                name: row.get("name"),
                created_at: row.get("created_at"),
            })
            .collect())
    }
}
