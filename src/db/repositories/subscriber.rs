//! Subscriber repository
//!
//! Database operations for subscribers. The publishing workflow enumerates
//! the full list on every fan-out; the only writes come from the public
//! subscribe endpoint.

use crate::models::Subscriber;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use std::sync::Arc;

/// Subscriber repository trait
#[async_trait]
pub trait SubscriberRepository: Send + Sync {
    /// Register a new subscriber
    async fn create(&self, subscriber: &Subscriber) -> Result<Subscriber>;

    /// Get subscriber by email
    async fn get_by_email(&self, email: &str) -> Result<Option<Subscriber>>;

    /// List all subscribers
    async fn list(&self) -> Result<Vec<Subscriber>>;
}

/// SQLx-based subscriber repository implementation
pub struct SqlxSubscriberRepository {
    pool: SqlitePool,
}

impl SqlxSubscriberRepository {
    /// Create a new SQLx subscriber repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn SubscriberRepository> {
        Arc::new(Self::new(pool))
    }
}

fn subscriber_from_row(row: &SqliteRow) -> Subscriber {
    Subscriber {
        id: row.get("id"),
        email: row.get("email"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl SubscriberRepository for SqlxSubscriberRepository {
    async fn create(&self, subscriber: &Subscriber) -> Result<Subscriber> {
        let now = Utc::now();

        let result = sqlx::query("INSERT INTO subscribers (email, created_at) VALUES (?, ?)")
            .bind(&subscriber.email)
            .bind(now)
            .execute(&self.pool)
            .await
            .context("Failed to insert subscriber")?;

        let mut created = subscriber.clone();
        created.id = result.last_insert_rowid();
        created.created_at = now;
        Ok(created)
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<Subscriber>> {
        let row = sqlx::query("SELECT id, email, created_at FROM subscribers WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch subscriber by email")?;

        Ok(row.as_ref().map(subscriber_from_row))
    }

    async fn list(&self) -> Result<Vec<Subscriber>> {
        let rows = sqlx::query("SELECT id, email, created_at FROM subscribers ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list subscribers")?;

        Ok(rows.iter().map(subscriber_from_row).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup() -> SqlxSubscriberRepository {
        let pool = create_test_pool().await.expect("pool");
        migrations::run_migrations(&pool).await.expect("migrations");
        SqlxSubscriberRepository::new(pool)
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let repo = setup().await;
        repo.create(&Subscriber::new("a@example.com".to_string()))
            .await
            .expect("create");
        repo.create(&Subscriber::new("b@example.com".to_string()))
            .await
            .expect("create");

        let all = repo.list().await.expect("list");
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].email, "a@example.com");
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let repo = setup().await;
        repo.create(&Subscriber::new("a@example.com".to_string()))
            .await
            .expect("create");
        assert!(repo
            .create(&Subscriber::new("a@example.com".to_string()))
            .await
            .is_err());
    }
}
