//! Category model
//!
//! Categories have an independent lifecycle and are listed wholesale when
//! building post forms. No hierarchy, no pagination.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    /// Unique identifier
    pub id: i64,
    /// URL-friendly slug
    pub slug: String,
    /// Category name
    pub name: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Category {
    /// Create a new Category. The ID is assigned by the database.
    pub fn new(slug: String, name: String) -> Self {
        Self {
            id: 0,
            slug,
            name,
            created_at: Utc::now(),
        }
    }
}
