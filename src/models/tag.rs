//! Tag model
//!
//! Tags label posts across categories. Like categories they are listed
//! wholesale on the post forms, with their own management screen.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tag entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tag {
    /// Unique identifier
    pub id: i64,
    /// URL-friendly slug
    pub slug: String,
    /// Tag name
    pub name: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Tag {
    /// Create a new Tag. The ID is assigned by the database.
    pub fn new(slug: String, name: String) -> Self {
        Self {
            id: 0,
            slug,
            name,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_new() {
        let tag = Tag::new("rust".to_string(), "Rust".to_string());

        assert_eq!(tag.id, 0);
        assert_eq!(tag.slug, "rust");
        assert_eq!(tag.name, "Rust");
    }
}
