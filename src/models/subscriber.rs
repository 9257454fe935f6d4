//! Subscriber model
//!
//! Subscribers receive an email every time a post is published or approved.
//! The publishing workflow treats them as read-only: the full list is
//! enumerated on every fan-out, with no per-subscriber preference.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Subscriber entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Subscriber {
    /// Unique identifier
    pub id: i64,
    /// Email address notifications are sent to
    pub email: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Subscriber {
    /// Create a new Subscriber. The ID is assigned by the database.
    pub fn new(email: String) -> Self {
        Self {
            id: 0,
            email,
            created_at: Utc::now(),
        }
    }
}
