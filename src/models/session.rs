//! Session model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An authenticated session identified by an opaque token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Opaque session token (primary key)
    pub id: String,
    /// Owning user ID
    pub user_id: i64,
    /// Expiry timestamp
    pub expires_at: DateTime<Utc>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Whether the session has passed its expiry time.
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}
