//! Account and session management
//!
//! Registration, login, logout, and session validation. Sessions are
//! opaque random tokens stored server-side with a fixed lifetime; the
//! first registered account becomes the admin.

use crate::db::repositories::{SessionRepository, UserRepository};
use crate::models::{Session, User, UserRole};
use crate::services::password::{hash_password, verify_password};
use anyhow::Context;
use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// How long a login session stays valid.
const SESSION_LIFETIME_DAYS: i64 = 7;

/// Error types for account operations
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    /// Username or email already taken
    #[error("Account already exists: {0}")]
    AlreadyExists(String),

    /// Wrong username or password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// One or more fields failed validation
    #[error("Validation failed: {}", .0.join(", "))]
    ValidationError(Vec<String>),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// User service for accounts and sessions
pub struct UserService {
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionRepository>,
}

impl UserService {
    /// Create a new user service
    pub fn new(users: Arc<dyn UserRepository>, sessions: Arc<dyn SessionRepository>) -> Self {
        Self { users, sessions }
    }

    /// Register a new account.
    ///
    /// The first account in an empty database becomes the admin; everyone
    /// after that is an editor.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, UserServiceError> {
        let mut errors = Vec::new();
        if username.trim().is_empty() {
            errors.push("username is required".to_string());
        }
        if email.trim().is_empty() || !email.contains('@') {
            errors.push("a valid email is required".to_string());
        }
        if password.len() < 8 {
            errors.push("password must be at least 8 characters".to_string());
        }
        if !errors.is_empty() {
            return Err(UserServiceError::ValidationError(errors));
        }

        if self
            .users
            .get_by_username(username)
            .await
            .context("Failed to check username")?
            .is_some()
        {
            return Err(UserServiceError::AlreadyExists(username.to_string()));
        }

        let role = if self.users.count().await.context("Failed to count users")? == 0 {
            UserRole::Admin
        } else {
            UserRole::Editor
        };

        let now = Utc::now();
        let user = User {
            id: 0,
            username: username.trim().to_string(),
            email: email.trim().to_string(),
            password_hash: hash_password(password).context("Failed to hash password")?,
            role,
            created_at: now,
            updated_at: now,
        };

        Ok(self
            .users
            .create(&user)
            .await
            .context("Failed to create user")?)
    }

    /// Verify credentials and open a new session.
    ///
    /// A missing account and a wrong password produce the same error so
    /// login attempts cannot probe for usernames.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(User, Session), UserServiceError> {
        let user = self
            .users
            .get_by_username(username)
            .await
            .context("Failed to fetch user")?
            .ok_or(UserServiceError::InvalidCredentials)?;

        let valid = verify_password(password, &user.password_hash)
            .context("Failed to verify password")?;
        if !valid {
            return Err(UserServiceError::InvalidCredentials);
        }

        // Each successful login doubles as the cleanup point for sessions
        // that expired without an explicit logout.
        let purged = self
            .sessions
            .delete_expired()
            .await
            .context("Failed to purge expired sessions")?;
        if purged > 0 {
            tracing::debug!(purged, "purged expired sessions");
        }

        let session = Session {
            id: Uuid::new_v4().simple().to_string(),
            user_id: user.id,
            expires_at: Utc::now() + Duration::days(SESSION_LIFETIME_DAYS),
            created_at: Utc::now(),
        };
        self.sessions
            .create(&session)
            .await
            .context("Failed to create session")?;

        Ok((user, session))
    }

    /// Discard a session. Unknown tokens are a no-op.
    pub async fn logout(&self, session_id: &str) -> Result<(), UserServiceError> {
        self.sessions
            .delete(session_id)
            .await
            .context("Failed to delete session")?;
        Ok(())
    }

    /// Resolve a session token to its user, rejecting expired sessions.
    pub async fn validate_session(&self, session_id: &str) -> Result<Option<User>, UserServiceError> {
        let session = match self
            .sessions
            .get_by_id(session_id)
            .await
            .context("Failed to fetch session")?
        {
            Some(s) => s,
            None => return Ok(None),
        };

        if session.is_expired() {
            self.sessions
                .delete(session_id)
                .await
                .context("Failed to delete expired session")?;
            return Ok(None);
        }

        Ok(self
            .users
            .get_by_id(session.user_id)
            .await
            .context("Failed to fetch session user")?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SqlxSessionRepository, SqlxUserRepository};
    use crate::db::{create_test_pool, migrations};

    async fn setup() -> UserService {
        let pool = create_test_pool().await.expect("pool");
        migrations::run_migrations(&pool).await.expect("migrations");
        UserService::new(
            SqlxUserRepository::boxed(pool.clone()),
            SqlxSessionRepository::boxed(pool),
        )
    }

    #[tokio::test]
    async fn test_first_account_is_admin() {
        let service = setup().await;

        let first = service
            .register("alice", "alice@example.com", "password123")
            .await
            .expect("register");
        let second = service
            .register("bob", "bob@example.com", "password123")
            .await
            .expect("register");

        assert_eq!(first.role, UserRole::Admin);
        assert_eq!(second.role, UserRole::Editor);
    }

    #[tokio::test]
    async fn test_register_rejects_duplicate_username() {
        let service = setup().await;
        service
            .register("alice", "alice@example.com", "password123")
            .await
            .expect("register");

        assert!(matches!(
            service
                .register("alice", "other@example.com", "password123")
                .await,
            Err(UserServiceError::AlreadyExists(_))
        ));
    }

    #[tokio::test]
    async fn test_register_validates_fields() {
        let service = setup().await;
        let err = service
            .register("", "not-an-email", "short")
            .await
            .expect_err("should fail");

        match err {
            UserServiceError::ValidationError(errors) => assert_eq!(errors.len(), 3),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_login_and_validate_session() {
        let service = setup().await;
        let user = service
            .register("alice", "alice@example.com", "password123")
            .await
            .expect("register");

        let (logged_in, session) = service
            .login("alice", "password123")
            .await
            .expect("login");
        assert_eq!(logged_in.id, user.id);

        let resolved = service
            .validate_session(&session.id)
            .await
            .expect("validate")
            .expect("session valid");
        assert_eq!(resolved.id, user.id);
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let service = setup().await;
        service
            .register("alice", "alice@example.com", "password123")
            .await
            .expect("register");

        assert!(matches!(
            service.login("alice", "wrong_password").await,
            Err(UserServiceError::InvalidCredentials)
        ));
        assert!(matches!(
            service.login("nobody", "password123").await,
            Err(UserServiceError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_logout_invalidates_session() {
        let service = setup().await;
        service
            .register("alice", "alice@example.com", "password123")
            .await
            .expect("register");
        let (_, session) = service.login("alice", "password123").await.expect("login");

        service.logout(&session.id).await.expect("logout");
        assert!(service
            .validate_session(&session.id)
            .await
            .expect("validate")
            .is_none());
    }

    #[tokio::test]
    async fn test_login_purges_expired_sessions() {
        let pool = create_test_pool().await.expect("pool");
        migrations::run_migrations(&pool).await.expect("migrations");
        let sessions = Arc::new(SqlxSessionRepository::new(pool.clone()));
        let service = UserService::new(SqlxUserRepository::boxed(pool), sessions.clone());

        let user = service
            .register("alice", "alice@example.com", "password123")
            .await
            .expect("register");
        let stale = Session {
            id: "stale-token".to_string(),
            user_id: user.id,
            expires_at: Utc::now() - Duration::hours(1),
            created_at: Utc::now() - Duration::days(8),
        };
        sessions.create(&stale).await.expect("stale session");

        let (_, fresh) = service.login("alice", "password123").await.expect("login");

        assert!(sessions
            .get_by_id("stale-token")
            .await
            .expect("lookup")
            .is_none());
        assert!(sessions
            .get_by_id(&fresh.id)
            .await
            .expect("lookup")
            .is_some());
    }

    #[tokio::test]
    async fn test_unknown_session_is_none() {
        let service = setup().await;
        assert!(service
            .validate_session("no-such-token")
            .await
            .expect("validate")
            .is_none());
    }
}
