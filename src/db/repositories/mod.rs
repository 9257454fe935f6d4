//! Database repositories
//!
//! Repository pattern implementations for database access.
//! Each repository handles CRUD operations for a specific entity.

pub mod category;
pub mod post;
pub mod session;
pub mod subscriber;
pub mod tag;
pub mod user;

pub use category::{CategoryRepository, SqlxCategoryRepository};
pub use post::{PostRepository, SqlxPostRepository};
pub use session::{SessionRepository, SqlxSessionRepository};
pub use subscriber::{SqlxSubscriberRepository, SubscriberRepository};
pub use tag::{SqlxTagRepository, TagRepository};
pub use user::{SqlxUserRepository, UserRepository};
