//! Database layer
//!
//! SQLite connection pooling, embedded migrations, and repository
//! implementations for the admin panel entities.

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{create_pool, create_sqlite_pool, create_test_pool};
