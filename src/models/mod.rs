//! Data models
//!
//! This module contains all data structures used throughout the pressroom
//! admin panel. Models represent:
//! - Database entities (Post, Category, Tag, Subscriber, User, Session)
//! - Workflow input types (CreatePostInput, UpdatePostInput, ImageUpload)

mod category;
mod post;
mod session;
mod subscriber;
mod tag;
mod user;

pub use category::Category;
pub use post::{CreatePostInput, ImageUpload, Post, PostChanges, UpdatePostInput, DEFAULT_IMAGE};
pub use session::Session;
pub use subscriber::Subscriber;
pub use tag::Tag;
pub use user::{User, UserRole};
