//! Pressroom - a self-hosted blog administration backend
//!
//! This library provides the post publishing workflow: authenticated post
//! CRUD with cover image handling, category and tag taxonomies, a
//! subscriber mailing list, and an admin moderation queue.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
