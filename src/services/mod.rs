//! Business logic services
//!
//! Services sit between the HTTP handlers and the repositories. Each one
//! owns the rules of its area and returns typed errors the API layer maps
//! to status codes.

pub mod image;
pub mod notify;
pub mod password;
pub mod post;
pub mod taxonomy;
pub mod user;

pub use image::ImageStore;
pub use notify::{Notifier, SmtpNotifier};
pub use post::{ApprovalOutcome, PostService, PostServiceError};
pub use taxonomy::{CategoryService, SubscriberService, TagService, TaxonomyServiceError};
pub use user::{UserService, UserServiceError};
