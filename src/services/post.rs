//! Post publishing workflow
//!
//! Implements the business logic of the admin panel:
//! - Create, read, update, delete posts
//! - Slug generation from the title
//! - Cover image storage and replacement
//! - Category/tag attach and sync
//! - Subscriber fan-out on publish, author + subscriber notices on approval
//! - The pending/approval moderation queue
//!
//! The current user is always an explicit `author_id` parameter so the
//! workflow is testable without ambient request state.

use crate::db::repositories::{
    CategoryRepository, PostRepository, SubscriberRepository, TagRepository, UserRepository,
};
use crate::models::{
    Category, CreatePostInput, ImageUpload, Post, PostChanges, Tag, UpdatePostInput, DEFAULT_IMAGE,
};
use crate::services::image::ImageStore;
use crate::services::notify::Notifier;
use anyhow::Context;
use std::sync::Arc;

/// Error types for post workflow operations
#[derive(Debug, thiserror::Error)]
pub enum PostServiceError {
    /// Post not found
    #[error("Post not found: {0}")]
    NotFound(i64),

    /// One or more form fields failed validation
    #[error("Validation failed: {}", .0.join(", "))]
    ValidationError(Vec<String>),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Outcome of an approval request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalOutcome {
    /// The post was pending and has now been approved.
    Approved,
    /// The post was already approved; nothing changed.
    AlreadyApproved,
}

/// Choices offered by the create/edit forms: every category and every tag.
#[derive(Debug, Clone)]
pub struct FormOptions {
    pub categories: Vec<Category>,
    pub tags: Vec<Tag>,
}

/// A post together with its attached categories and tags.
#[derive(Debug, Clone)]
pub struct PostDetail {
    pub post: Post,
    pub categories: Vec<Category>,
    pub tags: Vec<Tag>,
}

/// Post service implementing the publishing workflow
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    categories: Arc<dyn CategoryRepository>,
    tags: Arc<dyn TagRepository>,
    subscribers: Arc<dyn SubscriberRepository>,
    users: Arc<dyn UserRepository>,
    images: Arc<ImageStore>,
    notifier: Arc<dyn Notifier>,
}

impl PostService {
    /// Create a new post service
    pub fn new(
        posts: Arc<dyn PostRepository>,
        categories: Arc<dyn CategoryRepository>,
        tags: Arc<dyn TagRepository>,
        subscribers: Arc<dyn SubscriberRepository>,
        users: Arc<dyn UserRepository>,
        images: Arc<ImageStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            posts,
            categories,
            tags,
            subscribers,
            users,
            images,
            notifier,
        }
    }

    /// All posts, newest first.
    pub async fn list(&self) -> Result<Vec<Post>, PostServiceError> {
        Ok(self.posts.list().await.context("Failed to list posts")?)
    }

    /// Category and tag choices for the create/edit forms.
    pub async fn form_options(&self) -> Result<FormOptions, PostServiceError> {
        let categories = self
            .categories
            .list()
            .await
            .context("Failed to list categories")?;
        let tags = self.tags.list().await.context("Failed to list tags")?;
        Ok(FormOptions { categories, tags })
    }

    /// A post with its associations, for the show and edit screens.
    pub async fn get(&self, id: i64) -> Result<PostDetail, PostServiceError> {
        let post = self
            .posts
            .get_by_id(id)
            .await
            .context("Failed to fetch post")?
            .ok_or(PostServiceError::NotFound(id))?;

        let categories = self
            .posts
            .categories_of(id)
            .await
            .context("Failed to fetch post categories")?;
        let tags = self
            .posts
            .tags_of(id)
            .await
            .context("Failed to fetch post tags")?;

        Ok(PostDetail {
            post,
            categories,
            tags,
        })
    }

    /// Create a post and notify every subscriber.
    ///
    /// The slug is derived from the title (collisions are accepted), the
    /// cover image is resized and stored under a generated unique filename
    /// or falls back to the sentinel, and categories/tags are attached.
    ///
    /// `is_approved` is set unconditionally: self-published posts skip the
    /// moderation queue. A failing subscriber delivery is logged and
    /// skipped; it never aborts the request or the remaining recipients.
    pub async fn create(
        &self,
        author_id: i64,
        input: CreatePostInput,
    ) -> Result<Post, PostServiceError> {
        validate_fields(
            &input.title,
            &input.body,
            &input.category_ids,
            &input.tag_ids,
            input.image.as_ref(),
        )?;
        self.check_associations(&input.category_ids, &input.tag_ids)
            .await?;

        let slug = generate_slug(&input.title);

        let image = match input.image {
            Some(upload) => self
                .images
                .store(&slug, upload)
                .await
                .context("Failed to store cover image")?,
            None => DEFAULT_IMAGE.to_string(),
        };

        let post = self
            .posts
            .create(&Post::new(
                author_id,
                input.title,
                slug,
                image,
                input.body,
                input.status,
                true,
            ))
            .await
            .context("Failed to create post")?;

        self.posts
            .attach_categories(post.id, &input.category_ids)
            .await
            .context("Failed to attach categories")?;
        self.posts
            .attach_tags(post.id, &input.tag_ids)
            .await
            .context("Failed to attach tags")?;

        let notified = self.notify_subscribers(&post).await?;
        tracing::info!(post_id = post.id, notified, "post created");

        Ok(post)
    }

    /// Update a post in place.
    ///
    /// The slug is recomputed from the new title. A new cover image
    /// replaces the stored file (the previous file is deleted first, the
    /// sentinel never is). Associations are synced, not appended, and no
    /// subscriber notification fires.
    pub async fn update(
        &self,
        id: i64,
        input: UpdatePostInput,
    ) -> Result<Post, PostServiceError> {
        let existing = self
            .posts
            .get_by_id(id)
            .await
            .context("Failed to fetch post")?
            .ok_or(PostServiceError::NotFound(id))?;

        validate_fields(
            &input.title,
            &input.body,
            &input.category_ids,
            &input.tag_ids,
            input.image.as_ref(),
        )?;
        self.check_associations(&input.category_ids, &input.tag_ids)
            .await?;

        let slug = generate_slug(&input.title);

        let image = match input.image {
            Some(upload) => {
                self.images
                    .remove(&existing.image)
                    .await
                    .context("Failed to delete previous cover image")?;
                self.images
                    .store(&slug, upload)
                    .await
                    .context("Failed to store cover image")?
            }
            None => existing.image.clone(),
        };

        let changes = PostChanges {
            title: input.title,
            slug,
            image,
            body: input.body,
            status: input.status,
            is_approved: true,
        };

        let post = self
            .posts
            .update(id, &changes)
            .await
            .context("Failed to update post")?;

        self.posts
            .sync_categories(id, &input.category_ids)
            .await
            .context("Failed to sync categories")?;
        self.posts
            .sync_tags(id, &input.tag_ids)
            .await
            .context("Failed to sync tags")?;

        Ok(post)
    }

    /// Posts awaiting approval.
    pub async fn pending(&self) -> Result<Vec<Post>, PostServiceError> {
        Ok(self
            .posts
            .list_pending()
            .await
            .context("Failed to list pending posts")?)
    }

    /// Approve a pending post.
    ///
    /// Idempotent: an already-approved post is left untouched and reported
    /// as such. Otherwise the flag flips once, the owning author gets an
    /// approval notice, and every subscriber is re-notified.
    pub async fn approve(&self, id: i64) -> Result<ApprovalOutcome, PostServiceError> {
        let post = self
            .posts
            .get_by_id(id)
            .await
            .context("Failed to fetch post")?
            .ok_or(PostServiceError::NotFound(id))?;

        if post.is_approved {
            return Ok(ApprovalOutcome::AlreadyApproved);
        }

        self.posts
            .set_approved(id)
            .await
            .context("Failed to approve post")?;
        let post = Post {
            is_approved: true,
            ..post
        };

        match self
            .users
            .get_by_id(post.author_id)
            .await
            .context("Failed to fetch post author")?
        {
            Some(author) => {
                if let Err(e) = self.notifier.post_approved(&author.email, &post).await {
                    tracing::warn!(
                        post_id = post.id,
                        recipient = %author.email,
                        error = %e,
                        "failed to notify author of approval"
                    );
                }
            }
            None => {
                tracing::warn!(post_id = post.id, author_id = post.author_id, "post author missing");
            }
        }

        let notified = self.notify_subscribers(&post).await?;
        tracing::info!(post_id = post.id, notified, "post approved");

        Ok(ApprovalOutcome::Approved)
    }

    /// Delete a post.
    ///
    /// Association rows and the post row go in one transaction; the stored
    /// cover file is removed afterwards, with failure logged rather than
    /// propagated so the row delete is never left half-applied.
    pub async fn delete(&self, id: i64) -> Result<(), PostServiceError> {
        let post = self
            .posts
            .get_by_id(id)
            .await
            .context("Failed to fetch post")?
            .ok_or(PostServiceError::NotFound(id))?;

        self.posts
            .delete_with_associations(id)
            .await
            .context("Failed to delete post")?;

        if let Err(e) = self.images.remove(&post.image).await {
            tracing::warn!(post_id = id, image = %post.image, error = %e, "failed to delete cover image");
        }

        Ok(())
    }

    /// Reject category/tag ids that don't resolve, so a stale form
    /// submission fails as a validation error instead of a foreign key
    /// violation deep in the association writes.
    async fn check_associations(
        &self,
        category_ids: &[i64],
        tag_ids: &[i64],
    ) -> Result<(), PostServiceError> {
        let mut errors = Vec::new();

        for id in category_ids {
            if self
                .categories
                .get_by_id(*id)
                .await
                .context("Failed to check category")?
                .is_none()
            {
                errors.push(format!("unknown category: {}", id));
            }
        }
        for id in tag_ids {
            if self
                .tags
                .get_by_id(*id)
                .await
                .context("Failed to check tag")?
                .is_none()
            {
                errors.push(format!("unknown tag: {}", id));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(PostServiceError::ValidationError(errors))
        }
    }

    /// Send the "new post" notice to every subscriber, returning how many
    /// deliveries succeeded. Individual failures are logged and skipped.
    async fn notify_subscribers(&self, post: &Post) -> Result<usize, PostServiceError> {
        let subscribers = self
            .subscribers
            .list()
            .await
            .context("Failed to list subscribers")?;

        let mut delivered = 0;
        for subscriber in &subscribers {
            match self.notifier.post_published(&subscriber.email, post).await {
                Ok(()) => delivered += 1,
                Err(e) => {
                    tracing::warn!(
                        post_id = post.id,
                        recipient = %subscriber.email,
                        error = %e,
                        "failed to notify subscriber"
                    );
                }
            }
        }

        Ok(delivered)
    }
}

/// Validate the shared form fields, collecting one message per failure.
fn validate_fields(
    title: &str,
    body: &str,
    category_ids: &[i64],
    tag_ids: &[i64],
    image: Option<&ImageUpload>,
) -> Result<(), PostServiceError> {
    let mut errors = Vec::new();

    if title.trim().is_empty() {
        errors.push("title is required".to_string());
    }
    if body.trim().is_empty() {
        errors.push("body is required".to_string());
    }
    if category_ids.is_empty() {
        errors.push("at least one category is required".to_string());
    }
    if tag_ids.is_empty() {
        errors.push("at least one tag is required".to_string());
    }
    if let Some(upload) = image {
        if !upload.is_image() {
            errors.push("image must be an image file".to_string());
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(PostServiceError::ValidationError(errors))
    }
}

/// Generate a URL-friendly slug from a title.
///
/// Lowercases, maps spaces and ASCII punctuation to hyphens, collapses
/// runs of hyphens, and keeps non-ASCII characters as-is.
pub fn generate_slug(title: &str) -> String {
    let slug: String = title
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || !c.is_ascii() {
                c
            } else {
                '-'
            }
        })
        .collect();

    let mut result = String::new();
    let mut prev_hyphen = false;

    for c in slug.chars() {
        if c == '-' {
            if !prev_hyphen && !result.is_empty() {
                result.push(c);
                prev_hyphen = true;
            }
        } else {
            result.push(c);
            prev_hyphen = false;
        }
    }

    result.trim_end_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{
        SqlxCategoryRepository, SqlxPostRepository, SqlxSubscriberRepository, SqlxTagRepository,
        SqlxUserRepository,
    };
    use crate::db::{create_test_pool, migrations};
    use crate::models::{Subscriber, User, UserRole};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::io::Cursor;
    use std::sync::Mutex;

    /// Records every delivery; optionally fails for one recipient.
    #[derive(Default)]
    struct RecordingNotifier {
        pub published: Mutex<Vec<String>>,
        pub approved: Mutex<Vec<String>>,
        pub failing_recipient: Option<String>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn post_published(&self, recipient: &str, _post: &Post) -> anyhow::Result<()> {
            if self.failing_recipient.as_deref() == Some(recipient) {
                anyhow::bail!("smtp refused recipient");
            }
            self.published.lock().unwrap().push(recipient.to_string());
            Ok(())
        }

        async fn post_approved(&self, recipient: &str, _post: &Post) -> anyhow::Result<()> {
            self.approved.lock().unwrap().push(recipient.to_string());
            Ok(())
        }
    }

    struct Fixture {
        service: PostService,
        notifier: Arc<RecordingNotifier>,
        images: Arc<ImageStore>,
        subscribers: Arc<SqlxSubscriberRepository>,
        author_id: i64,
        category_ids: Vec<i64>,
        tag_ids: Vec<i64>,
        _dir: tempfile::TempDir,
    }

    async fn setup() -> Fixture {
        setup_with_notifier(RecordingNotifier::default()).await
    }

    async fn setup_with_notifier(notifier: RecordingNotifier) -> Fixture {
        let pool = create_test_pool().await.expect("pool");
        migrations::run_migrations(&pool).await.expect("migrations");

        let users = Arc::new(SqlxUserRepository::new(pool.clone()));
        let author = users
            .create(&User {
                id: 0,
                username: "writer".to_string(),
                email: "writer@example.com".to_string(),
                password_hash: "hash".to_string(),
                role: UserRole::Editor,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
            .await
            .expect("author");

        let categories = Arc::new(SqlxCategoryRepository::new(pool.clone()));
        let tags = Arc::new(SqlxTagRepository::new(pool.clone()));
        let category_ids = vec![
            categories
                .create(&Category::new("news".to_string(), "News".to_string()))
                .await
                .expect("category")
                .id,
            categories
                .create(&Category::new("tech".to_string(), "Tech".to_string()))
                .await
                .expect("category")
                .id,
        ];
        let tag_ids = vec![
            tags.create(&Tag::new("rust".to_string(), "Rust".to_string()))
                .await
                .expect("tag")
                .id,
        ];

        let subscribers = Arc::new(SqlxSubscriberRepository::new(pool.clone()));
        let dir = tempfile::tempdir().expect("tempdir");
        let images = Arc::new(ImageStore::new(dir.path().join("post")));
        let notifier = Arc::new(notifier);

        let service = PostService::new(
            SqlxPostRepository::boxed(pool.clone()),
            categories,
            tags,
            subscribers.clone(),
            users,
            images.clone(),
            notifier.clone(),
        );

        Fixture {
            service,
            notifier,
            images,
            subscribers,
            author_id: author.id,
            category_ids,
            tag_ids,
            _dir: dir,
        }
    }

    fn sample_upload() -> ImageUpload {
        let img = image::DynamicImage::ImageRgb8(image::RgbImage::new(24, 24));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png).expect("encode");
        ImageUpload {
            filename: "cover.png".to_string(),
            content_type: "image/png".to_string(),
            data: buf.into_inner(),
        }
    }

    fn create_input(fixture: &Fixture, title: &str, image: Option<ImageUpload>) -> CreatePostInput {
        CreatePostInput {
            title: title.to_string(),
            body: "Some body text".to_string(),
            category_ids: fixture.category_ids.clone(),
            tag_ids: fixture.tag_ids.clone(),
            status: true,
            image,
        }
    }

    async fn add_subscribers(fixture: &Fixture, emails: &[&str]) {
        for email in emails {
            fixture
                .subscribers
                .create(&Subscriber::new(email.to_string()))
                .await
                .expect("subscriber");
        }
    }

    // ========================================================================
    // Slug generation
    // ========================================================================

    #[test]
    fn test_generate_slug_simple() {
        assert_eq!(generate_slug("Hello World"), "hello-world");
    }

    #[test]
    fn test_generate_slug_with_special_chars() {
        assert_eq!(generate_slug("Hello, World!"), "hello-world");
    }

    #[test]
    fn test_generate_slug_with_multiple_spaces() {
        assert_eq!(generate_slug("Hello   World"), "hello-world");
    }

    #[test]
    fn test_generate_slug_keeps_non_ascii() {
        assert_eq!(generate_slug("Café Culture"), "café-culture");
    }

    // ========================================================================
    // Create
    // ========================================================================

    #[tokio::test]
    async fn test_create_without_image_uses_sentinel() {
        let fixture = setup().await;
        add_subscribers(&fixture, &["a@example.com", "b@example.com"]).await;

        let input = create_input(&fixture, "Hello World", None);
        let post = fixture.service.create(fixture.author_id, input).await.expect("create");

        assert_eq!(post.slug, "hello-world");
        assert_eq!(post.image, DEFAULT_IMAGE);
        assert!(post.is_approved);
        assert_eq!(
            fixture.notifier.published.lock().unwrap().as_slice(),
            ["a@example.com", "b@example.com"]
        );
    }

    #[tokio::test]
    async fn test_create_with_image_stores_unique_filename() {
        let fixture = setup().await;

        let input = create_input(&fixture, "Cover Story", Some(sample_upload()));
        let post = fixture.service.create(fixture.author_id, input).await.expect("create");

        assert!(post.image.starts_with("cover-story-"));
        assert!(post.image.ends_with(".png"));
        assert!(fixture.images.path_of(&post.image).exists());
    }

    #[tokio::test]
    async fn test_create_attaches_categories_and_tags() {
        let fixture = setup().await;

        let input = create_input(&fixture, "Tagged", None);
        let post = fixture.service.create(fixture.author_id, input).await.expect("create");

        let detail = fixture.service.get(post.id).await.expect("detail");
        let mut cat_ids: Vec<i64> = detail.categories.iter().map(|c| c.id).collect();
        cat_ids.sort_unstable();
        let mut expected = fixture.category_ids.clone();
        expected.sort_unstable();
        assert_eq!(cat_ids, expected);
        assert_eq!(detail.tags.len(), 1);
    }

    #[tokio::test]
    async fn test_create_validation_collects_all_failures() {
        let fixture = setup().await;

        let input = CreatePostInput::default();
        let err = fixture
            .service
            .create(fixture.author_id, input)
            .await
            .expect_err("should fail");

        match err {
            PostServiceError::ValidationError(errors) => {
                assert_eq!(errors.len(), 4);
                assert!(errors[0].contains("title"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_category_and_tag_ids() {
        let fixture = setup().await;

        let mut input = create_input(&fixture, "Stale Form", None);
        input.category_ids.push(9999);
        input.tag_ids.push(8888);

        let err = fixture
            .service
            .create(fixture.author_id, input)
            .await
            .expect_err("should fail");

        match err {
            PostServiceError::ValidationError(errors) => {
                assert!(errors.iter().any(|e| e.contains("unknown category: 9999")));
                assert!(errors.iter().any(|e| e.contains("unknown tag: 8888")));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
        assert!(fixture.service.list().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_non_image_upload() {
        let fixture = setup().await;

        let mut input = create_input(&fixture, "Bad Upload", None);
        input.image = Some(ImageUpload {
            filename: "doc.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            data: vec![1, 2, 3],
        });

        assert!(matches!(
            fixture.service.create(fixture.author_id, input).await,
            Err(PostServiceError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_one_failing_subscriber_does_not_abort_fanout() {
        let fixture = setup_with_notifier(RecordingNotifier {
            failing_recipient: Some("broken@example.com".to_string()),
            ..Default::default()
        })
        .await;
        add_subscribers(
            &fixture,
            &["first@example.com", "broken@example.com", "last@example.com"],
        )
        .await;

        let input = create_input(&fixture, "Resilient", None);
        fixture.service.create(fixture.author_id, input).await.expect("create succeeds");

        assert_eq!(
            fixture.notifier.published.lock().unwrap().as_slice(),
            ["first@example.com", "last@example.com"]
        );
    }

    // ========================================================================
    // Update
    // ========================================================================

    fn update_input(fixture: &Fixture, title: &str, image: Option<ImageUpload>) -> UpdatePostInput {
        UpdatePostInput {
            title: title.to_string(),
            body: "Updated body".to_string(),
            category_ids: vec![fixture.category_ids[0]],
            tag_ids: fixture.tag_ids.clone(),
            status: false,
            image,
        }
    }

    #[tokio::test]
    async fn test_update_recomputes_slug_and_syncs_associations() {
        let fixture = setup().await;
        let post = fixture
            .service
            .create(fixture.author_id, create_input(&fixture, "Old Title", None))
            .await
            .expect("create");

        let updated = fixture
            .service
            .update(post.id, update_input(&fixture, "New Title", None))
            .await
            .expect("update");

        assert_eq!(updated.slug, "new-title");
        assert!(!updated.status);

        let detail = fixture.service.get(post.id).await.expect("detail");
        let cat_ids: Vec<i64> = detail.categories.iter().map(|c| c.id).collect();
        assert_eq!(cat_ids, vec![fixture.category_ids[0]]);
    }

    #[tokio::test]
    async fn test_update_replaces_stored_image() {
        let fixture = setup().await;
        let post = fixture
            .service
            .create(
                fixture.author_id,
                create_input(&fixture, "Pictured", Some(sample_upload())),
            )
            .await
            .expect("create");
        let old_image = post.image.clone();
        assert!(fixture.images.path_of(&old_image).exists());

        let updated = fixture
            .service
            .update(post.id, update_input(&fixture, "Pictured", Some(sample_upload())))
            .await
            .expect("update");

        assert_ne!(updated.image, old_image);
        assert!(!fixture.images.path_of(&old_image).exists());
        assert!(fixture.images.path_of(&updated.image).exists());
    }

    #[tokio::test]
    async fn test_update_keeps_image_when_none_uploaded() {
        let fixture = setup().await;
        let post = fixture
            .service
            .create(
                fixture.author_id,
                create_input(&fixture, "Pictured", Some(sample_upload())),
            )
            .await
            .expect("create");

        let updated = fixture
            .service
            .update(post.id, update_input(&fixture, "Pictured Again", None))
            .await
            .expect("update");

        assert_eq!(updated.image, post.image);
        assert!(fixture.images.path_of(&post.image).exists());
    }

    #[tokio::test]
    async fn test_update_sends_no_notifications() {
        let fixture = setup().await;
        add_subscribers(&fixture, &["a@example.com"]).await;
        let post = fixture
            .service
            .create(fixture.author_id, create_input(&fixture, "Quiet", None))
            .await
            .expect("create");
        fixture.notifier.published.lock().unwrap().clear();

        fixture
            .service
            .update(post.id, update_input(&fixture, "Quieter", None))
            .await
            .expect("update");

        assert!(fixture.notifier.published.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_rejects_unknown_category_ids() {
        let fixture = setup().await;
        let post = fixture
            .service
            .create(fixture.author_id, create_input(&fixture, "Valid", None))
            .await
            .expect("create");

        let mut input = update_input(&fixture, "Valid", None);
        input.category_ids = vec![9999];

        assert!(matches!(
            fixture.service.update(post.id, input).await,
            Err(PostServiceError::ValidationError(_))
        ));

        // Associations are untouched by the rejected update
        let detail = fixture.service.get(post.id).await.expect("detail");
        assert_eq!(detail.categories.len(), fixture.category_ids.len());
    }

    #[tokio::test]
    async fn test_update_missing_post_is_not_found() {
        let fixture = setup().await;
        assert!(matches!(
            fixture
                .service
                .update(404, update_input(&fixture, "Ghost", None))
                .await,
            Err(PostServiceError::NotFound(404))
        ));
    }

    // ========================================================================
    // Approval
    // ========================================================================

    async fn create_pending(fixture: &Fixture, title: &str) -> Post {
        // Posts are auto-approved on create; push one back to pending the
        // way the moderation queue would see it.
        let post = fixture
            .service
            .create(fixture.author_id, create_input(fixture, title, None))
            .await
            .expect("create");
        fixture
            .service
            .posts
            .update(
                post.id,
                &PostChanges {
                    title: post.title.clone(),
                    slug: post.slug.clone(),
                    image: post.image.clone(),
                    body: post.body.clone(),
                    status: post.status,
                    is_approved: false,
                },
            )
            .await
            .expect("mark pending")
    }

    #[tokio::test]
    async fn test_approve_pending_notifies_author_and_subscribers() {
        let fixture = setup().await;
        add_subscribers(&fixture, &["a@example.com", "b@example.com"]).await;
        let post = create_pending(&fixture, "Awaiting").await;
        fixture.notifier.published.lock().unwrap().clear();

        let outcome = fixture.service.approve(post.id).await.expect("approve");

        assert_eq!(outcome, ApprovalOutcome::Approved);
        assert_eq!(
            fixture.notifier.approved.lock().unwrap().as_slice(),
            ["writer@example.com"]
        );
        assert_eq!(fixture.notifier.published.lock().unwrap().len(), 2);
        assert!(fixture.service.pending().await.expect("pending").is_empty());
    }

    #[tokio::test]
    async fn test_approve_already_approved_is_idempotent() {
        let fixture = setup().await;
        add_subscribers(&fixture, &["a@example.com"]).await;
        let post = fixture
            .service
            .create(fixture.author_id, create_input(&fixture, "Done", None))
            .await
            .expect("create");
        fixture.notifier.published.lock().unwrap().clear();

        let outcome = fixture.service.approve(post.id).await.expect("approve");

        assert_eq!(outcome, ApprovalOutcome::AlreadyApproved);
        assert!(fixture.notifier.published.lock().unwrap().is_empty());
        assert!(fixture.notifier.approved.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_approve_missing_post_is_not_found() {
        let fixture = setup().await;
        assert!(matches!(
            fixture.service.approve(404).await,
            Err(PostServiceError::NotFound(404))
        ));
    }

    // ========================================================================
    // Delete
    // ========================================================================

    #[tokio::test]
    async fn test_delete_removes_file_associations_and_row() {
        let fixture = setup().await;
        let post = fixture
            .service
            .create(
                fixture.author_id,
                create_input(&fixture, "Doomed", Some(sample_upload())),
            )
            .await
            .expect("create");
        let image = post.image.clone();

        fixture.service.delete(post.id).await.expect("delete");

        assert!(!fixture.images.path_of(&image).exists());
        assert!(matches!(
            fixture.service.get(post.id).await,
            Err(PostServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_with_sentinel_image_succeeds() {
        let fixture = setup().await;
        let post = fixture
            .service
            .create(fixture.author_id, create_input(&fixture, "Plain", None))
            .await
            .expect("create");

        fixture.service.delete(post.id).await.expect("delete");
    }

    #[tokio::test]
    async fn test_delete_missing_post_is_not_found() {
        let fixture = setup().await;
        assert!(matches!(
            fixture.service.delete(404).await,
            Err(PostServiceError::NotFound(404))
        ));
    }

    // ========================================================================
    // End-to-end scenario
    // ========================================================================

    #[tokio::test]
    async fn test_end_to_end_create_scenario() {
        let fixture = setup().await;
        add_subscribers(&fixture, &["a@example.com", "b@example.com", "c@example.com"]).await;

        let post = fixture
            .service
            .create(fixture.author_id, create_input(&fixture, "Hello World", None))
            .await
            .expect("create");

        assert_eq!(post.slug, "hello-world");
        assert_eq!(post.image, "default.png");
        assert!(post.is_approved);
        assert_eq!(fixture.notifier.published.lock().unwrap().len(), 3);
    }
}
