//! Pressroom - a self-hosted blog administration backend

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pressroom::{
    api::{self, AppState},
    config::Config,
    db::{
        self,
        repositories::{
            SqlxCategoryRepository, SqlxPostRepository, SqlxSessionRepository,
            SqlxSubscriberRepository, SqlxTagRepository, SqlxUserRepository,
        },
    },
    services::{
        CategoryService, ImageStore, PostService, SmtpNotifier, SubscriberService, TagService,
        UserService,
    },
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pressroom=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Pressroom...");

    // Load configuration
    let config = Config::load_with_env(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    // Initialize database
    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected: {}", config.database.url);

    // Run migrations
    let applied = db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed ({} applied)", applied);

    if !config.smtp.is_configured() {
        tracing::warn!("SMTP not configured; notification emails will fail until it is");
    }

    // Create repositories
    let post_repo = SqlxPostRepository::boxed(pool.clone());
    let category_repo = SqlxCategoryRepository::boxed(pool.clone());
    let tag_repo = SqlxTagRepository::boxed(pool.clone());
    let subscriber_repo = SqlxSubscriberRepository::boxed(pool.clone());
    let user_repo = SqlxUserRepository::boxed(pool.clone());
    let session_repo = SqlxSessionRepository::boxed(pool.clone());

    // Initialize services
    let images = Arc::new(ImageStore::new(config.upload.path.clone()));
    let notifier = Arc::new(SmtpNotifier::new(config.smtp.clone()));
    let post_service = Arc::new(PostService::new(
        post_repo,
        category_repo.clone(),
        tag_repo.clone(),
        subscriber_repo.clone(),
        user_repo.clone(),
        images.clone(),
        notifier,
    ));
    let user_service = Arc::new(UserService::new(user_repo, session_repo));
    let category_service = Arc::new(CategoryService::new(category_repo));
    let tag_service = Arc::new(TagService::new(tag_repo));
    let subscriber_service = Arc::new(SubscriberService::new(subscriber_repo));

    // Build application state
    let state = AppState {
        post_service,
        user_service,
        category_service,
        tag_service,
        subscriber_service,
    };

    let app = api::build_router(state, &config.upload);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
