//! Outbound email notifications
//!
//! The publishing workflow fans a "new post" notice out to every subscriber
//! and sends an approval notice to a post's author. The `Notifier` trait is
//! the seam the workflow talks through; production uses SMTP via lettre,
//! tests substitute a recorder.

use crate::config::SmtpConfig;
use crate::models::Post;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use lettre::{
    message::header::ContentType,
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

/// Sends workflow notifications to a single recipient.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// A new post was published (sent to each subscriber).
    async fn post_published(&self, recipient: &str, post: &Post) -> Result<()>;

    /// The recipient's own post was approved (sent to the author).
    async fn post_approved(&self, recipient: &str, post: &Post) -> Result<()>;
}

/// SMTP-backed notifier.
pub struct SmtpNotifier {
    config: SmtpConfig,
}

impl SmtpNotifier {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
        if !self.config.is_configured() {
            return Err(anyhow!(
                "SMTP not configured; set smtp.host and smtp.from in config.yml"
            ));
        }

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.host)
            .map_err(|e| anyhow!("Failed to create SMTP transport: {}", e))?
            .port(self.config.port);

        if !self.config.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                self.config.username.clone(),
                self.config.password.clone(),
            ));
        }

        Ok(builder.build())
    }

    async fn send(&self, to: &str, subject: String, body: String) -> Result<()> {
        let from = format!("{} <{}>", self.config.from_name, self.config.from);

        let email = Message::builder()
            .from(from.parse().map_err(|e| anyhow!("Invalid from address: {}", e))?)
            .to(to.parse().map_err(|e| anyhow!("Invalid to address: {}", e))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| anyhow!("Failed to build email: {}", e))?;

        self.transport()?
            .send(email)
            .await
            .map_err(|e| anyhow!("Failed to send email: {}", e))?;

        Ok(())
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn post_published(&self, recipient: &str, post: &Post) -> Result<()> {
        let subject = format!("[{}] New post: {}", self.config.from_name, post.title);
        let body = format!(
            "A new post has just been published.\n\n{}\n\nRead it at /posts/{}\n",
            post.title, post.slug
        );
        self.send(recipient, subject, body).await
    }

    async fn post_approved(&self, recipient: &str, post: &Post) -> Result<()> {
        let subject = format!(
            "[{}] Your post was approved: {}",
            self.config.from_name, post.title
        );
        let body = format!(
            "Good news! Your post \"{}\" has been approved and is now visible to readers.\n",
            post.title
        );
        self.send(recipient, subject, body).await
    }
}
