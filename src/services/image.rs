//! Cover image storage
//!
//! Stores uploaded post cover images on disk under a generated unique
//! filename, resized to fit within a fixed bounding box. The sentinel
//! `default.png` is never written or deleted; it stands in for posts
//! without an upload.

use crate::models::{ImageUpload, DEFAULT_IMAGE};
use anyhow::{Context, Result};
use chrono::Utc;
use image::{imageops::FilterType, ImageFormat};
use std::io::Cursor;
use std::path::PathBuf;
use tokio::fs;
use uuid::Uuid;

/// Bounding box covers are scaled to fit within.
const MAX_WIDTH: u32 = 1600;
const MAX_HEIGHT: u32 = 1066;

/// On-disk store for post cover images.
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    /// Create a store rooted at the given directory. The directory is
    /// created lazily on the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Full path of a stored filename.
    pub fn path_of(&self, filename: &str) -> PathBuf {
        self.root.join(filename)
    }

    /// Resize and persist an uploaded cover image, returning the generated
    /// filename (`{slug}-{date}-{token}.{ext}`).
    pub async fn store(&self, slug: &str, upload: ImageUpload) -> Result<String> {
        // Check-then-create is racy between concurrent submitters, but the
        // worst case is a duplicate no-op mkdir.
        if !self.root.exists() {
            fs::create_dir_all(&self.root)
                .await
                .with_context(|| format!("Failed to create image directory: {:?}", self.root))?;
        }

        let extension = upload.extension();
        let filename = unique_filename(slug, &extension);

        let encoded = tokio::task::spawn_blocking(move || resize_to_fit(&upload))
            .await
            .context("Image resize task panicked")??;

        let path = self.path_of(&filename);
        fs::write(&path, &encoded)
            .await
            .with_context(|| format!("Failed to write image: {:?}", path))?;

        Ok(filename)
    }

    /// Delete a stored image file.
    ///
    /// The sentinel filename and files already missing from disk are
    /// silently skipped, so deleting a post that never had an upload is
    /// safe.
    pub async fn remove(&self, filename: &str) -> Result<()> {
        if filename == DEFAULT_IMAGE || filename.is_empty() {
            return Ok(());
        }

        let path = self.path_of(filename);
        if path.exists() {
            fs::remove_file(&path)
                .await
                .with_context(|| format!("Failed to delete image: {:?}", path))?;
        }
        Ok(())
    }
}

/// Build a per-submission unique filename from the slug, today's date, and
/// a random token, preserving the original extension.
fn unique_filename(slug: &str, extension: &str) -> String {
    format!(
        "{}-{}-{}.{}",
        slug,
        Utc::now().format("%Y-%m-%d"),
        Uuid::new_v4().simple(),
        extension
    )
}

/// Decode, scale to fit within the bounding box preserving aspect ratio,
/// and re-encode in the upload's original format.
fn resize_to_fit(upload: &ImageUpload) -> Result<Vec<u8>> {
    let img = image::load_from_memory(&upload.data).context("Failed to decode image")?;
    let resized = img.resize(MAX_WIDTH, MAX_HEIGHT, FilterType::Lanczos3);

    let format =
        ImageFormat::from_extension(upload.extension()).unwrap_or(ImageFormat::Png);
    let mut buf = Cursor::new(Vec::new());
    resized
        .write_to(&mut buf, format)
        .context("Failed to encode image")?;
    Ok(buf.into_inner())
}
