//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::FolioConfig;
use crate::services::image_upload::{ImageUploadError, ImageUploader};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: FolioConfig,
    pool: PgPool,
    uploader: ImageUploader,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the outbound HTTP client cannot be built.
    pub fn new(config: FolioConfig, pool: PgPool) -> Result<Self, ImageUploadError> {
        let uploader = ImageUploader::new(config.image_upload.clone())?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                uploader,
            }),
        })
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &FolioConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get the image host client.
    #[must_use]
    pub fn uploader(&self) -> &ImageUploader {
        &self.inner.uploader
    }
}
