//! Database operations.
//!
//! ## Tables
//!
//! - `admin_users` - Admin accounts (username + Argon2 hash)
//! - `sessions` - Server-side session records (tower-sessions)
//! - `profile` - Singleton site profile (id = 1)
//! - `experiences` - Work history, manually ordered
//! - `education` - Education and certifications, manually ordered
//! - `case_studies` - Case studies with block-document bodies
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p folio-cli -- migrate
//! ```

pub mod admin_users;
pub mod case_studies;
pub mod education;
pub mod experiences;
pub mod ordering;
pub mod profile;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use folio_core::OrderError;

pub use admin_users::AdminUserRepository;
pub use case_studies::CaseStudyRepository;
pub use education::EducationRepository;
pub use experiences::ExperienceRepository;
pub use ordering::OrderedCollection;
pub use profile::ProfileRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique slug).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// A reorder request was not a permutation of the stored ids.
    #[error("invalid order: {0}")]
    InvalidOrder(#[from] OrderError),
}

/// Map a unique violation to `Conflict`, everything else to `Database`.
pub(crate) fn conflict_on_unique(e: sqlx::Error, message: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(message.to_owned());
    }
    RepositoryError::Database(e)
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
