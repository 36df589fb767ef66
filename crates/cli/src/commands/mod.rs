//! CLI subcommands.

pub mod admin;
pub mod migrate;
pub mod sessions;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

use folio_server::services::auth::AuthError;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection or query error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Session store operation failed.
    #[error("Session store error: {0}")]
    Session(#[from] tower_sessions::session_store::Error),

    /// Account operation rejected.
    #[error("{0}")]
    Auth(#[from] AuthError),
}

/// Connect using `DATABASE_URL`.
async fn connect() -> Result<PgPool, CliError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| CliError::MissingEnvVar("DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    Ok(folio_server::db::create_pool(&SecretString::from(database_url)).await?)
}
