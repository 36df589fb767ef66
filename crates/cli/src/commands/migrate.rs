//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! folio-cli migrate
//! ```
//!
//! Migrations live in `crates/server/migrations/` and are embedded at build
//! time. Already-applied migrations are skipped.

use super::{CliError, connect};

/// Run all pending migrations.
///
/// # Errors
///
/// Returns `CliError` if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CliError> {
    let pool = connect().await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../server/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
