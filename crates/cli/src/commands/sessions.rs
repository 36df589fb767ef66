//! Session maintenance.

use tower_sessions::ExpiredDeletion;

use folio_server::middleware::session_store;

use super::{CliError, connect};

/// Delete every session past its expiry.
///
/// # Errors
///
/// Returns `CliError` if the database is unreachable.
pub async fn prune() -> Result<(), CliError> {
    let pool = connect().await?;

    session_store(&pool).delete_expired().await?;

    tracing::info!("Expired sessions pruned");
    Ok(())
}
