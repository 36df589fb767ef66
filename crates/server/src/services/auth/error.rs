//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::validation::ValidationErrors;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Wrong password or unknown username. Deliberately indistinguishable.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Setup was attempted after an admin already exists.
    #[error("an admin account already exists")]
    AlreadyInitialized,

    /// Username or new password rejected.
    #[error("{0}")]
    Validation(ValidationErrors),

    /// Session store read or write failed.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error: {0}")]
    PasswordHash(String),

    /// The blocking hashing task did not complete.
    #[error("hashing task failed: {0}")]
    Task(String),
}
