//! Authentication service.
//!
//! Username + password login for the admin, backed by Argon2id hashes and a
//! server-side session. The session record holds a [`SessionGrant`]; the
//! cookie only carries the opaque session id.
//!
//! Hashing and verification are CPU-heavy and run on the blocking pool.

mod error;

pub use error::AuthError;

use std::sync::LazyLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tower_sessions::Session;
use tower_sessions::Expiry;

use folio_core::{AdminUserId, Username};

use crate::db::{AdminUserRepository, RepositoryError};
use crate::models::session::keys;
use crate::models::{AdminUser, CurrentAdmin, SessionGrant};
use crate::validation::ValidationErrors;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Upper bound on accepted password length, so nobody can make us hash megabytes.
const MAX_PASSWORD_LENGTH: usize = 1024;

/// Fixed session lifetime, counted from login.
pub const SESSION_TTL_DAYS: i64 = 7;

/// Hash verified when the username does not exist, so both failure paths
/// cost the same.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("folio-timing-equalizer").ok());

/// Authentication service.
pub struct AuthService<'a> {
    users: AdminUserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: AdminUserRepository::new(pool),
        }
    }

    /// Check a username/password pair.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for an unknown username or a
    /// wrong password alike.
    pub async fn login(&self, username: &str, password: &str) -> Result<AdminUser, AuthError> {
        if password.len() > MAX_PASSWORD_LENGTH {
            return Err(AuthError::InvalidCredentials);
        }

        let user = match Username::parse(username) {
            Ok(username) => self.users.get_by_username(username.as_str()).await?,
            Err(_) => None,
        };

        let Some(user) = user else {
            let _ = verify_password_blocking(password, DUMMY_HASH.clone()).await;
            tracing::info!("Login failed: unknown username");
            return Err(AuthError::InvalidCredentials);
        };

        verify_password_blocking(password, Some(user.password_hash.clone())).await?;
        Ok(user)
    }

    /// Create the first admin account. Only allowed while none exists.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AlreadyInitialized` once an admin exists and
    /// `AuthError::Validation` for a bad username or weak password.
    pub async fn setup(&self, username: &str, password: &str) -> Result<AdminUser, AuthError> {
        // Skips hashing for the common case; `create_first` still decides races.
        if self.is_initialized().await? {
            return Err(AuthError::AlreadyInitialized);
        }

        let username = validate_credentials(username, password)?;
        let hash = hash_password_blocking(password).await?;

        let user = self
            .users
            .create_first(&username, &hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::AlreadyInitialized,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(admin_id = %user.id, "Initial admin account created");
        Ok(user)
    }

    /// Whether any admin account exists.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the query fails.
    pub async fn is_initialized(&self) -> Result<bool, AuthError> {
        Ok(self.users.count().await? > 0)
    }

    /// Create an additional admin account (CLI).
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` for bad input and
    /// `AuthError::Repository` (`Conflict`) if the username is taken.
    pub async fn create_admin(&self, username: &str, password: &str) -> Result<AdminUser, AuthError> {
        let username = validate_credentials(username, password)?;
        let hash = hash_password_blocking(password).await?;
        let user = self.users.create(&username, &hash).await?;
        tracing::info!(admin_id = %user.id, "Admin account created");
        Ok(user)
    }

    /// Rotate a password after checking the current one.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if `current` is wrong and
    /// `AuthError::Validation` if `new` is too weak.
    pub async fn change_password(
        &self,
        admin_id: AdminUserId,
        current: &str,
        new: &str,
    ) -> Result<(), AuthError> {
        let user = self
            .users
            .get_by_id(admin_id)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password_blocking(current, Some(user.password_hash.clone())).await?;
        validate_new_password(new).map_err(AuthError::Validation)?;

        let hash = hash_password_blocking(new).await?;
        self.users.update_password(admin_id, &hash).await?;
        tracing::info!(admin_id = %admin_id, "Admin password changed");
        Ok(())
    }

    /// Overwrite the password of `username` without checking the old one (CLI).
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` (`NotFound`) for an unknown username.
    pub async fn reset_password(&self, username: &str, new: &str) -> Result<(), AuthError> {
        validate_new_password(new).map_err(AuthError::Validation)?;

        let user = self
            .users
            .get_by_username(username)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        let hash = hash_password_blocking(new).await?;
        self.users.update_password(user.id, &hash).await?;
        tracing::info!(admin_id = %user.id, "Admin password reset");
        Ok(())
    }
}

// =============================================================================
// Sessions
// =============================================================================

/// Bind `user` to the session.
///
/// The session id is cycled first so an id planted before login is useless
/// afterwards.
///
/// # Errors
///
/// Returns `AuthError::Session` if the store cannot be written.
pub async fn start_session(session: &Session, user: &AdminUser) -> Result<SessionGrant, AuthError> {
    session.cycle_id().await?;

    let expires_at = Utc::now() + chrono::Duration::days(SESSION_TTL_DAYS);
    let grant = SessionGrant {
        admin: CurrentAdmin::from(user),
        expires_at,
    };

    session.insert(keys::CURRENT_ADMIN, &grant).await?;
    session.set_expiry(Some(Expiry::AtDateTime(to_offset_datetime(expires_at))));

    Ok(grant)
}

/// Resolve the admin bound to `session`, if any.
///
/// Returns `None` when there is no grant, the grant has expired, or its admin
/// no longer exists. Stale sessions are flushed on the way out.
///
/// # Errors
///
/// Store and database failures are errors, never silently `None`.
pub async fn resolve_session(
    session: &Session,
    pool: &PgPool,
) -> Result<Option<AdminUser>, AuthError> {
    let Some(grant) = session.get::<SessionGrant>(keys::CURRENT_ADMIN).await? else {
        return Ok(None);
    };

    if !grant.is_valid_at(Utc::now()) {
        tracing::debug!(admin_id = %grant.admin.id, "Session grant expired");
        session.flush().await?;
        return Ok(None);
    }

    let user = AdminUserRepository::new(pool).get_by_id(grant.admin.id).await?;
    if user.is_none() {
        tracing::info!(admin_id = %grant.admin.id, "Session refers to a deleted admin");
        session.flush().await?;
    }

    Ok(user)
}

/// Destroy the session record and clear the cookie. Safe to call twice.
///
/// # Errors
///
/// Returns `AuthError::Session` if the store cannot be written.
pub async fn end_session(session: &Session) -> Result<(), AuthError> {
    session.flush().await?;
    Ok(())
}

fn to_offset_datetime(at: DateTime<Utc>) -> time::OffsetDateTime {
    time::OffsetDateTime::from_unix_timestamp(at.timestamp())
        .unwrap_or_else(|_| time::OffsetDateTime::now_utc() + time::Duration::days(SESSION_TTL_DAYS))
}

// =============================================================================
// Helper Functions
// =============================================================================

fn validate_credentials(username: &str, password: &str) -> Result<Username, AuthError> {
    let mut errors = ValidationErrors::default();
    let username = errors.check("username", Username::parse(username.trim()));
    if let Err(password_errors) = validate_new_password(password) {
        for e in password_errors.as_slice() {
            errors.add(&e.field, e.message.clone());
        }
    }
    errors.finish(|| username).map_err(AuthError::Validation)
}

/// Validate a new password's strength.
fn validate_new_password(password: &str) -> Result<(), ValidationErrors> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationErrors::single(
            "password",
            format!("must be at least {MIN_PASSWORD_LENGTH} characters"),
        ));
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ValidationErrors::single(
            "password",
            format!("must be at most {MAX_PASSWORD_LENGTH} bytes"),
        ));
    }
    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::PasswordHash(e.to_string()))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

async fn hash_password_blocking(password: &str) -> Result<String, AuthError> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AuthError::Task(e.to_string()))?
}

async fn verify_password_blocking(password: &str, hash: Option<String>) -> Result<(), AuthError> {
    let Some(hash) = hash else {
        return Err(AuthError::InvalidCredentials);
    };
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| AuthError::Task(e.to_string()))?
}
