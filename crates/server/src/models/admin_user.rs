//! Admin user domain types.

use chrono::{DateTime, Utc};

use folio_core::{AdminUserId, Username};

/// An admin account (domain type).
///
/// Implements `Debug` manually so the password hash never reaches a log line.
#[derive(Clone)]
pub struct AdminUser {
    /// Unique admin user ID.
    pub id: AdminUserId,
    /// Login name (case-sensitive).
    pub username: Username,
    /// Argon2 PHC string.
    pub password_hash: String,
    /// When the admin was created.
    pub created_at: DateTime<Utc>,
    /// When the admin was last updated (password rotation).
    pub updated_at: DateTime<Utc>,
}

impl std::fmt::Debug for AdminUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminUser")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password_hash", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}
