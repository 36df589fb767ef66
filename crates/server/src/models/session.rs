//! Session-related types for admin authentication.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use folio_core::AdminUserId;

use super::AdminUser;

/// The identity exposed to the client: id and username only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentAdmin {
    /// Admin's database ID.
    pub id: AdminUserId,
    /// Admin's login name.
    pub username: String,
}

impl From<&AdminUser> for CurrentAdmin {
    fn from(user: &AdminUser) -> Self {
        Self {
            id: user.id,
            username: user.username.to_string(),
        }
    }
}

/// What a successful login stores in the session.
///
/// The grant carries its own absolute expiry so the lifetime stays fixed at
/// login time regardless of how the store treats record expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionGrant {
    pub admin: CurrentAdmin,
    pub expires_at: DateTime<Utc>,
}

impl SessionGrant {
    /// Whether the grant is still valid at `now`.
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Session keys for admin authentication data.
pub mod keys {
    /// Key for storing the current login grant.
    pub const CURRENT_ADMIN: &str = "current_admin";
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_grant_expiry_is_exclusive() {
        let now = Utc::now();
        let grant = SessionGrant {
            admin: CurrentAdmin {
                id: AdminUserId::new(1),
                username: "admin".to_string(),
            },
            expires_at: now + Duration::days(7),
        };

        assert!(grant.is_valid_at(now));
        assert!(grant.is_valid_at(now + Duration::days(7) - Duration::seconds(1)));
        assert!(!grant.is_valid_at(now + Duration::days(7)));
    }
}
