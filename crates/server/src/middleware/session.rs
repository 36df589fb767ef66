//! Session middleware configuration.
//!
//! Sets up `PostgreSQL`-backed sessions using tower-sessions. The cookie
//! only carries an opaque session id; the login grant lives server-side.

use sqlx::PgPool;
use tower_sessions::cookie::SameSite;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::{SameSitePolicy, SessionCookieConfig};
use crate::services::auth::SESSION_TTL_DAYS;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "folio_session";

/// The session store over `public.sessions`, which the migrations create.
///
/// # Panics
///
/// Panics if the schema name or table name is invalid (should never happen
/// with hardcoded "public" and "sessions" values).
#[must_use]
pub fn session_store(pool: &PgPool) -> PostgresStore {
    PostgresStore::new(pool.clone())
        .with_schema_name("public")
        .expect("valid schema name")
        .with_table_name("sessions")
        .expect("valid table name")
}

/// Create the session layer with `PostgreSQL` store.
///
/// Login overrides the expiry with an absolute timestamp, so the default
/// below only applies to sessions that never authenticated.
#[must_use]
pub fn create_session_layer(
    pool: &PgPool,
    cookie: &SessionCookieConfig,
) -> SessionManagerLayer<PostgresStore> {
    SessionManagerLayer::new(session_store(pool))
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::days(SESSION_TTL_DAYS),
        ))
        .with_secure(cookie.secure)
        .with_same_site(same_site(cookie.same_site))
        .with_http_only(true)
        .with_path("/")
}

const fn same_site(policy: SameSitePolicy) -> SameSite {
    match policy {
        SameSitePolicy::Strict => SameSite::Strict,
        SameSitePolicy::Lax => SameSite::Lax,
        SameSitePolicy::None => SameSite::None,
    }
}
