//! Authentication extractor for admin routes.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::error::{AUTH_REQUIRED, AppError, set_sentry_user};
use crate::models::AdminUser;
use crate::services::auth::resolve_session;
use crate::state::AppState;

/// Extractor that requires an authenticated admin.
///
/// Resolves the session grant, checks its expiry and re-loads the admin, so a
/// deleted account loses access immediately. Every failure is the same 401.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAdminAuth(admin): RequireAdminAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", admin.username)
/// }
/// ```
pub struct RequireAdminAuth(pub AdminUser);

impl FromRequestParts<AppState> for RequireAdminAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Set by SessionManagerLayer
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or(AppError::Unauthorized(AUTH_REQUIRED))?;

        let admin = resolve_session(&session, state.pool())
            .await?
            .ok_or(AppError::Unauthorized(AUTH_REQUIRED))?;

        set_sentry_user(admin.id.as_i32(), admin.username.as_str());
        Ok(Self(admin))
    }
}
