//! Admin authentication handlers.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::middleware::{RequireAdminAuth, auth_rate_limiter};
use crate::models::{AdminUser, CurrentAdmin};
use crate::routes::ApiJson;
use crate::services::auth::{AuthService, end_session, start_session};
use crate::state::AppState;

/// Build the auth router.
pub fn router() -> Router<AppState> {
    let limited = Router::new()
        .route("/admin/login", post(login))
        .route("/admin/setup", post(setup))
        .layer(auth_rate_limiter());

    Router::new()
        .merge(limited)
        .route("/admin/logout", post(logout))
        .route("/admin/me", get(me))
        .route("/admin/password", put(change_password))
}

#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: CurrentAdmin,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// POST /admin/login
async fn login(
    State(state): State<AppState>,
    session: Session,
    ApiJson(body): ApiJson<CredentialsRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let user = AuthService::new(state.pool())
        .login(&body.username, &body.password)
        .await?;

    Ok(Json(sign_in(&session, &user).await?))
}

/// POST /admin/setup
async fn setup(
    State(state): State<AppState>,
    session: Session,
    ApiJson(body): ApiJson<CredentialsRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let user = AuthService::new(state.pool())
        .setup(&body.username, &body.password)
        .await?;

    Ok((StatusCode::CREATED, Json(sign_in(&session, &user).await?)))
}

/// POST /admin/logout
async fn logout(session: Session) -> Result<Json<MessageResponse>, AppError> {
    end_session(&session).await?;
    clear_sentry_user();
    Ok(Json(MessageResponse {
        message: "Logged out",
    }))
}

/// GET /admin/me
async fn me(RequireAdminAuth(admin): RequireAdminAuth) -> Json<UserResponse> {
    Json(UserResponse {
        user: CurrentAdmin::from(&admin),
    })
}

/// PUT /admin/password
async fn change_password(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    AuthService::new(state.pool())
        .change_password(admin.id, &body.current_password, &body.new_password)
        .await?;

    Ok(Json(MessageResponse {
        message: "Password changed",
    }))
}

async fn sign_in(session: &Session, user: &AdminUser) -> Result<UserResponse, AppError> {
    let grant = start_session(session, user).await?;
    set_sentry_user(user.id.as_i32(), user.username.as_str());
    tracing::info!(admin_id = %user.id, "Admin logged in");
    Ok(UserResponse { user: grant.admin })
}
