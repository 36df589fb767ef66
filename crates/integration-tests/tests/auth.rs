//! Integration tests for admin authentication.
//!
//! # Requirements
//!
//! - `PostgreSQL` reachable at `DATABASE_URL`
//!
//! # Running
//!
//! ```bash
//! cargo test -p folio-integration-tests --test auth -- --ignored
//! ```

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::json;

use tower_sessions::ExpiredDeletion;

use folio_integration_tests::{TEST_PASSWORD, TestContext};
use folio_server::middleware::session_store;

async fn session_rows(ctx: &TestContext) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM sessions")
        .fetch_one(&ctx.pool)
        .await
        .unwrap()
}

// ============================================================================
// Login / Logout
// ============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_login_me_logout_cycle() {
    let mut ctx = TestContext::new().await;
    ctx.login_as_new_admin("editor").await;
    assert!(ctx.has_cookie());

    let me = ctx.get("/admin/me").await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["user"]["username"], "editor");

    let logout = ctx.post("/admin/logout", json!({})).await;
    assert_eq!(logout.status, StatusCode::OK);

    let me = ctx.get("/admin/me").await;
    assert_eq!(me.status, StatusCode::UNAUTHORIZED);
    assert_eq!(me.body["message"], "Authentication required");
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_logout_twice_succeeds() {
    let mut ctx = TestContext::new().await;
    ctx.login_as_new_admin("editor").await;

    assert_eq!(ctx.post("/admin/logout", json!({})).await.status, StatusCode::OK);
    assert_eq!(ctx.post("/admin/logout", json!({})).await.status, StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_invalid_credentials_create_no_session() {
    let mut ctx = TestContext::new().await;
    ctx.create_admin("editor").await;

    let wrong_password = ctx
        .post(
            "/admin/login",
            json!({"username": "editor", "password": "not-the-password"}),
        )
        .await;
    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert!(!ctx.has_cookie());

    let unknown_user = ctx
        .post(
            "/admin/login",
            json!({"username": "nobody", "password": TEST_PASSWORD}),
        )
        .await;
    assert_eq!(unknown_user.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.body["message"], unknown_user.body["message"]);

    assert_eq!(session_rows(&ctx).await, 0);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_admin_routes_require_session() {
    let mut ctx = TestContext::new().await;

    for path in [
        "/admin/me",
        "/admin/experiences",
        "/admin/education",
        "/admin/case-studies",
    ] {
        let response = ctx.get(path).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{path}");
    }

    let reorder = ctx.patch("/admin/education/reorder", json!({"ids": []})).await;
    assert_eq!(reorder.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_session_of_deleted_admin_is_rejected() {
    let mut ctx = TestContext::new().await;
    ctx.login_as_new_admin("editor").await;

    sqlx::query("DELETE FROM admin_users")
        .execute(&ctx.pool)
        .await
        .unwrap();

    assert_eq!(ctx.get("/admin/me").await.status, StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Session Lifetime
// ============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_expired_login_grant_is_rejected_and_flushed() {
    let mut ctx = TestContext::new().await;
    ctx.login_as_new_admin("editor").await;
    assert_eq!(ctx.get("/admin/me").await.status, StatusCode::OK);
    assert_eq!(session_rows(&ctx).await, 1);

    ctx.expire_login_grant().await;

    let me = ctx.get("/admin/me").await;
    assert_eq!(me.status, StatusCode::UNAUTHORIZED);
    assert_eq!(me.body["message"], "Authentication required");
    assert_eq!(session_rows(&ctx).await, 0);
    assert!(!ctx.has_cookie());
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_expired_session_rows_are_pruned() {
    let mut ctx = TestContext::new().await;
    ctx.login_as_new_admin("editor").await;

    sqlx::query("UPDATE sessions SET expiry_date = NOW() - INTERVAL '1 day'")
        .execute(&ctx.pool)
        .await
        .unwrap();

    session_store(&ctx.pool).delete_expired().await.unwrap();
    assert_eq!(session_rows(&ctx).await, 0);
}

// ============================================================================
// Setup
// ============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_setup_only_once() {
    let mut ctx = TestContext::new().await;

    let first = ctx
        .post(
            "/admin/setup",
            json!({"username": "owner", "password": TEST_PASSWORD}),
        )
        .await;
    assert_eq!(first.status, StatusCode::CREATED);
    assert_eq!(first.body["user"]["username"], "owner");
    assert_eq!(ctx.get("/admin/me").await.status, StatusCode::OK);

    ctx.clear_cookie();
    let second = ctx
        .post(
            "/admin/setup",
            json!({"username": "intruder", "password": TEST_PASSWORD}),
        )
        .await;
    assert_eq!(second.status, StatusCode::CONFLICT);
    assert!(!ctx.has_cookie());

    // Once set up, even invalid input is answered with a conflict
    let weak = ctx
        .post("/admin/setup", json!({"username": "intruder", "password": "short"}))
        .await;
    assert_eq!(weak.status, StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_setup_rejects_short_password() {
    let mut ctx = TestContext::new().await;

    let response = ctx
        .post("/admin/setup", json!({"username": "owner", "password": "short"}))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["errors"][0]["field"], "password");
}

// ============================================================================
// Password Change
// ============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_change_password() {
    let mut ctx = TestContext::new().await;
    ctx.login_as_new_admin("editor").await;

    let wrong = ctx
        .put(
            "/admin/password",
            json!({"currentPassword": "wrong-password", "newPassword": "a-new-password"}),
        )
        .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);

    let changed = ctx
        .put(
            "/admin/password",
            json!({"currentPassword": TEST_PASSWORD, "newPassword": "a-new-password"}),
        )
        .await;
    assert_eq!(changed.status, StatusCode::OK);

    ctx.post("/admin/logout", json!({})).await;
    let old = ctx
        .post(
            "/admin/login",
            json!({"username": "editor", "password": TEST_PASSWORD}),
        )
        .await;
    assert_eq!(old.status, StatusCode::UNAUTHORIZED);

    let new = ctx
        .post(
            "/admin/login",
            json!({"username": "editor", "password": "a-new-password"}),
        )
        .await;
    assert_eq!(new.status, StatusCode::OK);
}
