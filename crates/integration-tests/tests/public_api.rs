//! Integration tests for the public read API, case studies and editor tools.
//!
//! # Requirements
//!
//! - `PostgreSQL` reachable at `DATABASE_URL`
//!
//! # Running
//!
//! ```bash
//! cargo test -p folio-integration-tests --test public_api -- --ignored
//! ```

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::{Value, json};

use folio_integration_tests::TestContext;

fn document() -> Value {
    json!({
        "time": 1_700_000_000_000_i64,
        "version": "2.28.0",
        "blocks": [
            {"id": "a1", "type": "header", "data": {"text": "Overview", "level": 2}},
            {"id": "a2", "type": "paragraph", "data": {"text": "See [the paper](https://example.com/paper)."}},
            {"id": "a3", "type": "quote", "data": {"text": "Ship it.", "caption": "Enter a caption"}},
        ]
    })
}

async fn create_case_study(ctx: &mut TestContext, title: &str, published: bool) -> Value {
    let response = ctx
        .post(
            "/admin/case-studies",
            json!({
                "title": title,
                "description": "A study",
                "content": document(),
                "tags": ["ml", "ml", "product"],
                "isPublished": published,
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    response.body
}

// ============================================================================
// Profile
// ============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_profile_update_is_public() {
    let mut ctx = TestContext::new().await;
    ctx.login_as_new_admin("editor").await;

    let update = ctx
        .put(
            "/admin/profile",
            json!({"name": "Ada", "toolsOrder": ["Rust", "SQL"]}),
        )
        .await;
    assert_eq!(update.status, StatusCode::OK);

    ctx.clear_cookie();
    let profile = ctx.get("/profile").await;
    assert_eq!(profile.status, StatusCode::OK);
    assert_eq!(profile.body["name"], "Ada");
    assert_eq!(profile.body["toolsOrder"], json!(["Rust", "SQL"]));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_profile_rejects_duplicate_order_entries() {
    let mut ctx = TestContext::new().await;
    ctx.login_as_new_admin("editor").await;

    let update = ctx
        .put("/admin/profile", json!({"industriesOrder": ["Health", "Health"]}))
        .await;
    assert_eq!(update.status, StatusCode::BAD_REQUEST);
    assert_eq!(update.body["errors"][0]["field"], "industriesOrder");
}

// ============================================================================
// Case Studies
// ============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_unpublished_case_study_is_not_found() {
    let mut ctx = TestContext::new().await;
    ctx.login_as_new_admin("editor").await;

    let draft = create_case_study(&mut ctx, "Draft Study", false).await;
    assert_eq!(draft["slug"], "draft-study");

    ctx.clear_cookie();
    let unpublished = ctx.get("/case-studies/draft-study").await;
    let missing = ctx.get("/case-studies/no-such-study").await;
    assert_eq!(unpublished.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(unpublished.body, missing.body);

    let listed = ctx.get("/case-studies").await;
    assert_eq!(listed.body, json!([]));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_published_case_study_renders_html() {
    let mut ctx = TestContext::new().await;
    ctx.login_as_new_admin("editor").await;

    let study = create_case_study(&mut ctx, "Churn Model", true).await;
    assert_eq!(study["tags"], json!(["ml", "product"]));

    ctx.clear_cookie();
    let response = ctx.get("/case-studies/churn-model").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["title"], "Churn Model");

    let html = response.body["html"].as_str().unwrap();
    assert!(html.contains("<h2"));
    assert!(html.contains(r#"<a href="https://example.com/paper" target="_blank" rel="noopener noreferrer">the paper</a>"#));
    assert!(!html.contains("Enter a caption"));

    let listed = ctx.get("/case-studies").await;
    assert_eq!(listed.body.as_array().unwrap().len(), 1);
    assert!(listed.body[0].get("content").is_none());
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_featured_filter() {
    let mut ctx = TestContext::new().await;
    ctx.login_as_new_admin("editor").await;

    create_case_study(&mut ctx, "Plain", true).await;
    let featured = ctx
        .post(
            "/admin/case-studies",
            json!({"title": "Star", "isPublished": true, "isFeatured": true}),
        )
        .await;
    assert_eq!(featured.status, StatusCode::CREATED);

    let listed = ctx.get("/case-studies?featured=true").await;
    let slugs: Vec<&str> = listed
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["slug"].as_str().unwrap())
        .collect();
    assert_eq!(slugs, ["star"]);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_duplicate_slug_conflicts() {
    let mut ctx = TestContext::new().await;
    ctx.login_as_new_admin("editor").await;

    create_case_study(&mut ctx, "Churn Model", true).await;
    let duplicate = ctx
        .post("/admin/case-studies", json!({"title": "Churn  Model!"}))
        .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_malformed_content_is_rejected() {
    let mut ctx = TestContext::new().await;
    ctx.login_as_new_admin("editor").await;

    let response = ctx
        .post(
            "/admin/case-studies",
            json!({"title": "Broken", "content": {"time": 1}}),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["errors"][0]["field"], "content");

    let listed = ctx.get("/admin/case-studies").await;
    assert_eq!(listed.body, json!([]));
}

// ============================================================================
// Editor Tools
// ============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_fetch_url_blocks_loopback() {
    let mut ctx = TestContext::new().await;
    ctx.login_as_new_admin("editor").await;

    let response = ctx.get("/fetch-url?url=http://127.0.0.1/admin").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_editor_tools_require_session() {
    let mut ctx = TestContext::new().await;

    let response = ctx.get("/fetch-url?url=https://example.com").await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_upload_without_image_host_is_unavailable() {
    let mut ctx = TestContext::new().await;
    ctx.login_as_new_admin("editor").await;

    let response = ctx.post("/upload-image", json!({})).await;
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
}
