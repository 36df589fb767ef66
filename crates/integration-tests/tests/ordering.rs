//! Integration tests for reorder-by-id-array on experiences and education.
//!
//! # Requirements
//!
//! - `PostgreSQL` reachable at `DATABASE_URL`
//!
//! # Running
//!
//! ```bash
//! cargo test -p folio-integration-tests --test ordering -- --ignored
//! ```

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::{Value, json};

use folio_integration_tests::TestContext;

// ============================================================================
// Helpers
// ============================================================================

async fn create_education(ctx: &mut TestContext, name: &str, category: &str, order: i32) -> i64 {
    let response = ctx
        .post(
            "/admin/education",
            json!({"name": name, "category": category, "sortOrder": order}),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    response.body["id"].as_i64().unwrap()
}

async fn create_experience(ctx: &mut TestContext, job_title: &str) -> i64 {
    let response = ctx
        .post(
            "/admin/experiences",
            json!({
                "jobTitle": job_title,
                "company": "Acme",
                "industry": "Software",
                "startDate": "2020-01",
                "tools": ["Rust", {"name": "SQL", "usage": "daily"}],
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    response.body["id"].as_i64().unwrap()
}

fn names(body: &Value, field: &str) -> Vec<String> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|item| item[field].as_str().unwrap().to_string())
        .collect()
}

// ============================================================================
// Education
// ============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_reorder_education_swaps_order() {
    let mut ctx = TestContext::new().await;
    ctx.login_as_new_admin("editor").await;

    let first = create_education(&mut ctx, "ML Spec", "Machine Learning", 0).await;
    let second = create_education(&mut ctx, "PM Cert", "Product Management", 1).await;

    let before = ctx.get("/education").await;
    assert_eq!(names(&before.body, "name"), ["ML Spec", "PM Cert"]);

    let reorder = ctx
        .patch("/admin/education/reorder", json!({"ids": [second, first]}))
        .await;
    assert_eq!(reorder.status, StatusCode::OK);
    assert_eq!(names(&reorder.body, "name"), ["PM Cert", "ML Spec"]);

    let after = ctx.get("/education").await;
    assert_eq!(names(&after.body, "name"), ["PM Cert", "ML Spec"]);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_reorder_applies_any_permutation() {
    let mut ctx = TestContext::new().await;
    ctx.login_as_new_admin("editor").await;

    let a = create_education(&mut ctx, "A", "Degrees", 0).await;
    let b = create_education(&mut ctx, "B", "Degrees", 1).await;
    let c = create_education(&mut ctx, "C", "Degrees", 2).await;
    let d = create_education(&mut ctx, "D", "Degrees", 3).await;

    for (ids, expected) in [
        (vec![c, a, b, d], ["C", "A", "B", "D"]),
        (vec![b, d, a, c], ["B", "D", "A", "C"]),
        (vec![d, c, b, a], ["D", "C", "B", "A"]),
    ] {
        let reorder = ctx
            .patch("/admin/education/reorder", json!({"ids": ids}))
            .await;
        assert_eq!(reorder.status, StatusCode::OK);

        let listed = ctx.get("/education").await;
        assert_eq!(names(&listed.body, "name"), expected);
    }
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_reorder_rejects_non_permutations() {
    let mut ctx = TestContext::new().await;
    ctx.login_as_new_admin("editor").await;

    let first = create_education(&mut ctx, "ML Spec", "Machine Learning", 0).await;
    let second = create_education(&mut ctx, "PM Cert", "Product Management", 1).await;

    for ids in [
        json!([second]),
        json!([second, first, 9999]),
        json!([second, second]),
        json!([second, 9999]),
    ] {
        let response = ctx
            .patch("/admin/education/reorder", json!({"ids": ids}))
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{ids}");
    }

    let after = ctx.get("/admin/education").await;
    assert_eq!(names(&after.body, "name"), ["ML Spec", "PM Cert"]);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_reorder_empty_collection() {
    let mut ctx = TestContext::new().await;
    ctx.login_as_new_admin("editor").await;

    let response = ctx
        .patch("/admin/education/reorder", json!({"ids": []}))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!([]));
}

// ============================================================================
// Experiences
// ============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_new_experience_appends_to_end() {
    let mut ctx = TestContext::new().await;
    ctx.login_as_new_admin("editor").await;

    let a = create_experience(&mut ctx, "Engineer").await;
    let b = create_experience(&mut ctx, "Lead").await;
    let c = create_experience(&mut ctx, "Director").await;

    let listed = ctx.get("/experiences").await;
    assert_eq!(names(&listed.body, "jobTitle"), ["Engineer", "Lead", "Director"]);

    let reorder = ctx
        .patch("/admin/experiences/reorder", json!({"ids": [c, a, b]}))
        .await;
    assert_eq!(reorder.status, StatusCode::OK);

    create_experience(&mut ctx, "Advisor").await;
    let listed = ctx.get("/experiences").await;
    assert_eq!(
        names(&listed.body, "jobTitle"),
        ["Director", "Engineer", "Lead", "Advisor"]
    );
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_experience_validation_lists_fields() {
    let mut ctx = TestContext::new().await;
    ctx.login_as_new_admin("editor").await;

    let response = ctx.post("/admin/experiences", json!({"company": "Acme"})).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let fields = names(&response.body["errors"], "field");
    assert!(fields.contains(&"jobTitle".to_string()));
    assert!(fields.contains(&"industry".to_string()));
    assert!(fields.contains(&"startDate".to_string()));

    let listed = ctx.get("/admin/experiences").await;
    assert_eq!(listed.body, json!([]));
}
