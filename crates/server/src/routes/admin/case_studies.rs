//! Admin case study handlers.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;
use serde_json::Value;

use folio_core::{BlockDocument, CaseStudyId, Slug, WebUrl, slugify};

use crate::db::CaseStudyRepository;
use crate::error::AppError;
use crate::middleware::RequireAdminAuth;
use crate::models::{CaseStudy, CaseStudyInput};
use crate::routes::{ApiJson, ApiPath};
use crate::state::AppState;
use crate::validation::{ValidationErrors, optional_text};

/// Build the case studies router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/case-studies", get(list).post(create))
        .route(
            "/admin/case-studies/{id}",
            get(show).put(update).delete(destroy),
        )
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseStudyRequest {
    pub title: Option<String>,
    /// Derived from the title when absent.
    pub slug: Option<String>,
    #[serde(default)]
    pub description: String,
    /// A block document, or the same encoded as a JSON string.
    pub content: Option<Value>,
    pub featured_image: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub is_featured: bool,
}

impl CaseStudyRequest {
    /// Validate into a [`CaseStudyInput`].
    ///
    /// # Errors
    ///
    /// Returns every invalid field: missing title, bad slug, content that is
    /// present but not a block document, or a non-http(s) image URL.
    pub fn validate(self) -> Result<CaseStudyInput, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let title = errors.required("title", self.title.as_deref());

        let slug = match optional_text(self.slug.as_deref()) {
            Some(raw) => errors.check("slug", Slug::parse(&raw)),
            None => match title.as_deref().map(slugify) {
                Some(Some(slug)) => Some(slug),
                Some(None) => {
                    errors.add("slug", "cannot be derived from the title");
                    None
                }
                None => None,
            },
        };

        let content = errors.check("content", BlockDocument::from_input(self.content));

        let featured_image = match optional_text(self.featured_image.as_deref()) {
            Some(raw) => errors.check("featuredImage", WebUrl::parse(&raw)).map(Some),
            None => Some(None),
        };

        errors.finish(|| {
            Some(CaseStudyInput {
                title: title?,
                slug: slug?,
                description: self.description.trim().to_string(),
                content: content?,
                featured_image: featured_image?,
                tags: dedupe_tags(self.tags),
                is_published: self.is_published,
                is_featured: self.is_featured,
            })
        })
    }
}

/// Trim, drop blanks and keep the first occurrence of each tag.
fn dedupe_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}

/// GET /admin/case-studies
async fn list(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<CaseStudy>>, AppError> {
    Ok(Json(CaseStudyRepository::new(state.pool()).list_all().await?))
}

/// POST /admin/case-studies
async fn create(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CaseStudyRequest>,
) -> Result<(StatusCode, Json<CaseStudy>), AppError> {
    let input = body.validate()?;
    let study = CaseStudyRepository::new(state.pool()).create(&input).await?;
    tracing::info!(case_study_id = %study.id, slug = %study.slug, "Case study created");
    Ok((StatusCode::CREATED, Json(study)))
}

/// GET /admin/case-studies/{id}
async fn show(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CaseStudyId>,
) -> Result<Json<CaseStudy>, AppError> {
    Ok(Json(CaseStudyRepository::new(state.pool()).get(id).await?))
}

/// PUT /admin/case-studies/{id}
async fn update(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CaseStudyId>,
    ApiJson(body): ApiJson<CaseStudyRequest>,
) -> Result<Json<CaseStudy>, AppError> {
    let input = body.validate()?;
    Ok(Json(CaseStudyRepository::new(state.pool()).update(id, &input).await?))
}

/// DELETE /admin/case-studies/{id}
async fn destroy(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CaseStudyId>,
) -> Result<StatusCode, AppError> {
    CaseStudyRepository::new(state.pool()).delete(id).await?;
    tracing::info!(case_study_id = %id, "Case study deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(body: Value) -> CaseStudyRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_slug_derived_from_title() {
        let input = request(json!({"title": "Checkout Redesign, 2024!"}))
            .validate()
            .unwrap();
        assert_eq!(input.slug.as_str(), "checkout-redesign-2024");
    }

    #[test]
    fn test_missing_content_is_empty_document() {
        for content in [json!(null), json!(""), json!("undefined")] {
            let input = request(json!({"title": "T", "content": content}))
                .validate()
                .unwrap();
            assert!(input.content.is_empty());
        }
        let input = request(json!({"title": "T"})).validate().unwrap();
        assert!(input.content.is_empty());
    }

    #[test]
    fn test_content_accepts_object_and_string() {
        let doc = json!({"blocks": [{"type": "paragraph", "data": {"text": "Hi"}}]});
        let from_object = request(json!({"title": "T", "content": doc.clone()}))
            .validate()
            .unwrap();
        let from_string = request(json!({"title": "T", "content": doc.to_string()}))
            .validate()
            .unwrap();
        assert_eq!(from_object.content, from_string.content);
        assert!(!from_object.content.is_empty());
    }

    #[test]
    fn test_invalid_content_is_validation_error() {
        let errors = request(json!({"title": "T", "content": "{not json"}))
            .validate()
            .unwrap_err();
        assert_eq!(errors.as_slice()[0].field, "content");
    }

    #[test]
    fn test_bad_slug_and_image_reported() {
        let errors = request(json!({
            "title": "T",
            "slug": "Not A Slug",
            "featuredImage": "ftp://example.com/x.png"
        }))
        .validate()
        .unwrap_err();
        let fields: Vec<&str> = errors.as_slice().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["slug", "featuredImage"]);
    }

    #[test]
    fn test_tags_deduplicated_in_order() {
        assert_eq!(
            dedupe_tags(vec![
                "ux".to_string(),
                " research ".to_string(),
                "ux".to_string(),
                String::new(),
                "research".to_string(),
            ]),
            vec!["ux".to_string(), "research".to_string()]
        );
    }
}
