//! Admin education handlers.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch},
};
use serde::Deserialize;

use folio_core::{EducationId, WebUrl};

use crate::db::EducationRepository;
use crate::error::AppError;
use crate::middleware::RequireAdminAuth;
use crate::models::{Education, EducationInput};
use crate::routes::{ApiJson, ApiPath};
use crate::state::AppState;
use crate::validation::{ValidationErrors, optional_text};

use super::ReorderRequest;

/// Build the education router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/education", get(list).post(create))
        .route("/admin/education/reorder", patch(reorder))
        .route(
            "/admin/education/{id}",
            get(show).put(update).delete(destroy),
        )
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub link: Option<String>,
    pub date: Option<String>,
    pub sort_order: Option<i32>,
}

impl EducationRequest {
    /// Validate into an [`EducationInput`].
    ///
    /// # Errors
    ///
    /// Returns every missing required field and a link that is not http(s).
    pub fn validate(self) -> Result<EducationInput, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let name = errors.required("name", self.name.as_deref());
        let category = errors.required("category", self.category.as_deref());
        let link = match optional_text(self.link.as_deref()) {
            Some(raw) => errors.check("link", WebUrl::parse(&raw)).map(Some),
            None => Some(None),
        };

        errors.finish(|| {
            Some(EducationInput {
                name: name?,
                category: category?,
                link: link?,
                date: optional_text(self.date.as_deref()),
                sort_order: self.sort_order,
            })
        })
    }
}

/// GET /admin/education
async fn list(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<Education>>, AppError> {
    Ok(Json(EducationRepository::new(state.pool()).list().await?))
}

/// POST /admin/education
async fn create(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<EducationRequest>,
) -> Result<(StatusCode, Json<Education>), AppError> {
    let input = body.validate()?;
    let education = EducationRepository::new(state.pool()).create(&input).await?;
    tracing::info!(education_id = %education.id, "Education created");
    Ok((StatusCode::CREATED, Json(education)))
}

/// GET /admin/education/{id}
async fn show(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<EducationId>,
) -> Result<Json<Education>, AppError> {
    Ok(Json(EducationRepository::new(state.pool()).get(id).await?))
}

/// PUT /admin/education/{id}
async fn update(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<EducationId>,
    ApiJson(body): ApiJson<EducationRequest>,
) -> Result<Json<Education>, AppError> {
    let input = body.validate()?;
    Ok(Json(EducationRepository::new(state.pool()).update(id, &input).await?))
}

/// DELETE /admin/education/{id}
async fn destroy(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<EducationId>,
) -> Result<StatusCode, AppError> {
    EducationRepository::new(state.pool()).delete(id).await?;
    tracing::info!(education_id = %id, "Education deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /admin/education/reorder
async fn reorder(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ReorderRequest<EducationId>>,
) -> Result<Json<Vec<Education>>, AppError> {
    let repo = EducationRepository::new(state.pool());
    repo.reorder(&body.ids).await?;
    Ok(Json(repo.list().await?))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_minimal() {
        let input = EducationRequest {
            name: Some("ML Specialization".to_string()),
            category: Some("Certifications".to_string()),
            link: Some(String::new()),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(input.link, None);
        assert_eq!(input.date, None);
    }

    #[test]
    fn test_link_must_be_http() {
        let errors = EducationRequest {
            name: Some("PM Cert".to_string()),
            category: Some("Certifications".to_string()),
            link: Some("javascript:alert(1)".to_string()),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(errors.as_slice()[0].field, "link");
    }

    #[test]
    fn test_valid_link_kept() {
        let input = EducationRequest {
            name: Some("PM Cert".to_string()),
            category: Some("Certifications".to_string()),
            link: Some("https://example.org/cert".to_string()),
            date: Some(" 2022 ".to_string()),
            sort_order: Some(3),
        }
        .validate()
        .unwrap();
        assert_eq!(input.link.unwrap().as_str(), "https://example.org/cert");
        assert_eq!(input.date.as_deref(), Some("2022"));
        assert_eq!(input.sort_order, Some(3));
    }
}
