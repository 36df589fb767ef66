//! Public read API.
//!
//! Nothing here needs a session. Drafts are invisible: an unpublished slug
//! answers exactly like a missing one.

use axum::{Json, Router, extract::State, routing::get};
use serde::{Deserialize, Serialize};

use folio_core::Slug;

use crate::db::{CaseStudyRepository, EducationRepository, ExperienceRepository, ProfileRepository};
use crate::error::AppError;
use crate::models::{CaseStudy, CaseStudySummary, Education, Experience, Profile};
use crate::routes::{ApiPath, ApiQuery};
use crate::state::AppState;

/// Build the public router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/profile", get(profile))
        .route("/experiences", get(experiences))
        .route("/education", get(education))
        .route("/case-studies", get(case_studies))
        .route("/case-studies/{slug}", get(case_study))
}

#[derive(Debug, Default, Deserialize)]
pub struct CaseStudyListQuery {
    #[serde(default)]
    pub featured: bool,
}

/// A published case study with its body rendered to HTML.
#[derive(Debug, Serialize)]
pub struct CaseStudyDetail {
    #[serde(flatten)]
    pub study: CaseStudy,
    pub html: String,
}

/// GET /profile
async fn profile(State(state): State<AppState>) -> Result<Json<Profile>, AppError> {
    let profile = ProfileRepository::new(state.pool()).get().await?;
    Ok(Json(profile))
}

/// GET /experiences
async fn experiences(State(state): State<AppState>) -> Result<Json<Vec<Experience>>, AppError> {
    let items = ExperienceRepository::new(state.pool()).list().await?;
    Ok(Json(items))
}

/// GET /education
async fn education(State(state): State<AppState>) -> Result<Json<Vec<Education>>, AppError> {
    let items = EducationRepository::new(state.pool()).list().await?;
    Ok(Json(items))
}

/// GET /case-studies
async fn case_studies(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<CaseStudyListQuery>,
) -> Result<Json<Vec<CaseStudySummary>>, AppError> {
    let studies = CaseStudyRepository::new(state.pool())
        .list_published(query.featured)
        .await?;
    Ok(Json(studies.into_iter().map(CaseStudySummary::from).collect()))
}

/// GET /case-studies/{slug}
async fn case_study(
    State(state): State<AppState>,
    ApiPath(slug): ApiPath<String>,
) -> Result<Json<CaseStudyDetail>, AppError> {
    // A malformed slug cannot exist, so it is simply not found.
    let slug = Slug::parse(&slug).map_err(|_| AppError::NotFound("Not found".to_string()))?;

    let study = CaseStudyRepository::new(state.pool())
        .get_published_by_slug(slug.as_str())
        .await?;
    let html = study.content.to_html();

    Ok(Json(CaseStudyDetail { study, html }))
}
