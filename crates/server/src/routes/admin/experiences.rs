//! Admin experience handlers.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch},
};
use serde::Deserialize;

use folio_core::ExperienceId;

use crate::db::ExperienceRepository;
use crate::error::AppError;
use crate::middleware::RequireAdminAuth;
use crate::models::{Experience, ExperienceInput, ToolUsage};
use crate::routes::{ApiJson, ApiPath};
use crate::state::AppState;
use crate::validation::{ValidationErrors, optional_text};

use super::ReorderRequest;

/// Build the experiences router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/experiences", get(list).post(create))
        .route("/admin/experiences/reorder", patch(reorder))
        .route(
            "/admin/experiences/{id}",
            get(show).put(update).delete(destroy),
        )
}

/// A tool given either as a bare name or as `{name, usage}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ToolRequest {
    Name(String),
    Full(ToolUsage),
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceRequest {
    pub job_title: Option<String>,
    pub company: Option<String>,
    pub industry: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(default)]
    pub is_current_job: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub accomplishments: String,
    #[serde(default)]
    pub tools: Vec<ToolRequest>,
    pub sort_order: Option<i32>,
}

impl ExperienceRequest {
    /// Validate into an [`ExperienceInput`].
    ///
    /// A current job never keeps an end date.
    ///
    /// # Errors
    ///
    /// Returns every missing required field and every blank tool name.
    pub fn validate(self) -> Result<ExperienceInput, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let job_title = errors.required("jobTitle", self.job_title.as_deref());
        let company = errors.required("company", self.company.as_deref());
        let industry = errors.required("industry", self.industry.as_deref());
        let start_date = errors.required("startDate", self.start_date.as_deref());
        let end_date = if self.is_current_job {
            None
        } else {
            optional_text(self.end_date.as_deref())
        };

        let mut tools = Vec::with_capacity(self.tools.len());
        for (i, tool) in self.tools.into_iter().enumerate() {
            let (name, usage) = match tool {
                ToolRequest::Name(name) => (name, String::new()),
                ToolRequest::Full(ToolUsage { name, usage }) => (name, usage),
            };
            let name = name.trim();
            if name.is_empty() {
                errors.add(&format!("tools[{i}].name"), "is required");
                continue;
            }
            tools.push(ToolUsage {
                name: name.to_string(),
                usage: usage.trim().to_string(),
            });
        }

        errors.finish(|| {
            Some(ExperienceInput {
                job_title: job_title?,
                company: company?,
                industry: industry?,
                start_date: start_date?,
                end_date,
                is_current_job: self.is_current_job,
                description: self.description.trim().to_string(),
                accomplishments: self.accomplishments.trim().to_string(),
                tools,
                sort_order: self.sort_order,
            })
        })
    }
}

/// GET /admin/experiences
async fn list(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<Experience>>, AppError> {
    Ok(Json(ExperienceRepository::new(state.pool()).list().await?))
}

/// POST /admin/experiences
async fn create(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ExperienceRequest>,
) -> Result<(StatusCode, Json<Experience>), AppError> {
    let input = body.validate()?;
    let experience = ExperienceRepository::new(state.pool()).create(&input).await?;
    tracing::info!(experience_id = %experience.id, "Experience created");
    Ok((StatusCode::CREATED, Json(experience)))
}

/// GET /admin/experiences/{id}
async fn show(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ExperienceId>,
) -> Result<Json<Experience>, AppError> {
    Ok(Json(ExperienceRepository::new(state.pool()).get(id).await?))
}

/// PUT /admin/experiences/{id}
async fn update(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ExperienceId>,
    ApiJson(body): ApiJson<ExperienceRequest>,
) -> Result<Json<Experience>, AppError> {
    let input = body.validate()?;
    let experience = ExperienceRepository::new(state.pool()).update(id, &input).await?;
    Ok(Json(experience))
}

/// DELETE /admin/experiences/{id}
async fn destroy(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ExperienceId>,
) -> Result<StatusCode, AppError> {
    ExperienceRepository::new(state.pool()).delete(id).await?;
    tracing::info!(experience_id = %id, "Experience deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /admin/experiences/reorder
async fn reorder(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ReorderRequest<ExperienceId>>,
) -> Result<Json<Vec<Experience>>, AppError> {
    let repo = ExperienceRepository::new(state.pool());
    repo.reorder(&body.ids).await?;
    Ok(Json(repo.list().await?))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn request() -> ExperienceRequest {
        serde_json::from_value(serde_json::json!({
            "jobTitle": " Product Manager ",
            "company": "Acme",
            "industry": "Fintech",
            "startDate": "Jan 2021",
            "endDate": "Mar 2023",
            "tools": ["Figma", {"name": "SQL", "usage": "reporting"}]
        }))
        .unwrap()
    }

    #[test]
    fn test_validate_accepts_both_tool_shapes() {
        let input = request().validate().unwrap();
        assert_eq!(input.job_title, "Product Manager");
        assert_eq!(input.end_date.as_deref(), Some("Mar 2023"));
        assert_eq!(
            input.tools,
            vec![
                ToolUsage {
                    name: "Figma".to_string(),
                    usage: String::new()
                },
                ToolUsage {
                    name: "SQL".to_string(),
                    usage: "reporting".to_string()
                },
            ]
        );
        assert_eq!(input.sort_order, None);
    }

    #[test]
    fn test_current_job_clears_end_date() {
        let mut body = request();
        body.is_current_job = true;
        let input = body.validate().unwrap();
        assert!(input.is_current_job);
        assert_eq!(input.end_date, None);
    }

    #[test]
    fn test_missing_fields_all_reported() {
        let errors = ExperienceRequest::default().validate().unwrap_err();
        let fields: Vec<&str> = errors.as_slice().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["jobTitle", "company", "industry", "startDate"]);
    }

    #[test]
    fn test_blank_tool_name_rejected() {
        let mut body = request();
        body.tools.push(ToolRequest::Name("  ".to_string()));
        let errors = body.validate().unwrap_err();
        assert_eq!(errors.as_slice()[0].field, "tools[2].name");
    }
}
