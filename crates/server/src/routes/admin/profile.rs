//! Admin profile handler.

use axum::{Json, Router, extract::State, routing::put};
use serde::Deserialize;

use crate::db::ProfileRepository;
use crate::error::AppError;
use crate::middleware::RequireAdminAuth;
use crate::models::{Profile, ProfileUpdate};
use crate::routes::ApiJson;
use crate::state::AppState;
use crate::validation::ValidationErrors;

/// Build the profile router.
pub fn router() -> Router<AppState> {
    Router::new().route("/admin/profile", put(update_profile))
}

/// Partial profile update. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    pub name: Option<String>,
    pub brief_intro: Option<String>,
    pub tools_order: Option<Vec<String>>,
    pub industries_order: Option<Vec<String>>,
    pub education_categories: Option<Vec<String>>,
}

impl ProfileRequest {
    /// Validate into a [`ProfileUpdate`].
    ///
    /// # Errors
    ///
    /// Returns every invalid field: a blank name, or a list containing a blank
    /// or repeated entry.
    pub fn validate(self) -> Result<ProfileUpdate, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let name = match self.name {
            Some(name) => errors.required("name", Some(name.as_str())),
            None => None,
        };
        let brief_intro = self.brief_intro.map(|s| s.trim().to_string());
        let tools_order = self
            .tools_order
            .and_then(|list| ordered_names(&mut errors, "toolsOrder", list));
        let industries_order = self
            .industries_order
            .and_then(|list| ordered_names(&mut errors, "industriesOrder", list));
        let education_categories = self
            .education_categories
            .and_then(|list| ordered_names(&mut errors, "educationCategories", list));

        errors.finish(|| {
            Some(ProfileUpdate {
                name,
                brief_intro,
                tools_order,
                industries_order,
                education_categories,
            })
        })
    }
}

/// Trim every entry; blank or repeated entries are errors since the list
/// defines a display order.
fn ordered_names(
    errors: &mut ValidationErrors,
    field: &str,
    list: Vec<String>,
) -> Option<Vec<String>> {
    let mut out: Vec<String> = Vec::with_capacity(list.len());
    let mut ok = true;
    for (i, raw) in list.into_iter().enumerate() {
        let name = raw.trim().to_string();
        if name.is_empty() {
            errors.add(&format!("{field}[{i}]"), "must not be blank");
            ok = false;
        } else if out.contains(&name) {
            errors.add(&format!("{field}[{i}]"), format!("duplicate entry '{name}'"));
            ok = false;
        } else {
            out.push(name);
        }
    }
    ok.then_some(out)
}

/// PUT /admin/profile
async fn update_profile(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ProfileRequest>,
) -> Result<Json<Profile>, AppError> {
    let update = body.validate()?;
    let repo = ProfileRepository::new(state.pool());

    let profile = if update.is_empty() {
        repo.get().await?
    } else {
        repo.update(&update).await?
    };
    Ok(Json(profile))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_request_is_empty_update() {
        let update = ProfileRequest::default().validate().unwrap();
        assert!(update.is_empty());
    }

    #[test]
    fn test_lists_are_trimmed() {
        let update = ProfileRequest {
            tools_order: Some(vec![" Figma ".to_string(), "SQL".to_string()]),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(update.tools_order, Some(vec!["Figma".to_string(), "SQL".to_string()]));
    }

    #[test]
    fn test_blank_name_and_duplicates_rejected() {
        let errors = ProfileRequest {
            name: Some("   ".to_string()),
            industries_order: Some(vec!["Fintech".to_string(), "Fintech".to_string()]),
            ..Default::default()
        }
        .validate()
        .unwrap_err();

        let fields: Vec<&str> = errors.as_slice().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "industriesOrder[1]"]);
    }
}
