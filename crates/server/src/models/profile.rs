//! Site profile (singleton).

use chrono::{DateTime, Utc};
use serde::Serialize;

/// The site owner's profile. Exactly one exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub name: String,
    pub brief_intro: String,
    /// Display order of tool names.
    pub tools_order: Vec<String>,
    /// Display order of industry names.
    pub industries_order: Vec<String>,
    /// Display order of education category names.
    pub education_categories: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

/// Partial profile update. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub brief_intro: Option<String>,
    pub tools_order: Option<Vec<String>>,
    pub industries_order: Option<Vec<String>>,
    pub education_categories: Option<Vec<String>>,
}

impl ProfileUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.brief_intro.is_none()
            && self.tools_order.is_none()
            && self.industries_order.is_none()
            && self.education_categories.is_none()
    }
}
