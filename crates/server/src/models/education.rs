//! Education and certification entries.

use chrono::{DateTime, Utc};
use serde::Serialize;

use folio_core::{EducationId, WebUrl};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    pub id: EducationId,
    pub name: String,
    /// One of the profile's education categories.
    pub category: String,
    pub link: Option<String>,
    /// Free text, e.g. "2019" or "Spring 2022".
    pub date: Option<String>,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for creating or replacing an education entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EducationInput {
    pub name: String,
    pub category: String,
    pub link: Option<WebUrl>,
    pub date: Option<String>,
    /// `None` appends on create and keeps the position on update.
    pub sort_order: Option<i32>,
}
