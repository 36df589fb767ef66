//! Work experience entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use folio_core::ExperienceId;

/// A tool used in a role and what it was used for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolUsage {
    pub name: String,
    #[serde(default)]
    pub usage: String,
}

/// One position in the work history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    pub id: ExperienceId,
    pub job_title: String,
    pub company: String,
    pub industry: String,
    /// Free text, e.g. "Jan 2021".
    pub start_date: String,
    /// Always `None` while `is_current_job` is set.
    pub end_date: Option<String>,
    pub is_current_job: bool,
    pub description: String,
    pub accomplishments: String,
    pub tools: Vec<ToolUsage>,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for creating or replacing an experience.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperienceInput {
    pub job_title: String,
    pub company: String,
    pub industry: String,
    pub start_date: String,
    pub end_date: Option<String>,
    pub is_current_job: bool,
    pub description: String,
    pub accomplishments: String,
    pub tools: Vec<ToolUsage>,
    /// `None` appends on create and keeps the position on update.
    pub sort_order: Option<i32>,
}
