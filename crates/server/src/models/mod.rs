//! Domain models.
//!
//! Validated domain types returned by the repositories in [`crate::db`] and
//! serialized (camelCase) by the route handlers.

pub mod admin_user;
pub mod case_study;
pub mod education;
pub mod experience;
pub mod profile;
pub mod session;

pub use admin_user::AdminUser;
pub use case_study::{CaseStudy, CaseStudyInput, CaseStudySummary};
pub use education::{Education, EducationInput};
pub use experience::{Experience, ExperienceInput, ToolUsage};
pub use profile::{Profile, ProfileUpdate};
pub use session::{CurrentAdmin, SessionGrant};
