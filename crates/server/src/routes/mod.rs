//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! # Health
//! GET    /health                       - Liveness
//! GET    /health/ready                 - Readiness (database ping)
//!
//! # Public (no session)
//! GET    /profile                      - Site profile
//! GET    /experiences                  - Work history in display order
//! GET    /education                    - Education in display order
//! GET    /case-studies                 - Published case studies (?featured=true)
//! GET    /case-studies/{slug}          - Published case study with rendered HTML
//!
//! # Admin auth
//! POST   /admin/login                  - Username + password login (rate limited)
//! POST   /admin/logout                 - Destroy the session
//! GET    /admin/me                     - Current admin
//! POST   /admin/setup                  - First-run admin creation (rate limited)
//! PUT    /admin/password               - Rotate password
//!
//! # Admin content (session required)
//! PUT    /admin/profile                - Partial profile update
//! GET    /admin/experiences            - List
//! POST   /admin/experiences            - Create
//! PATCH  /admin/experiences/reorder    - Reorder by full id permutation
//! GET    /admin/experiences/{id}       - Read
//! PUT    /admin/experiences/{id}       - Replace
//! DELETE /admin/experiences/{id}       - Delete
//! ...    /admin/education[/{id}]       - Same shape as experiences
//! GET    /admin/case-studies           - List all, drafts included
//! POST   /admin/case-studies           - Create
//! GET    /admin/case-studies/{id}      - Read
//! PUT    /admin/case-studies/{id}      - Replace
//! DELETE /admin/case-studies/{id}      - Delete
//!
//! # Editor integrations (session required)
//! POST   /upload-image                 - Multipart `image` to the image host
//! GET    /fetch-url?url=               - Link preview metadata
//! ```

pub mod admin;
pub mod editor;
mod extract;
pub mod health;
pub mod public;

use axum::Router;

pub use extract::{ApiJson, ApiPath, ApiQuery};

use crate::state::AppState;

/// Build the application router (without the outer middleware stack).
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(public::router())
        .merge(admin::router())
        .merge(editor::router())
}
