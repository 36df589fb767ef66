//! Admin API.
//!
//! Every handler except login, logout and setup takes
//! [`RequireAdminAuth`](crate::middleware::RequireAdminAuth), so an
//! unauthenticated request is rejected before the handler body runs.

pub mod auth;
pub mod case_studies;
pub mod education;
pub mod experiences;
pub mod profile;

use axum::Router;
use serde::Deserialize;

use crate::state::AppState;

/// Build the admin router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(profile::router())
        .merge(experiences::router())
        .merge(education::router())
        .merge(case_studies::router())
}

/// Body of a reorder request: the full collection's ids in the new order.
#[derive(Debug, Deserialize)]
pub struct ReorderRequest<Id> {
    pub ids: Vec<Id>,
}
