//! Business logic services.
//!
//! - [`auth`] - Admin login, setup, password rotation and session binding
//! - [`link_preview`] - SSRF-guarded metadata fetch for link blocks
//! - [`image_upload`] - Forwarding editor uploads to the image host

pub mod auth;
pub mod image_upload;
pub mod link_preview;
