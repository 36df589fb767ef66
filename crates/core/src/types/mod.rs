//! Core types for Folio.
//!
//! Validated wrappers for the values the admin API accepts.

pub mod id;
pub mod slug;
pub mod username;
pub mod web_url;

pub use id::*;
pub use slug::{Slug, SlugError, slugify};
pub use username::{Username, UsernameError};
pub use web_url::{UrlError, WebUrl};
