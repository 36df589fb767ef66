//! Folio Core - Shared types and content model.
//!
//! This crate provides the pieces of Folio that need no I/O:
//! - `server` - Public read API and the authenticated admin API
//! - `cli` - Migrations and admin account management
//!
//! # Modules
//!
//! - [`types`] - Typed ids and validated values (`Slug`, `WebUrl`, `Username`)
//! - [`document`] - Block document parsing, serialization and HTML rendering
//! - [`ordering`] - Validation for reorder-by-id-array requests

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod document;
pub mod ordering;
pub mod types;

pub use document::{BlockDocument, DocumentError};
pub use ordering::{OrderError, validate_permutation};
pub use types::*;
