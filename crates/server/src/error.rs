//! Unified error handling for the HTTP layer.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    extract::multipart::MultipartRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::image_upload::ImageUploadError;
use crate::services::link_preview::LinkPreviewError;
use crate::validation::{FieldError, ValidationErrors};

/// Message returned for every authentication failure.
pub const AUTH_REQUIRED: &str = "Authentication required";

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(RepositoryError),

    /// Session store operation failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Request body failed validation.
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// Reorder request was not a permutation of the stored ids.
    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    /// Malformed request that is not a field-level validation problem.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Missing, expired or invalid session, or bad credentials.
    #[error("{0}")]
    Unauthorized(&'static str),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unique constraint or state conflict.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// An outbound service (image host, link target) failed.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// An optional integration is not configured.
    #[error("Unavailable: {0}")]
    Unavailable(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<&'a [FieldError]>,
}

impl AppError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) | Self::Session(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Validation(_) | Self::InvalidOrder(_) | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Log server errors with Sentry
        if status.is_server_error() && status != StatusCode::SERVICE_UNAVAILABLE {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Database(_) | Self::Session(_) | Self::Internal(_) => {
                "Internal server error".to_string()
            }
            Self::Validation(_) => "Validation failed".to_string(),
            Self::Unauthorized(message) => (*message).to_string(),
            Self::Upstream(message)
            | Self::Unavailable(message)
            | Self::InvalidOrder(message)
            | Self::BadRequest(message)
            | Self::Conflict(message)
            | Self::NotFound(message) => message.clone(),
        };

        let errors = match &self {
            Self::Validation(errors) => Some(errors.as_slice()),
            _ => None,
        };

        (status, Json(ErrorBody { message, errors })).into_response()
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound("Not found".to_string()),
            RepositoryError::Conflict(message) => Self::Conflict(message),
            RepositoryError::InvalidOrder(e) => Self::InvalidOrder(e.to_string()),
            other => Self::Database(other),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => Self::Unauthorized("Invalid credentials"),
            AuthError::AlreadyInitialized => {
                Self::Conflict("An admin account already exists".to_string())
            }
            AuthError::Validation(errors) => Self::Validation(errors),
            AuthError::Repository(e) => Self::from(e),
            AuthError::Session(e) => Self::Session(e),
            AuthError::PasswordHash(_) | AuthError::Task(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<LinkPreviewError> for AppError {
    fn from(err: LinkPreviewError) -> Self {
        match err {
            LinkPreviewError::InvalidUrl(_) | LinkPreviewError::Blocked(_) => {
                Self::BadRequest(err.to_string())
            }
            LinkPreviewError::Resolve(_)
            | LinkPreviewError::Http(_)
            | LinkPreviewError::Status(_)
            | LinkPreviewError::TooLarge => Self::Upstream(err.to_string()),
        }
    }
}

impl From<ImageUploadError> for AppError {
    fn from(err: ImageUploadError) -> Self {
        match err {
            ImageUploadError::NotConfigured => {
                Self::Unavailable("Image uploads are not configured".to_string())
            }
            ImageUploadError::MissingFile
            | ImageUploadError::UnsupportedType(_)
            | ImageUploadError::Multipart(_) => Self::BadRequest(err.to_string()),
            ImageUploadError::Http(_)
            | ImageUploadError::Status(_)
            | ImageUploadError::InvalidResponse(_) => Self::Upstream(err.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// Set the Sentry user context from an admin user.
pub fn set_sentry_user(admin_user_id: i32, username: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(admin_user_id.to_string()),
            username: Some(username.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}
