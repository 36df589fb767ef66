//! Editor integration endpoints: image upload and link preview.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State, multipart::MultipartRejection},
    routing::{get, post},
};
use serde::Deserialize;
use tower_http::limit::RequestBodyLimitLayer;

use crate::error::AppError;
use crate::middleware::RequireAdminAuth;
use crate::routes::ApiQuery;
use crate::services::image_upload::{ImageUploadError, UploadResponse, UploadedImage};
use crate::services::link_preview::{self, LinkPreview};
use crate::state::AppState;

/// Largest accepted upload body.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Multipart field carrying the file.
const IMAGE_FIELD: &str = "image";

/// Build the editor router.
pub fn router() -> Router<AppState> {
    let upload = Router::new()
        .route("/upload-image", post(upload_image))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_UPLOAD_BYTES));

    Router::new()
        .merge(upload)
        .route("/fetch-url", get(fetch_url))
}

#[derive(Debug, Deserialize)]
pub struct FetchUrlQuery {
    pub url: String,
}

/// POST /upload-image
async fn upload_image(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let uploader = state.uploader();
    if !uploader.is_configured() {
        return Err(ImageUploadError::NotConfigured.into());
    }

    let mut multipart = multipart?;
    let image = read_image_field(&mut multipart).await?;
    Ok(Json(uploader.upload(image).await?))
}

/// GET /fetch-url?url=
async fn fetch_url(
    RequireAdminAuth(_admin): RequireAdminAuth,
    ApiQuery(query): ApiQuery<FetchUrlQuery>,
) -> Result<Json<LinkPreview>, AppError> {
    Ok(Json(link_preview::fetch_preview(&query.url).await?))
}

async fn read_image_field(multipart: &mut Multipart) -> Result<UploadedImage, ImageUploadError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ImageUploadError::Multipart(e.body_text()))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_owned);
        let content_type = field.content_type().map(str::to_owned);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ImageUploadError::Multipart(e.body_text()))?;

        return UploadedImage::new(file_name.as_deref(), content_type.as_deref(), bytes);
    }

    Err(ImageUploadError::MissingFile)
}
