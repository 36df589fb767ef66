//! Image uploads for the editor's image block.
//!
//! Files are not stored locally. Each upload is forwarded as a multipart POST
//! to the configured image host, authenticated with a bearer token, and the
//! host's public URL is handed back to the editor.

use std::time::Duration;

use axum::body::Bytes;
use reqwest::multipart::{Form, Part};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use folio_core::document::ImageFile;

use crate::config::ImageUploadConfig;

/// Timeout for one upload to the image host.
pub const UPLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Accepted upload types. SVG is excluded since it can carry script.
pub const ALLOWED_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Errors from uploading an image.
#[derive(Debug, Error)]
pub enum ImageUploadError {
    #[error("image uploads are not configured")]
    NotConfigured,

    #[error("no image file in request")]
    MissingFile,

    #[error("unsupported image type: {0}")]
    UnsupportedType(String),

    #[error("invalid multipart body: {0}")]
    Multipart(String),

    #[error("image host request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("image host responded with status {0}")]
    Status(u16),

    #[error("unexpected image host response: {0}")]
    InvalidResponse(String),
}

/// An image file taken from the editor's multipart request.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl UploadedImage {
    /// Build from multipart field parts, checking type and size.
    ///
    /// # Errors
    ///
    /// Returns `MissingFile` for an empty body and `UnsupportedType` for
    /// anything outside [`ALLOWED_CONTENT_TYPES`].
    pub fn new(
        file_name: Option<&str>,
        content_type: Option<&str>,
        bytes: Bytes,
    ) -> Result<Self, ImageUploadError> {
        if bytes.is_empty() {
            return Err(ImageUploadError::MissingFile);
        }

        let content_type = content_type
            .map(|ct| ct.split(';').next().unwrap_or(ct).trim().to_ascii_lowercase())
            .unwrap_or_default();
        if !ALLOWED_CONTENT_TYPES.contains(&content_type.as_str()) {
            return Err(ImageUploadError::UnsupportedType(if content_type.is_empty() {
                "unknown".to_string()
            } else {
                content_type
            }));
        }

        Ok(Self {
            file_name: file_name
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .unwrap_or("upload")
                .to_string(),
            content_type,
            bytes,
        })
    }
}

/// Editor image-tool response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadResponse {
    pub success: u8,
    pub file: ImageFile,
}

/// Accepted shapes of the image host's reply: the URL at the top level or
/// under `data` or `file`.
#[derive(Debug, Deserialize)]
struct HostResponse {
    url: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    data: Option<HostImage>,
    file: Option<HostImage>,
}

#[derive(Debug, Deserialize)]
struct HostImage {
    url: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

/// Client for the external image host.
#[derive(Debug, Clone)]
pub struct ImageUploader {
    client: reqwest::Client,
    config: Option<ImageUploadConfig>,
}

impl ImageUploader {
    /// Create an uploader. `None` config disables uploads.
    ///
    /// # Errors
    ///
    /// Returns `ImageUploadError::Http` if the HTTP client cannot be built.
    pub fn new(config: Option<ImageUploadConfig>) -> Result<Self, ImageUploadError> {
        let client = reqwest::Client::builder()
            .timeout(UPLOAD_TIMEOUT)
            .user_agent(concat!("folio/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, config })
    }

    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    /// Forward `image` to the image host.
    ///
    /// # Errors
    ///
    /// Returns `NotConfigured` when uploads are disabled, `Http`/`Status` when
    /// the host fails, and `InvalidResponse` when its reply has no URL.
    pub async fn upload(&self, image: UploadedImage) -> Result<UploadResponse, ImageUploadError> {
        let config = self.config.as_ref().ok_or(ImageUploadError::NotConfigured)?;

        let size = image.bytes.len();
        let part = Part::bytes(image.bytes.to_vec())
            .file_name(image.file_name.clone())
            .mime_str(&image.content_type)
            .map_err(|e| ImageUploadError::UnsupportedType(e.to_string()))?;
        let form = Form::new().part("image", part);

        let response = self
            .client
            .post(&config.endpoint)
            .bearer_auth(config.token.expose_secret())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Image host rejected upload");
            return Err(ImageUploadError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let file = parse_host_response(&body)?;

        tracing::info!(
            file_name = %image.file_name,
            size,
            url = %file.url,
            "Image uploaded"
        );

        Ok(UploadResponse { success: 1, file })
    }
}

fn parse_host_response(body: &str) -> Result<ImageFile, ImageUploadError> {
    let reply: HostResponse = serde_json::from_str(body)
        .map_err(|e| ImageUploadError::InvalidResponse(e.to_string()))?;

    let (url, width, height) = match (reply.url, reply.data, reply.file) {
        (Some(url), _, _) => (Some(url), reply.width, reply.height),
        (None, Some(inner), _) | (None, None, Some(inner)) => (inner.url, inner.width, inner.height),
        (None, None, None) => (None, None, None),
    };

    let url = url
        .filter(|u| u.starts_with("https://") || u.starts_with("http://"))
        .ok_or_else(|| ImageUploadError::InvalidResponse("missing image url".to_string()))?;

    Ok(ImageFile { url, width, height })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_uploaded_image_accepts_known_types() {
        let image =
            UploadedImage::new(Some("a.PNG"), Some("image/png"), Bytes::from_static(b"\x89PNG"))
                .unwrap();
        assert_eq!(image.content_type, "image/png");
        assert_eq!(image.file_name, "a.PNG");
    }

    #[test]
    fn test_uploaded_image_strips_parameters() {
        let image =
            UploadedImage::new(None, Some("Image/JPEG; q=1"), Bytes::from_static(b"x")).unwrap();
        assert_eq!(image.content_type, "image/jpeg");
        assert_eq!(image.file_name, "upload");
    }

    #[test]
    fn test_uploaded_image_rejects_svg_and_unknown() {
        assert!(matches!(
            UploadedImage::new(None, Some("image/svg+xml"), Bytes::from_static(b"<svg/>")),
            Err(ImageUploadError::UnsupportedType(_))
        ));
        assert!(matches!(
            UploadedImage::new(None, None, Bytes::from_static(b"x")),
            Err(ImageUploadError::UnsupportedType(_))
        ));
    }

    #[test]
    fn test_uploaded_image_rejects_empty() {
        assert!(matches!(
            UploadedImage::new(None, Some("image/png"), Bytes::new()),
            Err(ImageUploadError::MissingFile)
        ));
    }

    #[test]
    fn test_parse_host_response_shapes() {
        let flat = parse_host_response(r#"{"url":"https://img.example/a.png","width":10,"height":20}"#)
            .unwrap();
        assert_eq!(flat.url, "https://img.example/a.png");
        assert_eq!(flat.width, Some(10));

        let nested = parse_host_response(r#"{"data":{"url":"https://img.example/b.png"}}"#).unwrap();
        assert_eq!(nested.url, "https://img.example/b.png");
        assert_eq!(nested.height, None);

        let file = parse_host_response(r#"{"success":1,"file":{"url":"https://img.example/c.png"}}"#)
            .unwrap();
        assert_eq!(file.url, "https://img.example/c.png");
    }

    #[test]
    fn test_parse_host_response_requires_http_url() {
        assert!(parse_host_response(r#"{"ok":true}"#).is_err());
        assert!(parse_host_response(r#"{"url":"javascript:x"}"#).is_err());
        assert!(parse_host_response("not json").is_err());
    }

    #[tokio::test]
    async fn test_upload_without_config_is_not_configured() {
        let uploader = ImageUploader::new(None).unwrap();
        let image =
            UploadedImage::new(None, Some("image/png"), Bytes::from_static(b"x")).unwrap();
        assert!(matches!(
            uploader.upload(image).await,
            Err(ImageUploadError::NotConfigured)
        ));
    }

    #[test]
    fn test_response_shape() {
        let response = UploadResponse {
            success: 1,
            file: ImageFile {
                url: "https://img.example/a.png".to_string(),
                width: None,
                height: None,
            },
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json, serde_json::json!({"success": 1, "file": {"url": "https://img.example/a.png"}}));
    }
}
