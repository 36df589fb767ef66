//! Absolute http(s) URL type.

use core::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

/// Errors that can occur when parsing a [`WebUrl`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum UrlError {
    /// The input is not an absolute URL.
    #[error("must be an absolute URL")]
    Malformed,
    /// The scheme is something other than `http` or `https`.
    #[error("only http and https URLs are allowed")]
    UnsupportedScheme,
    /// The URL has no host.
    #[error("URL must include a host")]
    MissingHost,
}

/// An absolute `http://` or `https://` URL.
///
/// Used for every link the admin can store (education links, featured
/// images) so `javascript:` and `data:` URLs never reach a rendered page.
///
/// ```
/// use folio_core::WebUrl;
///
/// assert!(WebUrl::parse("https://example.com/course").is_ok());
/// assert!(WebUrl::parse("javascript:alert(1)").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct WebUrl(String);

impl WebUrl {
    /// Parse a `WebUrl`, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not an absolute URL, has a scheme
    /// other than http/https, or has no host.
    pub fn parse(s: &str) -> Result<Self, UrlError> {
        let url = Url::parse(s.trim()).map_err(|_| UrlError::Malformed)?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(UrlError::UnsupportedScheme);
        }

        if url.host_str().is_none_or(str::is_empty) {
            return Err(UrlError::MissingHost);
        }

        Ok(Self(url.into()))
    }

    /// Returns the URL as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `WebUrl` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for WebUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for WebUrl {
    type Error = UrlError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<WebUrl> for String {
    fn from(url: WebUrl) -> Self {
        url.0
    }
}

impl AsRef<str> for WebUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_http_and_https() {
        assert!(WebUrl::parse("http://example.com").is_ok());
        assert!(WebUrl::parse("https://example.com/a?b=c#d").is_ok());
        assert!(WebUrl::parse("  https://example.com  ").is_ok());
    }

    #[test]
    fn test_parse_rejects_other_schemes() {
        assert_eq!(
            WebUrl::parse("javascript:alert(1)"),
            Err(UrlError::UnsupportedScheme)
        );
        assert_eq!(
            WebUrl::parse("data:text/html,hi"),
            Err(UrlError::UnsupportedScheme)
        );
        assert_eq!(
            WebUrl::parse("ftp://example.com"),
            Err(UrlError::UnsupportedScheme)
        );
    }

    #[test]
    fn test_parse_rejects_relative() {
        assert_eq!(WebUrl::parse("/just/a/path"), Err(UrlError::Malformed));
        assert_eq!(WebUrl::parse(""), Err(UrlError::Malformed));
    }

    #[test]
    fn test_normalizes() {
        let url = WebUrl::parse("HTTPS://Example.COM").ok();
        assert_eq!(url.as_ref().map(WebUrl::as_str), Some("https://example.com/"));
    }
}
