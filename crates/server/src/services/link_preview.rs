//! Link previews for the editor's link block.
//!
//! Fetching an arbitrary admin-supplied URL from the server is an SSRF vector,
//! so every target is vetted before any request goes out:
//!
//! 1. only `http` and `https` with a host are accepted, `localhost` is not
//! 2. the host is resolved and every resolved address must be public
//! 3. the request is pinned to the vetted address, so a second DNS answer
//!    cannot swap in an internal one
//! 4. redirects are not followed
//!
//! The response body is read up to [`MAX_BODY_BYTES`] and scanned for
//! `<title>` and Open Graph tags.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use url::{Host, Url};

use folio_core::document::{LinkImage, LinkMeta};

/// Upper bound on how much of a page is read.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = concat!("folio-link-preview/", env!("CARGO_PKG_VERSION"));

static META_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<meta\b[^>]*>").expect("META_TAG_RE is a valid regex")
});

static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)([a-z][a-z0-9:_-]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
        .expect("ATTR_RE is a valid regex")
});

static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("TITLE_RE is a valid regex")
});

/// Errors from fetching a link preview.
#[derive(Debug, Error)]
pub enum LinkPreviewError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("url not allowed: {0}")]
    Blocked(String),

    #[error("could not resolve host: {0}")]
    Resolve(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("target responded with status {0}")]
    Status(u16),

    #[error("response too large")]
    TooLarge,
}

/// Editor link-tool response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkPreview {
    pub success: u8,
    pub link: String,
    pub meta: LinkMeta,
}

/// Fetch `raw_url` and extract its preview metadata.
///
/// # Errors
///
/// Returns `LinkPreviewError::InvalidUrl` or `Blocked` without making any
/// request when the target fails vetting, and `Http`, `Status` or `TooLarge`
/// when the fetch itself fails.
pub async fn fetch_preview(raw_url: &str) -> Result<LinkPreview, LinkPreviewError> {
    let url = vet_url(raw_url)?;
    let addr = resolve_public(&url).await?;

    let mut builder = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .timeout(REQUEST_TIMEOUT)
        .user_agent(USER_AGENT);
    if let Some(Host::Domain(domain)) = url.host() {
        builder = builder.resolve(domain, addr);
    }
    let client = builder.build()?;

    tracing::debug!(url = %url, addr = %addr, "Fetching link preview");

    let mut response = client.get(url.clone()).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(LinkPreviewError::Status(status.as_u16()));
    }

    let is_html = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_none_or(|ct| ct.to_ascii_lowercase().contains("html"));
    if !is_html {
        return Ok(LinkPreview {
            success: 1,
            link: url.to_string(),
            meta: LinkMeta::default(),
        });
    }

    let mut body: Vec<u8> = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        body.extend_from_slice(&chunk);
        if body.len() >= MAX_BODY_BYTES {
            break;
        }
    }

    let html = String::from_utf8_lossy(&body);
    if body.len() >= MAX_BODY_BYTES && !html.to_ascii_lowercase().contains("</head>") {
        return Err(LinkPreviewError::TooLarge);
    }

    Ok(LinkPreview {
        success: 1,
        link: url.to_string(),
        meta: extract_meta(&html, &url),
    })
}

/// Check scheme and host without touching the network.
///
/// # Errors
///
/// Returns `InvalidUrl` for unparseable input and `Blocked` for a disallowed
/// scheme, `localhost`, or a literal address that is not public.
pub fn vet_url(raw_url: &str) -> Result<Url, LinkPreviewError> {
    let url = Url::parse(raw_url.trim()).map_err(|e| LinkPreviewError::InvalidUrl(e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(LinkPreviewError::Blocked(format!(
            "scheme '{}' is not allowed",
            url.scheme()
        )));
    }

    match url.host() {
        None => Err(LinkPreviewError::InvalidUrl("missing host".to_string())),
        Some(Host::Domain(domain)) => {
            let domain = domain.trim_end_matches('.').to_ascii_lowercase();
            if domain == "localhost" || domain.ends_with(".localhost") {
                return Err(LinkPreviewError::Blocked("localhost".to_string()));
            }
            Ok(url)
        }
        Some(Host::Ipv4(ip)) => check_ip(IpAddr::V4(ip)).map(|()| url),
        Some(Host::Ipv6(ip)) => check_ip(IpAddr::V6(ip)).map(|()| url),
    }
}

/// Resolve the host of a vetted URL and return the address to connect to.
async fn resolve_public(url: &Url) -> Result<SocketAddr, LinkPreviewError> {
    let port = url
        .port_or_known_default()
        .ok_or_else(|| LinkPreviewError::InvalidUrl("missing port".to_string()))?;

    let host = match url.host() {
        Some(Host::Ipv4(ip)) => return Ok(SocketAddr::new(IpAddr::V4(ip), port)),
        Some(Host::Ipv6(ip)) => return Ok(SocketAddr::new(IpAddr::V6(ip), port)),
        Some(Host::Domain(domain)) => domain.to_owned(),
        None => return Err(LinkPreviewError::InvalidUrl("missing host".to_string())),
    };

    let addrs: Vec<SocketAddr> = tokio::net::lookup_host((host.as_str(), port))
        .await
        .map_err(|e| LinkPreviewError::Resolve(format!("{host}: {e}")))?
        .collect();

    // Every answer must be public; otherwise a round-robin record could mix in
    // an internal address.
    for addr in &addrs {
        check_ip(addr.ip())?;
    }

    addrs
        .into_iter()
        .next()
        .ok_or_else(|| LinkPreviewError::Resolve(format!("{host}: no addresses")))
}

fn check_ip(ip: IpAddr) -> Result<(), LinkPreviewError> {
    if is_blocked_ip(ip) {
        tracing::info!(ip = %ip, "Link preview target blocked");
        return Err(LinkPreviewError::Blocked(format!("address {ip} is not public")));
    }
    Ok(())
}

/// Whether `ip` is anything other than a public unicast address.
#[must_use]
pub fn is_blocked_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_blocked_v4(v4),
        IpAddr::V6(v6) => is_blocked_v6(v6),
    }
}

fn is_blocked_v4(ip: Ipv4Addr) -> bool {
    let [a, b, c, _] = ip.octets();
    ip.is_loopback()
        || ip.is_private()
        || ip.is_link_local()
        || ip.is_unspecified()
        || ip.is_multicast()
        || ip.is_broadcast()
        || ip.is_documentation()
        // 0.0.0.0/8 "this network"
        || a == 0
        // 100.64.0.0/10 carrier-grade NAT
        || (a == 100 && (b & 0xc0) == 64)
        // 192.0.0.0/24 protocol assignments
        || (a == 192 && b == 0 && c == 0)
        // 198.18.0.0/15 benchmarking
        || (a == 198 && (b & 0xfe) == 18)
        // 240.0.0.0/4 reserved
        || a >= 240
}

fn is_blocked_v6(ip: Ipv6Addr) -> bool {
    if let Some(v4) = ip.to_ipv4_mapped() {
        return is_blocked_v4(v4);
    }

    let [s0, s1, s2, s3, s4, s5, s6, s7] = ip.segments();
    ip.is_loopback()
        || ip.is_unspecified()
        || ip.is_multicast()
        // fc00::/7 unique local
        || (s0 & 0xfe00) == 0xfc00
        // fe80::/10 link-local
        || (s0 & 0xffc0) == 0xfe80
        // 2001:db8::/32 documentation
        || (s0 == 0x2001 && s1 == 0x0db8)
        // 64:ff9b::/96 NAT64 embeds an IPv4 address
        || (s0 == 0x0064
            && s1 == 0xff9b
            && [s2, s3, s4, s5] == [0; 4]
            && is_blocked_v4(Ipv4Addr::from((u32::from(s6) << 16) | u32::from(s7))))
}

/// Pull title, description and image out of a page's markup.
fn extract_meta(html: &str, base: &Url) -> LinkMeta {
    let mut og_title = None;
    let mut og_description = None;
    let mut description = None;
    let mut image = None;

    for tag in META_TAG_RE.find_iter(html) {
        let mut key = None;
        let mut content = None;
        for attr in ATTR_RE.captures_iter(tag.as_str()) {
            let value = attr.get(2).or_else(|| attr.get(3)).map_or("", |m| m.as_str());
            match attr[1].to_ascii_lowercase().as_str() {
                "property" | "name" => key = Some(value.to_ascii_lowercase()),
                "content" => content = Some(decode_entities(value)),
                _ => {}
            }
        }

        let (Some(key), Some(content)) = (key, content) else {
            continue;
        };
        if content.trim().is_empty() {
            continue;
        }

        match key.as_str() {
            "og:title" => og_title.get_or_insert(content),
            "og:description" => og_description.get_or_insert(content),
            "description" => description.get_or_insert(content),
            "og:image" | "og:image:url" | "twitter:image" => image.get_or_insert(content),
            _ => continue,
        };
    }

    let title = og_title.or_else(|| {
        TITLE_RE
            .captures(html)
            .map(|c| decode_entities(c[1].trim()))
            .filter(|t| !t.is_empty())
    });

    let image = image
        .and_then(|src| base.join(src.trim()).ok())
        .filter(|u| matches!(u.scheme(), "http" | "https"))
        .map(|u| LinkImage { url: u.to_string() });

    LinkMeta {
        title: title.map(|t| collapse_whitespace(&t)),
        description: og_description.or(description).map(|d| collapse_whitespace(&d)),
        image,
    }
}

fn decode_entities(raw: &str) -> String {
    raw.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn blocked(ip: &str) -> bool {
        is_blocked_ip(ip.parse().unwrap())
    }

    #[test]
    fn test_blocked_ipv4_ranges() {
        for ip in [
            "127.0.0.1",
            "10.1.2.3",
            "172.16.0.1",
            "192.168.1.1",
            "169.254.169.254",
            "0.0.0.0",
            "0.1.2.3",
            "224.0.0.1",
            "255.255.255.255",
            "192.0.2.10",
            "198.51.100.7",
            "203.0.113.9",
            "100.64.0.1",
            "100.127.255.254",
            "198.18.0.1",
            "240.0.0.1",
        ] {
            assert!(blocked(ip), "{ip} should be blocked");
        }
    }

    #[test]
    fn test_public_ipv4_allowed() {
        for ip in ["8.8.8.8", "1.1.1.1", "100.128.0.1", "172.32.0.1", "93.184.216.34"] {
            assert!(!blocked(ip), "{ip} should be allowed");
        }
    }

    #[test]
    fn test_blocked_ipv6_ranges() {
        for ip in [
            "::1",
            "::",
            "fc00::1",
            "fd12:3456::1",
            "fe80::1",
            "ff02::1",
            "2001:db8::1",
            "::ffff:127.0.0.1",
            "::ffff:10.0.0.1",
            "64:ff9b::a00:1",
        ] {
            assert!(blocked(ip), "{ip} should be blocked");
        }
    }

    #[test]
    fn test_public_ipv6_allowed() {
        for ip in ["2606:4700:4700::1111", "::ffff:8.8.8.8", "64:ff9b::808:808"] {
            assert!(!blocked(ip), "{ip} should be allowed");
        }
    }

    #[test]
    fn test_vet_url_rejects_bad_targets() {
        for raw in [
            "http://127.0.0.1/admin",
            "http://localhost:5000/",
            "http://api.localhost/",
            "http://LOCALHOST./",
            "http://[::1]/",
            "http://10.0.0.1/",
            "ftp://example.com/file",
            "file:///etc/passwd",
            "gopher://example.com/",
        ] {
            assert!(
                matches!(vet_url(raw), Err(LinkPreviewError::Blocked(_))),
                "{raw} should be blocked"
            );
        }
        assert!(matches!(vet_url("not a url"), Err(LinkPreviewError::InvalidUrl(_))));
    }

    #[test]
    fn test_vet_url_accepts_public_targets() {
        assert!(vet_url("https://example.com/post").is_ok());
        assert!(vet_url("http://93.184.216.34/").is_ok());
    }

    #[tokio::test]
    async fn test_fetch_preview_blocks_loopback_before_request() {
        let err = fetch_preview("http://127.0.0.1/admin").await.unwrap_err();
        assert!(matches!(err, LinkPreviewError::Blocked(_)));
    }

    #[test]
    fn test_extract_meta_prefers_open_graph() {
        let base = Url::parse("https://example.com/posts/1").unwrap();
        let html = r#"<html><head>
            <title>Fallback Title</title>
            <meta name="description" content="Plain description">
            <meta property="og:title" content="OG &amp; Title">
            <meta property='og:description' content='OG description'>
            <meta property="og:image" content="/img/cover.png">
        </head></html>"#;

        let meta = extract_meta(html, &base);
        assert_eq!(meta.title.as_deref(), Some("OG & Title"));
        assert_eq!(meta.description.as_deref(), Some("OG description"));
        assert_eq!(
            meta.image.map(|i| i.url),
            Some("https://example.com/img/cover.png".to_string())
        );
    }

    #[test]
    fn test_extract_meta_falls_back_to_title_tag() {
        let base = Url::parse("https://example.com/").unwrap();
        let html = "<head><title>\n  Just a   title\n</title><meta name=\"description\" content=\"Desc\"></head>";

        let meta = extract_meta(html, &base);
        assert_eq!(meta.title.as_deref(), Some("Just a title"));
        assert_eq!(meta.description.as_deref(), Some("Desc"));
        assert!(meta.image.is_none());
    }

    #[test]
    fn test_extract_meta_drops_non_http_images() {
        let base = Url::parse("https://example.com/").unwrap();
        let html = r#"<meta property="og:image" content="javascript:alert(1)">"#;
        assert!(extract_meta(html, &base).image.is_none());
    }

    #[test]
    fn test_preview_serializes_editor_shape() {
        let preview = LinkPreview {
            success: 1,
            link: "https://example.com/".to_string(),
            meta: LinkMeta {
                title: Some("T".to_string()),
                description: None,
                image: Some(LinkImage {
                    url: "https://example.com/i.png".to_string(),
                }),
            },
        };
        let json = serde_json::to_value(&preview).unwrap();
        assert_eq!(json["success"], 1);
        assert_eq!(json["meta"]["title"], "T");
        assert_eq!(json["meta"]["image"]["url"], "https://example.com/i.png");
    }
}
