//! Post-processing passes over rendered block HTML.
//!
//! Both passes are string rewrites scoped to one kind of block, so they never
//! touch each other's output and can run in either order. Running either pass
//! twice gives the same result as running it once.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::render::is_safe_url;

/// Paragraph blocks: opening tag, inner HTML, closing tag.
static PARAGRAPH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)(<div class="ce-paragraph[^"]*"[^>]*>)(.*?)(</div>)"#)
        .expect("PARAGRAPH_RE is a valid regex")
});

/// `[text](url)`. The text may carry inline markup (bold, marker, inline
/// code) but no brackets; the URL has no brackets, quotes or whitespace.
static MARKDOWN_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\[([^\[\]]+)\]\(([^()\[\]\s"'<>]+)\)"#)
        .expect("MARKDOWN_LINK_RE is a valid regex")
});

/// Opening or closing anchor tag. Link text holding one is left alone, so a
/// rewritten anchor is never wrapped in a second one.
static ANCHOR_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</?a\b").expect("ANCHOR_TAG_RE is a valid regex"));

/// Quote blocks: attributes of the opening tag and inner HTML.
static QUOTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<blockquote\b([^>]*)>(.*?)</blockquote>")
        .expect("QUOTE_RE is a valid regex")
});

static CLASS_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\sclass="([^"]*)""#).expect("CLASS_ATTR_RE is a valid regex")
});

static STYLE_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\sstyle="[^"]*""#).expect("STYLE_ATTR_RE is a valid regex")
});

/// Attributes the editor leaves behind on editable elements.
static EDITOR_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\s(?:contenteditable|data-placeholder)(?:="[^"]*")?"#)
        .expect("EDITOR_ATTR_RE is a valid regex")
});

static CAPTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<div class="cdx-quote__caption"[^>]*>(.*?)</div>"#)
        .expect("CAPTION_RE is a valid regex")
});

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("TAG_RE is a valid regex"));

/// Caption text the editor shows before anything is typed.
pub const CAPTION_PLACEHOLDER: &str = "Enter a caption";

/// Class marking a quote that already has the accent treatment.
pub const QUOTE_ACCENT_CLASS: &str = "quote-accent";

const QUOTE_ACCENT_STYLE: &str = "border-left: 4px solid #dc2626; padding-left: 1rem;";

const QUOTE_DECORATION: &str = r#"<span class="quote-decoration" aria-hidden="true">&ldquo;</span>"#;

/// Turn `[text](url)` inside paragraph blocks into anchors that open in a new
/// tab. Only http(s), mailto and relative URLs are rewritten; anything else is
/// left as literal text.
#[must_use]
pub fn rewrite_markdown_links(html: &str) -> String {
    PARAGRAPH_RE
        .replace_all(html, |caps: &Captures<'_>| {
            let inner = MARKDOWN_LINK_RE.replace_all(&caps[2], |link: &Captures<'_>| {
                let (text, url) = (&link[1], &link[2]);
                if is_safe_url(url) && !ANCHOR_TAG_RE.is_match(text) {
                    format!(r#"<a href="{url}" target="_blank" rel="noopener noreferrer">{text}</a>"#)
                } else {
                    link[0].to_owned()
                }
            });
            format!("{}{inner}{}", &caps[1], &caps[3])
        })
        .into_owned()
}

/// Clean up quote blocks and give them the accent treatment.
///
/// - strips `contenteditable` / `data-placeholder` attributes
/// - removes captions that are empty or still the editor placeholder
/// - adds the accent class, left border and a single decorative glyph
#[must_use]
pub fn normalize_quotes(html: &str) -> String {
    QUOTE_RE
        .replace_all(html, |caps: &Captures<'_>| {
            let attrs = EDITOR_ATTR_RE.replace_all(&caps[1], "");
            let Some(classes) = CLASS_ATTR_RE.captures(&attrs).map(|c| c[1].to_owned()) else {
                return caps[0].to_owned();
            };

            if !classes.split_whitespace().any(|c| c == "cdx-quote") {
                return caps[0].to_owned();
            }

            let body = strip_editor_attrs(&caps[2]);
            let body = CAPTION_RE.replace_all(&body, |cap: &Captures<'_>| {
                if is_placeholder_caption(&cap[1]) {
                    String::new()
                } else {
                    cap[0].to_owned()
                }
            });

            if classes.split_whitespace().any(|c| c == QUOTE_ACCENT_CLASS) {
                return format!("<blockquote{attrs}>{body}</blockquote>");
            }

            let others = STYLE_ATTR_RE.replace_all(&CLASS_ATTR_RE.replace(&attrs, ""), "").into_owned();
            format!(
                r#"<blockquote class="{classes} {QUOTE_ACCENT_CLASS}" style="{QUOTE_ACCENT_STYLE}"{others}>{QUOTE_DECORATION}{body}</blockquote>"#
            )
        })
        .into_owned()
}

/// Remove editor attributes from every tag, leaving text content alone.
fn strip_editor_attrs(html: &str) -> String {
    TAG_RE
        .replace_all(html, |tag: &Captures<'_>| {
            EDITOR_ATTR_RE.replace_all(&tag[0], "").into_owned()
        })
        .into_owned()
}

fn is_placeholder_caption(inner: &str) -> bool {
    let text = TAG_RE.replace_all(inner, "");
    let text = text.replace("&nbsp;", " ");
    let text = text.trim();
    text.is_empty() || text == CAPTION_PLACEHOLDER
}
