//! HTML rendering for block documents.
//!
//! Markup mirrors the class names the block editor uses in its own output
//! (`ce-paragraph`, `cdx-quote`, `image-tool`, ...) so the same stylesheet
//! serves the editor preview and the public page.
//!
//! Rich-text fields (paragraph, header, list, quote and caption text) hold
//! inline HTML written by the admin and are emitted as-is. Code, URLs and
//! link-preview metadata (which comes from third-party pages) are escaped.

use maud::{Markup, PreEscaped, html};

use super::postprocess::{normalize_quotes, rewrite_markdown_links};
use super::{BlockContent, BlockDocument, Header, Image, Link, List, ListItem, ListStyle, Quote};

/// Render a document and apply both post-processing passes.
#[must_use]
pub fn render_html(doc: &BlockDocument) -> String {
    let html = render_blocks(doc).into_string();
    normalize_quotes(&rewrite_markdown_links(&html))
}

/// Render a document without post-processing.
#[must_use]
pub fn render_blocks(doc: &BlockDocument) -> Markup {
    html! {
        @for block in &doc.blocks {
            (render_block(&block.content))
        }
    }
}

fn render_block(content: &BlockContent) -> Markup {
    match content {
        BlockContent::Paragraph(p) => html! {
            div.ce-paragraph.cdx-block { (PreEscaped(&p.text)) }
        },
        BlockContent::Header(h) => render_header(h),
        BlockContent::List(list) => render_list(list.style, &list.items),
        BlockContent::Quote(q) => render_quote(q),
        BlockContent::Code(c) => html! {
            div.ce-code.cdx-block {
                pre.ce-code__textarea { code { (c.code) } }
            }
        },
        BlockContent::Delimiter => html! {
            div.ce-delimiter.cdx-block {}
        },
        BlockContent::Image(img) => render_image(img),
        BlockContent::Link(link) => render_link(link),
        BlockContent::Other { .. } => html! {},
    }
}

fn render_header(h: &Header) -> Markup {
    let text = PreEscaped(&h.text);
    match h.level {
        1 => html! { h1.ce-header { (text) } },
        2 => html! { h2.ce-header { (text) } },
        3 => html! { h3.ce-header { (text) } },
        4 => html! { h4.ce-header { (text) } },
        5 => html! { h5.ce-header { (text) } },
        _ => html! { h6.ce-header { (text) } },
    }
}

fn render_list(style: ListStyle, items: &[ListItem]) -> Markup {
    let body = html! {
        @for item in items {
            li.cdx-list__item."cdx-list__item--checked"[style == ListStyle::Checklist && item.is_checked()] {
                @if style == ListStyle::Checklist {
                    span.cdx-list__checkbox aria-hidden="true" {}
                }
                (PreEscaped(item.content()))
                @if !item.children().is_empty() {
                    (render_list(style, item.children()))
                }
            }
        }
    };

    match style {
        ListStyle::Ordered => html! { ol.cdx-list."cdx-list--ordered" { (body) } },
        ListStyle::Unordered => html! { ul.cdx-list."cdx-list--unordered" { (body) } },
        ListStyle::Checklist => html! { ul.cdx-list."cdx-list--checklist" { (body) } },
    }
}

fn render_quote(q: &Quote) -> Markup {
    html! {
        blockquote.cdx-quote.cdx-block data-alignment=(q.alignment.as_str()) {
            div.cdx-quote__text { (PreEscaped(&q.text)) }
            div.cdx-quote__caption { (PreEscaped(&q.caption)) }
        }
    }
}

fn render_image(img: &Image) -> Markup {
    if !is_safe_url(&img.file.url) {
        return html! {};
    }

    html! {
        figure.cdx-block.image-tool
            ."image-tool--withBorder"[img.with_border]
            ."image-tool--stretched"[img.stretched]
            ."image-tool--withBackground"[img.with_background] {
            img.image-tool__image-picture
                src=(img.file.url)
                width=[img.file.width]
                height=[img.file.height]
                loading="lazy"
                alt="";
            @if !img.caption.trim().is_empty() {
                figcaption.image-tool__caption { (PreEscaped(&img.caption)) }
            }
        }
    }
}

fn render_link(link: &Link) -> Markup {
    if !is_safe_url(&link.link) {
        return html! {};
    }

    let anchor = url::Url::parse(&link.link)
        .ok()
        .and_then(|u| u.host_str().map(str::to_owned));
    let image = link
        .meta
        .image
        .as_ref()
        .map(|i| i.url.as_str())
        .filter(|u| is_safe_url(u));

    html! {
        div.link-tool {
            a.link-tool__content href=(link.link) target="_blank" rel="nofollow noindex noreferrer" {
                @if let Some(src) = image {
                    img.link-tool__image src=(src) alt="" loading="lazy";
                }
                @if let Some(title) = &link.meta.title {
                    div.link-tool__title { (title) }
                }
                @if let Some(description) = &link.meta.description {
                    p.link-tool__description { (description) }
                }
                @if let Some(host) = anchor {
                    span.link-tool__anchor { (host) }
                }
            }
        }
    }
}

/// Whether `url` may be used as an `href` or `src`: http(s), mailto, or a
/// same-site relative path.
pub(crate) fn is_safe_url(url: &str) -> bool {
    let url = url.trim();
    if url.is_empty() {
        return false;
    }

    if url.starts_with('/') || url.starts_with('#') {
        return true;
    }

    let Some((scheme, _)) = url.split_once(':') else {
        return false;
    };

    matches!(
        scheme.to_ascii_lowercase().as_str(),
        "http" | "https" | "mailto"
    )
}
