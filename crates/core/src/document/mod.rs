//! Block document model for case-study bodies.
//!
//! Case studies are authored in a block editor that saves
//! `{"time": .., "version": .., "blocks": [{"id", "type", "data"}]}`. This
//! module parses that format into typed blocks, serializes it back, and
//! renders it to HTML (see [`render`] and [`postprocess`]).
//!
//! Two parsers are provided:
//!
//! - [`BlockDocument::parse`] is strict and used on the write path. Anything
//!   that is not a well-formed document is rejected.
//! - [`BlockDocument::parse_lenient`] never fails and is used on the read
//!   path, so one bad row cannot take a page down.

pub mod postprocess;
pub mod render;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use postprocess::{normalize_quotes, rewrite_markdown_links};
pub use render::{render_blocks, render_html};

/// Errors produced while parsing a block document.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// The input is not valid JSON.
    #[error("content is not valid JSON: {0}")]
    InvalidJson(String),
    /// The input is JSON but not an object with a `blocks` array.
    #[error("content must be an object with a `blocks` array")]
    MissingBlocks,
    /// A single block could not be read.
    #[error("block {index} ({kind}) is invalid: {reason}")]
    InvalidBlock {
        /// Position of the block in the document.
        index: usize,
        /// The block's `type` field, or `?` when absent.
        kind: String,
        /// What was wrong with it.
        reason: String,
    },
}

/// A parsed block document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockDocument {
    /// Save timestamp (milliseconds) written by the editor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<i64>,
    /// Editor version that produced the document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub blocks: Vec<Block>,
}

/// One block: an optional editor-assigned id plus typed content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBlock", into = "RawBlock")]
pub struct Block {
    pub id: Option<String>,
    pub content: BlockContent,
}

/// Typed block payloads.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockContent {
    Paragraph(Paragraph),
    Header(Header),
    List(List),
    Quote(Quote),
    Code(Code),
    Delimiter,
    Image(Image),
    Link(Link),
    /// A block type this crate does not know. Kept verbatim so saving a
    /// document never loses content; the renderer skips it.
    Other { kind: String, data: Value },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    pub text: String,
    #[serde(default = "default_header_level")]
    pub level: u8,
}

const fn default_header_level() -> u8 {
    2
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListStyle {
    Ordered,
    #[default]
    Unordered,
    Checklist,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct List {
    #[serde(default)]
    pub style: ListStyle,
    /// Editor settings such as the ordered-list start or counter type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
    pub items: Vec<ListItem>,
}

/// A list entry. Older editor versions save plain strings, newer ones save
/// `{content, meta, items}` objects so lists can nest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListItem {
    Text(String),
    Nested {
        content: String,
        /// Per-item state; checklist items keep `{"checked": bool}` here.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        meta: Option<Value>,
        #[serde(default)]
        items: Vec<ListItem>,
    },
}

impl ListItem {
    /// The item's own inline HTML.
    #[must_use]
    pub fn content(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::Nested { content, .. } => content,
        }
    }

    /// Whether a checklist item is ticked.
    #[must_use]
    pub fn is_checked(&self) -> bool {
        match self {
            Self::Text(_) => false,
            Self::Nested { meta, .. } => meta
                .as_ref()
                .and_then(|m| m.get("checked"))
                .and_then(Value::as_bool)
                .unwrap_or(false),
        }
    }

    /// Child items, empty for plain strings.
    #[must_use]
    pub fn children(&self) -> &[Self] {
        match self {
            Self::Text(_) => &[],
            Self::Nested { items, .. } => items,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
}

impl Alignment {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub text: String,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub alignment: Alignment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Code {
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub file: ImageFile,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub with_border: bool,
    #[serde(default)]
    pub stretched: bool,
    #[serde(default)]
    pub with_background: bool,
}

/// Image location plus optional dimensions. The bytes live on the image host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageFile {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub link: String,
    #[serde(default)]
    pub meta: LinkMeta,
}

/// Preview metadata fetched for a link block.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LinkMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<LinkImage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkImage {
    pub url: String,
}

/// Wire shape of a block, before the payload is typed.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Value,
}

/// The type name links are saved under; `link` is accepted on input too.
const LINK_TYPE: &str = "linkTool";

fn typed<T: serde::de::DeserializeOwned>(data: Value) -> Result<T, String> {
    serde_json::from_value(data).map_err(|e| e.to_string())
}

impl TryFrom<RawBlock> for Block {
    type Error = String;

    fn try_from(raw: RawBlock) -> Result<Self, Self::Error> {
        let content = match raw.kind.as_str() {
            "paragraph" => BlockContent::Paragraph(typed(raw.data)?),
            "header" => {
                let header: Header = typed(raw.data)?;
                if !(1..=6).contains(&header.level) {
                    return Err(format!("header level {} is out of range", header.level));
                }
                BlockContent::Header(header)
            }
            "list" => BlockContent::List(typed(raw.data)?),
            "quote" => BlockContent::Quote(typed(raw.data)?),
            "code" => BlockContent::Code(typed(raw.data)?),
            "delimiter" => BlockContent::Delimiter,
            "image" => BlockContent::Image(typed(raw.data)?),
            "link" | LINK_TYPE => BlockContent::Link(typed(raw.data)?),
            _ => BlockContent::Other {
                kind: raw.kind,
                data: raw.data,
            },
        };

        Ok(Self {
            id: raw.id,
            content,
        })
    }
}

fn untyped<T: Serialize>(data: &T) -> Value {
    // Plain data structs with string keys always serialize.
    serde_json::to_value(data).unwrap_or(Value::Null)
}

impl From<Block> for RawBlock {
    fn from(block: Block) -> Self {
        let (kind, data) = match block.content {
            BlockContent::Paragraph(p) => ("paragraph".to_owned(), untyped(&p)),
            BlockContent::Header(h) => ("header".to_owned(), untyped(&h)),
            BlockContent::List(l) => ("list".to_owned(), untyped(&l)),
            BlockContent::Quote(q) => ("quote".to_owned(), untyped(&q)),
            BlockContent::Code(c) => ("code".to_owned(), untyped(&c)),
            BlockContent::Delimiter => ("delimiter".to_owned(), Value::Object(serde_json::Map::new())),
            BlockContent::Image(i) => ("image".to_owned(), untyped(&i)),
            BlockContent::Link(l) => (LINK_TYPE.to_owned(), untyped(&l)),
            BlockContent::Other { kind, data } => (kind, data),
        };

        Self {
            id: block.id,
            kind,
            data,
        }
    }
}

impl BlockDocument {
    /// A document with no blocks.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            time: None,
            version: None,
            blocks: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Strictly parse a serialized document.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not JSON, has no `blocks` array, or
    /// any block is malformed.
    pub fn parse(raw: &str) -> Result<Self, DocumentError> {
        let value: Value =
            serde_json::from_str(raw).map_err(|e| DocumentError::InvalidJson(e.to_string()))?;
        Self::from_value(value)
    }

    /// Strictly convert an already-decoded JSON value.
    ///
    /// # Errors
    ///
    /// Same as [`BlockDocument::parse`].
    pub fn from_value(value: Value) -> Result<Self, DocumentError> {
        let (time, version, blocks) = split_document(value)?;

        let blocks = blocks
            .into_iter()
            .enumerate()
            .map(|(index, block)| parse_block(index, block))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            time,
            version,
            blocks,
        })
    }

    /// Parse without failing.
    ///
    /// Invalid JSON or a missing `blocks` array yields an empty document;
    /// malformed blocks are dropped. Every problem encountered is returned
    /// alongside the document so the caller can log it.
    #[must_use]
    pub fn parse_lenient(raw: &str) -> (Self, Vec<DocumentError>) {
        let value = match serde_json::from_str::<Value>(raw) {
            Ok(value) => value,
            Err(e) => return (Self::empty(), vec![DocumentError::InvalidJson(e.to_string())]),
        };

        let (time, version, raw_blocks) = match split_document(value) {
            Ok(parts) => parts,
            Err(e) => return (Self::empty(), vec![e]),
        };

        let mut problems = Vec::new();
        let blocks = raw_blocks
            .into_iter()
            .enumerate()
            .filter_map(|(index, block)| {
                parse_block(index, block)
                    .map_err(|e| problems.push(e))
                    .ok()
            })
            .collect();

        (
            Self {
                time,
                version,
                blocks,
            },
            problems,
        )
    }

    /// Interpret content submitted through the admin API.
    ///
    /// Accepts either a JSON document or a string holding one. A missing
    /// value, `null`, an empty string or the literal `"undefined"` (what the
    /// editor sends before anything is typed) all mean "no content" and
    /// produce [`BlockDocument::empty`].
    ///
    /// # Errors
    ///
    /// Returns an error when content is present but is not a valid document.
    pub fn from_input(input: Option<Value>) -> Result<Self, DocumentError> {
        match input {
            None | Some(Value::Null) => Ok(Self::empty()),
            Some(Value::String(s)) => {
                let trimmed = s.trim();
                if trimmed.is_empty() || trimmed == "undefined" {
                    Ok(Self::empty())
                } else {
                    Self::parse(trimmed)
                }
            }
            Some(value) => Self::from_value(value),
        }
    }

    /// Serialize to the canonical stored form.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| String::from(r#"{"blocks":[]}"#))
    }

    /// Render to HTML with both post-processing passes applied.
    #[must_use]
    pub fn to_html(&self) -> String {
        render_html(self)
    }
}

impl Default for BlockDocument {
    fn default() -> Self {
        Self::empty()
    }
}

fn split_document(value: Value) -> Result<(Option<i64>, Option<String>, Vec<Value>), DocumentError> {
    let Value::Object(mut map) = value else {
        return Err(DocumentError::MissingBlocks);
    };

    let Some(Value::Array(blocks)) = map.remove("blocks") else {
        return Err(DocumentError::MissingBlocks);
    };

    let time = map.get("time").and_then(Value::as_i64);
    let version = map
        .get("version")
        .and_then(Value::as_str)
        .map(str::to_owned);

    Ok((time, version, blocks))
}

fn parse_block(index: usize, value: Value) -> Result<Block, DocumentError> {
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or("?")
        .to_owned();

    serde_json::from_value(value).map_err(|e| DocumentError::InvalidBlock {
        index,
        kind,
        reason: e.to_string(),
    })
}
