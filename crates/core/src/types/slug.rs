//! URL slug type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Slug`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SlugError {
    /// The input string is empty.
    #[error("slug cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("slug must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character outside `a-z`, `0-9` and `-`.
    #[error("slug may only contain lowercase letters, digits and hyphens")]
    InvalidCharacter,
    /// The input starts or ends with a hyphen, or contains `--`.
    #[error("slug cannot start or end with a hyphen or contain repeated hyphens")]
    MisplacedHyphen,
}

/// A URL-safe identifier for a case study, e.g. `pricing-engine-rewrite`.
///
/// ## Constraints
///
/// - Length: 1-200 characters
/// - Only lowercase ASCII letters, digits and single hyphens
/// - No leading or trailing hyphen
///
/// ```
/// use folio_core::Slug;
///
/// assert!(Slug::parse("pricing-engine").is_ok());
/// assert!(Slug::parse("Pricing Engine").is_err());
/// assert_eq!(folio_core::slugify("Hello, World!").unwrap().as_str(), "hello-world");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    /// Maximum slug length.
    pub const MAX_LENGTH: usize = 200;

    /// Parse a `Slug` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, too long, contains characters
    /// other than `a-z`, `0-9` and `-`, or has a misplaced hyphen.
    pub fn parse(s: &str) -> Result<Self, SlugError> {
        if s.is_empty() {
            return Err(SlugError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(SlugError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if !s
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
        {
            return Err(SlugError::InvalidCharacter);
        }

        if s.starts_with('-') || s.ends_with('-') || s.contains("--") {
            return Err(SlugError::MisplacedHyphen);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the slug as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Slug` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Derive a slug from a free-form title.
///
/// Lowercases the input, drops anything that is not an ASCII letter, digit,
/// whitespace or hyphen, turns whitespace runs into hyphens and collapses
/// repeated hyphens. Returns `None` when nothing usable is left.
#[must_use]
pub fn slugify(title: &str) -> Option<Slug> {
    let mut out = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for c in title.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !out.is_empty() {
                out.push('-');
            }
            pending_hyphen = false;
            out.push(c);
        } else if c == '-' || c.is_whitespace() {
            pending_hyphen = true;
        }
    }

    out.truncate(Slug::MAX_LENGTH);
    while out.ends_with('-') {
        out.pop();
    }

    Slug::parse(&out).ok()
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Slug {
    type Err = SlugError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Slug {
    type Error = SlugError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Slug> for String {
    fn from(slug: Slug) -> Self {
        slug.0
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
