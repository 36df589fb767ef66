//! Case studies.

use chrono::{DateTime, Utc};
use serde::Serialize;

use folio_core::{BlockDocument, CaseStudyId, Slug, WebUrl};

/// A case study with its full block document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseStudy {
    pub id: CaseStudyId,
    pub title: String,
    pub slug: Slug,
    pub description: String,
    pub content: BlockDocument,
    pub featured_image: Option<String>,
    pub tags: Vec<String>,
    pub is_published: bool,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing shape for the public index: everything but the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseStudySummary {
    pub id: CaseStudyId,
    pub title: String,
    pub slug: Slug,
    pub description: String,
    pub featured_image: Option<String>,
    pub tags: Vec<String>,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
}

impl From<CaseStudy> for CaseStudySummary {
    fn from(study: CaseStudy) -> Self {
        Self {
            id: study.id,
            title: study.title,
            slug: study.slug,
            description: study.description,
            featured_image: study.featured_image,
            tags: study.tags,
            is_featured: study.is_featured,
            created_at: study.created_at,
        }
    }
}

/// Validated input for creating or replacing a case study.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseStudyInput {
    pub title: String,
    pub slug: Slug,
    pub description: String,
    pub content: BlockDocument,
    pub featured_image: Option<WebUrl>,
    /// De-duplicated, first occurrence wins.
    pub tags: Vec<String>,
    pub is_published: bool,
    pub is_featured: bool,
}
