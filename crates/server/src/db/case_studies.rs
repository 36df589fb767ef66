//! Case study repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use folio_core::{BlockDocument, CaseStudyId, Slug, WebUrl};

use super::{RepositoryError, conflict_on_unique};
use crate::models::{CaseStudy, CaseStudyInput};

#[derive(Debug, sqlx::FromRow)]
struct CaseStudyRow {
    id: i32,
    title: String,
    slug: String,
    description: String,
    content: String,
    featured_image: Option<String>,
    tags: Vec<String>,
    is_published: bool,
    is_featured: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CaseStudyRow> for CaseStudy {
    type Error = RepositoryError;

    fn try_from(row: CaseStudyRow) -> Result<Self, Self::Error> {
        let slug = Slug::parse(&row.slug).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid slug in database: {e}"))
        })?;

        // A damaged body should not take the page down; log and serve what parses.
        let (content, problems) = BlockDocument::parse_lenient(&row.content);
        for problem in &problems {
            tracing::warn!(case_study_id = row.id, error = %problem, "Unreadable case study content");
        }

        Ok(Self {
            id: CaseStudyId::new(row.id),
            title: row.title,
            slug,
            description: row.description,
            content,
            featured_image: row.featured_image,
            tags: row.tags,
            is_published: row.is_published,
            is_featured: row.is_featured,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const COLUMNS: &str = "id, title, slug, description, content, featured_image, tags, \
                       is_published, is_featured, created_at, updated_at";

const SLUG_TAKEN: &str = "a case study with this slug already exists";

/// Repository for case studies.
pub struct CaseStudyRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CaseStudyRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Every case study, newest first (admin view).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<CaseStudy>, RepositoryError> {
        let rows = sqlx::query_as::<_, CaseStudyRow>(&format!(
            "SELECT {COLUMNS} FROM case_studies ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Published case studies, featured first then newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_published(
        &self,
        featured_only: bool,
    ) -> Result<Vec<CaseStudy>, RepositoryError> {
        let rows = sqlx::query_as::<_, CaseStudyRow>(&format!(
            "SELECT {COLUMNS} FROM case_studies
             WHERE is_published AND (NOT $1 OR is_featured)
             ORDER BY is_featured DESC, created_at DESC, id DESC"
        ))
        .bind(featured_only)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no case study has this id.
    pub async fn get(&self, id: CaseStudyId) -> Result<CaseStudy, RepositoryError> {
        let row = sqlx::query_as::<_, CaseStudyRow>(&format!(
            "SELECT {COLUMNS} FROM case_studies WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// A published case study by slug. Unpublished and missing are the same.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no published case study has this slug.
    pub async fn get_published_by_slug(&self, slug: &str) -> Result<CaseStudy, RepositoryError> {
        let row = sqlx::query_as::<_, CaseStudyRow>(&format!(
            "SELECT {COLUMNS} FROM case_studies WHERE slug = $1 AND is_published"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken.
    pub async fn create(&self, input: &CaseStudyInput) -> Result<CaseStudy, RepositoryError> {
        let row = sqlx::query_as::<_, CaseStudyRow>(&format!(
            "INSERT INTO case_studies (title, slug, description, content, featured_image, tags,
                 is_published, is_featured)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        ))
        .bind(&input.title)
        .bind(input.slug.as_str())
        .bind(&input.description)
        .bind(input.content.to_json())
        .bind(input.featured_image.as_ref().map(WebUrl::as_str))
        .bind(&input.tags)
        .bind(input.is_published)
        .bind(input.is_featured)
        .fetch_one(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, SLUG_TAKEN))?;

        let study = CaseStudy::try_from(row)?;
        tracing::info!(id = %study.id, slug = %study.slug, "Case study created");
        Ok(study)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no case study has this id and
    /// `RepositoryError::Conflict` if the new slug belongs to another one.
    pub async fn update(
        &self,
        id: CaseStudyId,
        input: &CaseStudyInput,
    ) -> Result<CaseStudy, RepositoryError> {
        let row = sqlx::query_as::<_, CaseStudyRow>(&format!(
            "UPDATE case_studies SET
                 title = $2, slug = $3, description = $4, content = $5, featured_image = $6,
                 tags = $7, is_published = $8, is_featured = $9, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(&input.title)
        .bind(input.slug.as_str())
        .bind(&input.description)
        .bind(input.content.to_json())
        .bind(input.featured_image.as_ref().map(WebUrl::as_str))
        .bind(&input.tags)
        .bind(input.is_published)
        .bind(input.is_featured)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, SLUG_TAKEN))?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no case study has this id.
    pub async fn delete(&self, id: CaseStudyId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM case_studies WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        tracing::info!(id = %id, "Case study deleted");
        Ok(())
    }
}
