//! Education repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use folio_core::EducationId;

use super::ordering::{self, OrderedCollection, next_position_sql};
use super::RepositoryError;
use crate::models::{Education, EducationInput};

#[derive(Debug, sqlx::FromRow)]
struct EducationRow {
    id: i32,
    name: String,
    category: String,
    link: Option<String>,
    date: Option<String>,
    sort_order: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<EducationRow> for Education {
    fn from(row: EducationRow) -> Self {
        Self {
            id: EducationId::new(row.id),
            name: row.name,
            category: row.category,
            link: row.link,
            date: row.date,
            sort_order: row.sort_order,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const COLUMNS: &str = "id, name, category, link, date, sort_order, created_at, updated_at";

/// Repository for education entries.
pub struct EducationRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> EducationRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All entries in display order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Education>, RepositoryError> {
        let rows = sqlx::query_as::<_, EducationRow>(&format!(
            "SELECT {COLUMNS} FROM education ORDER BY sort_order ASC, id ASC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no entry has this id.
    pub async fn get(&self, id: EducationId) -> Result<Education, RepositoryError> {
        let row = sqlx::query_as::<_, EducationRow>(&format!(
            "SELECT {COLUMNS} FROM education WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Insert an entry. Without an explicit position it goes last.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, input: &EducationInput) -> Result<Education, RepositoryError> {
        let next = next_position_sql(OrderedCollection::Education);
        let row = sqlx::query_as::<_, EducationRow>(&format!(
            "INSERT INTO education (name, category, link, date, sort_order)
             VALUES ($1, $2, $3, $4, COALESCE($5, {next}))
             RETURNING {COLUMNS}"
        ))
        .bind(&input.name)
        .bind(&input.category)
        .bind(input.link.as_ref().map(folio_core::WebUrl::as_str))
        .bind(input.date.as_deref())
        .bind(input.sort_order)
        .fetch_one(self.pool)
        .await?;

        let education = Education::from(row);
        tracing::info!(id = %education.id, "Education created");
        Ok(education)
    }

    /// Replace an entry. A `None` position keeps the current one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no entry has this id.
    pub async fn update(
        &self,
        id: EducationId,
        input: &EducationInput,
    ) -> Result<Education, RepositoryError> {
        let row = sqlx::query_as::<_, EducationRow>(&format!(
            "UPDATE education SET
                 name = $2, category = $3, link = $4, date = $5,
                 sort_order = COALESCE($6, sort_order), updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(&input.name)
        .bind(&input.category)
        .bind(input.link.as_ref().map(folio_core::WebUrl::as_str))
        .bind(input.date.as_deref())
        .bind(input.sort_order)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no entry has this id.
    pub async fn delete(&self, id: EducationId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM education WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        tracing::info!(id = %id, "Education deleted");
        Ok(())
    }

    /// Replace the display order with `ids` (a permutation of all ids).
    ///
    /// # Errors
    ///
    /// See [`ordering::reorder`].
    pub async fn reorder(&self, ids: &[EducationId]) -> Result<(), RepositoryError> {
        let ids: Vec<i32> = ids.iter().map(EducationId::as_i32).collect();
        ordering::reorder(self.pool, OrderedCollection::Education, &ids).await
    }
}
