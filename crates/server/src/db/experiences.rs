//! Experience repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;

use folio_core::ExperienceId;

use super::ordering::{self, OrderedCollection, next_position_sql};
use super::RepositoryError;
use crate::models::{Experience, ExperienceInput, ToolUsage};

#[derive(Debug, sqlx::FromRow)]
struct ExperienceRow {
    id: i32,
    job_title: String,
    company: String,
    industry: String,
    start_date: String,
    end_date: Option<String>,
    is_current_job: bool,
    description: String,
    accomplishments: String,
    tools: Json<Vec<ToolUsage>>,
    sort_order: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ExperienceRow> for Experience {
    fn from(row: ExperienceRow) -> Self {
        Self {
            id: ExperienceId::new(row.id),
            job_title: row.job_title,
            company: row.company,
            industry: row.industry,
            start_date: row.start_date,
            end_date: row.end_date,
            is_current_job: row.is_current_job,
            description: row.description,
            accomplishments: row.accomplishments,
            tools: row.tools.0,
            sort_order: row.sort_order,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const COLUMNS: &str = "id, job_title, company, industry, start_date, end_date, is_current_job, \
                       description, accomplishments, tools, sort_order, created_at, updated_at";

/// Repository for work experience entries.
pub struct ExperienceRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ExperienceRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All experiences in display order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Experience>, RepositoryError> {
        let rows = sqlx::query_as::<_, ExperienceRow>(&format!(
            "SELECT {COLUMNS} FROM experiences ORDER BY sort_order ASC, id ASC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no experience has this id.
    pub async fn get(&self, id: ExperienceId) -> Result<Experience, RepositoryError> {
        let row = sqlx::query_as::<_, ExperienceRow>(&format!(
            "SELECT {COLUMNS} FROM experiences WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Insert an experience. Without an explicit position it goes last.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, input: &ExperienceInput) -> Result<Experience, RepositoryError> {
        let next = next_position_sql(OrderedCollection::Experiences);
        let row = sqlx::query_as::<_, ExperienceRow>(&format!(
            "INSERT INTO experiences (job_title, company, industry, start_date, end_date,
                 is_current_job, description, accomplishments, tools, sort_order)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, COALESCE($10, {next}))
             RETURNING {COLUMNS}"
        ))
        .bind(&input.job_title)
        .bind(&input.company)
        .bind(&input.industry)
        .bind(&input.start_date)
        .bind(input.end_date.as_deref())
        .bind(input.is_current_job)
        .bind(&input.description)
        .bind(&input.accomplishments)
        .bind(Json(&input.tools))
        .bind(input.sort_order)
        .fetch_one(self.pool)
        .await?;

        let experience = Experience::from(row);
        tracing::info!(id = %experience.id, "Experience created");
        Ok(experience)
    }

    /// Replace an experience. A `None` position keeps the current one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no experience has this id.
    pub async fn update(
        &self,
        id: ExperienceId,
        input: &ExperienceInput,
    ) -> Result<Experience, RepositoryError> {
        let row = sqlx::query_as::<_, ExperienceRow>(&format!(
            "UPDATE experiences SET
                 job_title = $2, company = $3, industry = $4, start_date = $5, end_date = $6,
                 is_current_job = $7, description = $8, accomplishments = $9, tools = $10,
                 sort_order = COALESCE($11, sort_order), updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(&input.job_title)
        .bind(&input.company)
        .bind(&input.industry)
        .bind(&input.start_date)
        .bind(input.end_date.as_deref())
        .bind(input.is_current_job)
        .bind(&input.description)
        .bind(&input.accomplishments)
        .bind(Json(&input.tools))
        .bind(input.sort_order)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no experience has this id.
    pub async fn delete(&self, id: ExperienceId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM experiences WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        tracing::info!(id = %id, "Experience deleted");
        Ok(())
    }

    /// Replace the display order with `ids` (a permutation of all ids).
    ///
    /// # Errors
    ///
    /// See [`ordering::reorder`].
    pub async fn reorder(&self, ids: &[ExperienceId]) -> Result<(), RepositoryError> {
        let ids: Vec<i32> = ids.iter().map(ExperienceId::as_i32).collect();
        ordering::reorder(self.pool, OrderedCollection::Experiences, &ids).await
    }
}
