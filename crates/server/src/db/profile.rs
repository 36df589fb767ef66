//! Profile repository. The profile is a single row with `id = 1`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::RepositoryError;
use crate::models::{Profile, ProfileUpdate};

#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    name: String,
    brief_intro: String,
    tools_order: Vec<String>,
    industries_order: Vec<String>,
    education_categories: Vec<String>,
    updated_at: DateTime<Utc>,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Self {
            name: row.name,
            brief_intro: row.brief_intro,
            tools_order: row.tools_order,
            industries_order: row.industries_order,
            education_categories: row.education_categories,
            updated_at: row.updated_at,
        }
    }
}

const COLUMNS: &str =
    "name, brief_intro, tools_order, industries_order, education_categories, updated_at";

/// Repository for the singleton profile.
pub struct ProfileRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProfileRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create the profile row if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn ensure_exists(&self) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO profile (id) VALUES (1) ON CONFLICT (id) DO NOTHING")
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Fetch the profile.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the row was never created.
    pub async fn get(&self) -> Result<Profile, RepositoryError> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {COLUMNS} FROM profile WHERE id = 1"
        ))
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Apply a partial update, creating the row if needed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update(&self, update: &ProfileUpdate) -> Result<Profile, RepositoryError> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            "INSERT INTO profile (id, name, brief_intro, tools_order, industries_order, education_categories)
             VALUES (1, COALESCE($1, ''), COALESCE($2, ''), COALESCE($3, '{{}}'), COALESCE($4, '{{}}'), COALESCE($5, '{{}}'))
             ON CONFLICT (id) DO UPDATE SET
                 name = COALESCE($1, profile.name),
                 brief_intro = COALESCE($2, profile.brief_intro),
                 tools_order = COALESCE($3, profile.tools_order),
                 industries_order = COALESCE($4, profile.industries_order),
                 education_categories = COALESCE($5, profile.education_categories),
                 updated_at = NOW()
             RETURNING {COLUMNS}"
        ))
        .bind(update.name.as_deref())
        .bind(update.brief_intro.as_deref())
        .bind(update.tools_order.as_deref())
        .bind(update.industries_order.as_deref())
        .bind(update.education_categories.as_deref())
        .fetch_one(self.pool)
        .await?;

        tracing::info!("Profile updated");
        Ok(row.into())
    }
}
