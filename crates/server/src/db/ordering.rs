//! Manual ordering for experiences and education.
//!
//! Display order is the persisted `sort_order` column, ascending, with the id
//! breaking ties. Values need not be contiguous: only relative order matters.
//!
//! A reorder replaces the whole ordering in one transaction. The collection's
//! rows are locked first, the request is checked to be an exact permutation
//! of the locked ids, and every row gets `sort_order = index`. Two reorders
//! racing each other serialize on the row locks; the last to commit wins.

use sqlx::PgPool;

use folio_core::validate_permutation;

use super::RepositoryError;

/// The collections that support manual ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderedCollection {
    Experiences,
    Education,
}

impl OrderedCollection {
    /// Table backing the collection.
    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Self::Experiences => "experiences",
            Self::Education => "education",
        }
    }
}

/// Apply a full reorder of `collection`.
///
/// # Errors
///
/// Returns `RepositoryError::InvalidOrder` if `ids` is not a permutation of
/// the stored ids, and `RepositoryError::Conflict` if a row could not be
/// updated. Nothing is changed in either case.
pub async fn reorder(
    pool: &PgPool,
    collection: OrderedCollection,
    ids: &[i32],
) -> Result<(), RepositoryError> {
    let table = collection.table();
    let mut tx = pool.begin().await?;

    let existing = sqlx::query_scalar::<_, i32>(&format!(
        "SELECT id FROM {table} ORDER BY id FOR UPDATE"
    ))
    .fetch_all(&mut *tx)
    .await?;

    validate_permutation(&existing, ids)?;

    let result = sqlx::query(&format!(
        "UPDATE {table} AS t
         SET sort_order = (o.ord - 1)::int4
         FROM UNNEST($1::int4[]) WITH ORDINALITY AS o(id, ord)
         WHERE t.id = o.id"
    ))
    .bind(ids)
    .execute(&mut *tx)
    .await?;

    if usize::try_from(result.rows_affected()).ok() != Some(ids.len()) {
        // Dropping the transaction rolls it back.
        return Err(RepositoryError::Conflict(format!(
            "{table} changed during reorder"
        )));
    }

    tx.commit().await?;

    tracing::info!(collection = table, count = ids.len(), "Collection reordered");
    Ok(())
}

/// Position for a new row appended to `collection`.
pub(crate) fn next_position_sql(collection: OrderedCollection) -> String {
    format!(
        "(SELECT COALESCE(MAX(sort_order) + 1, 0) FROM {})",
        collection.table()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables() {
        assert_eq!(OrderedCollection::Experiences.table(), "experiences");
        assert_eq!(OrderedCollection::Education.table(), "education");
    }

    #[test]
    fn test_next_position_sql() {
        assert_eq!(
            next_position_sql(OrderedCollection::Education),
            "(SELECT COALESCE(MAX(sort_order) + 1, 0) FROM education)"
        );
    }
}
