//! Reorder validation for manually ordered collections.
//!
//! A reorder request carries the full list of ids in their new display order.
//! It is only accepted when it is an exact permutation of the ids currently
//! stored: no duplicates, nothing missing, nothing foreign.

use std::collections::HashSet;
use std::hash::Hash;

/// Why a requested ordering was rejected.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    /// The same id appears more than once.
    #[error("id {0} appears more than once")]
    Duplicate(String),
    /// An id does not belong to the collection.
    #[error("id {0} is not part of this collection")]
    Unknown(String),
    /// Some stored ids were left out.
    #[error("{missing} item(s) missing from the new order")]
    Missing {
        /// How many stored ids were not mentioned.
        missing: usize,
    },
}

/// Check that `requested` is a permutation of `existing`.
///
/// # Errors
///
/// Returns the first problem found: a duplicate, a foreign id, or the count
/// of stored ids the request left out.
pub fn validate_permutation<T>(existing: &[T], requested: &[T]) -> Result<(), OrderError>
where
    T: Eq + Hash + ToString,
{
    let stored: HashSet<&T> = existing.iter().collect();
    let mut seen: HashSet<&T> = HashSet::with_capacity(requested.len());

    for id in requested {
        if !seen.insert(id) {
            return Err(OrderError::Duplicate(id.to_string()));
        }
        if !stored.contains(id) {
            return Err(OrderError::Unknown(id.to_string()));
        }
    }

    let missing = stored.len() - seen.len();
    if missing > 0 {
        return Err(OrderError::Missing { missing });
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::EducationId;

    fn ids(raw: &[i32]) -> Vec<EducationId> {
        raw.iter().copied().map(EducationId::new).collect()
    }

    #[test]
    fn test_accepts_any_permutation() {
        let existing = ids(&[1, 2, 3]);
        for order in [[1, 2, 3], [3, 2, 1], [2, 3, 1], [1, 3, 2]] {
            assert!(validate_permutation(&existing, &ids(&order)).is_ok());
        }
    }

    #[test]
    fn test_accepts_empty_collection() {
        assert!(validate_permutation::<EducationId>(&[], &[]).is_ok());
    }

    #[test]
    fn test_rejects_duplicate() {
        let err = validate_permutation(&ids(&[1, 2]), &ids(&[1, 1])).unwrap_err();
        assert_eq!(err, OrderError::Duplicate("1".into()));
    }

    #[test]
    fn test_rejects_foreign_id() {
        let err = validate_permutation(&ids(&[1, 2]), &ids(&[1, 2, 99])).unwrap_err();
        assert_eq!(err, OrderError::Unknown("99".into()));
    }

    #[test]
    fn test_rejects_partial_set() {
        let err = validate_permutation(&ids(&[1, 2, 3]), &ids(&[3, 1])).unwrap_err();
        assert_eq!(err, OrderError::Missing { missing: 1 });
    }
}
