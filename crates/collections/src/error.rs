//! Error model for collection operations.

use thiserror::Error;

/// Result type used across the collection utilities.
pub type CollectionResult<T> = Result<T, CollectionError>;

/// Collection-level error.
///
/// These are deterministic structural failures (duplicate keys, out-of-range
/// moves, malformed diffs). They are surfaced immediately and never recovered
/// internally.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CollectionError {
    /// A key appeared more than once where uniqueness is required.
    ///
    /// The payload is a preformatted description, e.g. `key 'a' in settings`.
    #[error("duplicate {0}")]
    DuplicateKey(String),

    /// The item index handed to `move_index` does not address an element.
    #[error("item index {index} out of range (len {len})")]
    ItemIndexOutOfRange { index: usize, len: usize },

    /// The insert position handed to `move_index` is past the end.
    #[error("insert index {index} out of range (len {len})")]
    InsertIndexOutOfRange { index: usize, len: usize },

    /// A diff must carry a before, an after, or both.
    #[error("must have either a before or an after")]
    EmptyDiff,

    /// A diff's before and after describe different entities.
    #[error("before and after name must match ('{before}' vs '{after}')")]
    DiffNameMismatch { before: String, after: String },
}

impl CollectionError {
    /// Build a `DuplicateKey` error from the key plus optional context labels.
    pub fn duplicate_key(what: Option<&str>, key: &str, place: Option<&str>) -> Self {
        let mut msg = String::new();
        if let Some(what) = what {
            msg.push_str(what);
            msg.push(' ');
        }
        msg.push('\'');
        msg.push_str(key);
        msg.push('\'');
        if let Some(place) = place {
            msg.push_str(" in ");
            msg.push_str(place);
        }
        Self::DuplicateKey(msg)
    }
}
