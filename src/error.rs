//! Error taxonomy for the insight store and lifecycle operations.
//!
//! Retrieval never fails on query text; only storage faults surface from the
//! read path. Writes can additionally be rejected with [`InsightError::Validation`],
//! [`InsightError::NotFound`], or [`InsightError::Cycle`], always before any
//! state change.

/// Errors produced by the insight engine.
#[derive(Debug, thiserror::Error)]
pub enum InsightError {
    /// Malformed insight input (empty content, out-of-range score, unknown type).
    #[error("invalid insight: {0}")]
    Validation(String),

    /// A referenced insight id does not exist.
    #[error("insight not found: {0}")]
    NotFound(String),

    /// Linking `old_id` → `new_id` would make an insight its own ancestor.
    #[error("supersession {old_id} -> {new_id} would create a cycle")]
    Cycle { old_id: String, new_id: String },

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// A stored row could not be decoded into an [`crate::insight::types::Insight`].
    #[error("corrupt insight record: {0}")]
    Corrupt(String),
}

pub type Result<T> = std::result::Result<T, InsightError>;
