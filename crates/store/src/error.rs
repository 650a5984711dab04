//! Store error types.

use thiserror::Error;

/// Errors surfaced by [`DocumentStore`](crate::DocumentStore) operations.
#[derive(Debug, Error, Clone)]
pub enum StoreError {
    /// The addressed document does not exist.
    #[error("document {collection}/{id} not found")]
    NotFound {
        /// Collection name.
        collection: String,
        /// Document id.
        id: String,
    },

    /// The caller is not allowed to read or write the addressed data.
    #[error("permission denied on {0}")]
    PermissionDenied(String),

    /// The backend reported a failure (network, quota, internal).
    #[error("store backend error: {0}")]
    Backend(String),
}
