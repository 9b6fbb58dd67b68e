use thiserror::Error;

/// Errors raised while locating elements
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Fingerprint string was empty or contained an invalid segment
    #[error("Malformed fingerprint: {0}")]
    MalformedFingerprint(String),

    /// Path query could not be parsed or evaluated
    #[error("Path query failed at offset {offset}: {reason}")]
    PathQuery { offset: usize, reason: String },

    /// The document does not support path query evaluation
    #[error("Path queries are not supported by this document")]
    PathQueryUnsupported,

    /// Node is not attached to a document
    #[error("Node is detached from its document")]
    DetachedNode,

    /// Node reference does not exist in the tree
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    /// Descriptor values handed over by the capture side are unusable
    #[error("Invalid descriptor: {0}")]
    InvalidDescriptor(String),

    /// JSON (de)serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ResolveError {
    /// Build a path query error at the given offset
    pub fn path_query(offset: usize, reason: impl Into<String>) -> Self {
        ResolveError::PathQuery {
            offset,
            reason: reason.into(),
        }
    }

    /// Whether the error only means "this method found nothing"
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ResolveError::MalformedFingerprint(_)
                | ResolveError::PathQuery { .. }
                | ResolveError::PathQueryUnsupported
                | ResolveError::NodeNotFound(_)
        )
    }
}

/// Result type alias for resolution operations
pub type Result<T> = std::result::Result<T, ResolveError>;
