//! Error types for the SDS client
//!
//! Every remote operation returns [`ClientError`]. Callers are not expected
//! to recover from most of these; the migration workflow lets them
//! propagate to its top-level boundary.

use std::fmt;

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// The kind of SDS resource an operation addressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// An SDS type
    Type,
    /// An SDS stream
    Stream,
    /// An SDS stream view
    StreamView,
}

impl ResourceKind {
    /// Collection segment used in the REST path
    #[inline]
    #[must_use]
    pub fn collection(self) -> &'static str {
        match self {
            Self::Type => "Types",
            Self::Stream => "Streams",
            Self::StreamView => "StreamViews",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type => f.write_str("type"),
            Self::Stream => f.write_str("stream"),
            Self::StreamView => f.write_str("stream view"),
        }
    }
}

/// Errors returned by an [`SdsClient`](crate::SdsClient)
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Network or protocol failure below the HTTP status level
    #[error("http transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Token acquisition failed
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Service answered with an unexpected status
    #[error("{operation} failed with status {status}: {message}")]
    Status {
        /// Operation that was attempted
        operation: String,
        /// HTTP status code
        status: u16,
        /// Response body, if any
        message: String,
    },

    /// Addressed resource does not exist
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Resource kind
        kind: ResourceKind,
        /// Resource id
        id: String,
    },

    /// A resource with the same id but a different definition exists
    #[error("{kind} {id} already exists with a different definition")]
    Conflict {
        /// Resource kind
        kind: ResourceKind,
        /// Resource id
        id: String,
    },

    /// Request rejected before or by the service as invalid
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Response body could not be decoded
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Resource URL could not be built
    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    /// Create a not-found error
    pub fn not_found(kind: ResourceKind, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Create a conflict error
    pub fn conflict(kind: ResourceKind, id: impl Into<String>) -> Self {
        Self::Conflict {
            kind,
            id: id.into(),
        }
    }

    /// Check if the error means the resource is absent
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_resource() {
        let err = ClientError::not_found(ResourceKind::StreamView, "OpcUa_Double_quality");
        assert_eq!(err.to_string(), "stream view not found: OpcUa_Double_quality");
        assert!(err.is_not_found());
    }

    #[test]
    fn collection_segments() {
        assert_eq!(ResourceKind::Type.collection(), "Types");
        assert_eq!(ResourceKind::Stream.collection(), "Streams");
        assert_eq!(ResourceKind::StreamView.collection(), "StreamViews");
    }
}
