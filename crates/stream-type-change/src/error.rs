//! Error types for the stream type change workflow
//!
//! Provides error handling for:
//! - Configuration loading and validation
//! - Upgraded type identifier parsing
//! - Remote operations (wrapped [`ClientError`])
//! - Console prompts
//! - Aborted stream conversions

use sds_client::ClientError;
use std::path::PathBuf;

/// Main workflow error type
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Remote operation failed
    #[error("remote operation failed: {0}")]
    Client(#[from] ClientError),

    /// Upgraded type id did not have the expected shape
    #[error(transparent)]
    TypeId(#[from] TypeIdError),

    /// Reading a response from the operator failed
    #[error("prompt failed: {0}")]
    Prompt(#[from] std::io::Error),

    /// A stream conversion failed; earlier conversions stay applied
    #[error(
        "conversion of stream {stream_id} failed after converting {converted} and skipping {skipped} streams"
    )]
    Aborted {
        /// Stream whose update failed
        stream_id: String,
        /// Streams converted before the failure
        converted: usize,
        /// Streams skipped before the failure
        skipped: usize,
        /// Underlying remote error
        #[source]
        source: ClientError,
    },
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("could not open/read {path}: {source}")]
    Read {
        /// File path
        path: PathBuf,
        /// IO error
        #[source]
        source: std::io::Error,
    },

    /// File is not valid JSON of the expected shape
    #[error("could not parse {path}: {source}")]
    Parse {
        /// File path
        path: PathBuf,
        /// JSON error
        #[source]
        source: serde_json::Error,
    },

    /// A required key is absent or blank
    #[error("required setting '{0}' is missing")]
    MissingField(&'static str),

    /// A key has an unusable value
    #[error("setting '{field}' is invalid: {message}")]
    InvalidValue {
        /// Setting name
        field: &'static str,
        /// What is wrong with it
        message: String,
    },
}

impl ConfigError {
    /// Create read error for path
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Create parse error for path
    pub fn parse(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }
}

/// Upgraded type identifier errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeIdError {
    /// Id is not `TimeIndexed.<DataType>.<Adapter>Quality`
    #[error("malformed type identifier '{id}': {reason}")]
    Malformed {
        /// Offending id
        id: String,
        /// What did not match
        reason: String,
    },
}

impl TypeIdError {
    /// Create a malformed-id error
    pub fn malformed(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            id: id.into(),
            reason: reason.into(),
        }
    }
}
