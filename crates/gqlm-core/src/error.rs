//! Error types for multi-client GraphQL binding generation.
//!
//! This module provides the shared error hierarchy used across all crates
//! in the workspace, with contextual information on every variant.
//!
//! # Examples
//!
//! ```
//! use gqlm_core::{Error, Result};
//!
//! fn check_host(host: &str) -> Result<()> {
//!     if host.is_empty() {
//!         return Err(Error::MissingClientHost {
//!             client: "default".to_string(),
//!         });
//!     }
//!     Ok(())
//! }
//!
//! let err = check_host("").unwrap_err();
//! assert!(err.is_missing_host());
//! ```

use crate::ErrorRecord;
use thiserror::Error;

/// Main error type for the binding generation pipeline and runtime dispatch.
///
/// Generation-time errors (`MissingOperationName`, `MissingClientHost`,
/// `DocumentParse`, `GenerationFailed`) abort the whole generation run;
/// there is no partial generation. Dispatch-time failures are surfaced as
/// [`Error::Dispatch`] carrying the captured error record.
#[derive(Error, Debug)]
pub enum Error {
    /// A document defines an operation without a name.
    ///
    /// Fatal for the generation run: an unnamed operation cannot be
    /// attributed to a client or bound to an exported wrapper.
    #[error("Operation name missing in: {document}")]
    MissingOperationName {
        /// Path of the offending document
        document: String,
    },

    /// A configured client has no resolvable host.
    ///
    /// Raised at configuration-resolution time after environment overrides
    /// have been applied.
    #[error("GraphQL client ({client}) is missing its host")]
    MissingClientHost {
        /// Name of the client missing a host
        client: String,
    },

    /// A client name was referenced that is not configured.
    #[error("Unknown GraphQL client: {client}")]
    UnknownClient {
        /// The unrecognized client name
        client: String,
    },

    /// A document could not be parsed as GraphQL.
    #[error("Failed to parse document {document}: {message}")]
    DocumentParse {
        /// Path of the document that failed to parse
        document: String,
        /// Parser diagnostic
        message: String,
    },

    /// The external SDK generator failed.
    #[error("SDK generation failed: {message}")]
    GenerationFailed {
        /// Description of the generation failure
        message: String,
        /// Optional underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration error.
    ///
    /// Raised when configuration is invalid or contains contradictory
    /// settings.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration problem
        message: String,
    },

    /// Filesystem I/O failure while reading documents.
    #[error("I/O error on {path}")]
    Io {
        /// Path involved in the failed operation
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// An operation name was dispatched that no catalog entry covers.
    #[error("Unknown GraphQL operation: {operation}")]
    UnknownOperation {
        /// The unrecognized operation name
        operation: String,
    },

    /// A dispatched call failed.
    ///
    /// Carries the captured error record; the raw transport error is never
    /// surfaced so callers only ever handle one error shape.
    #[error("GraphQL request failed on client '{}': {}", .0.client, .0.operation_name)]
    Dispatch(ErrorRecord),

    /// Serialization/deserialization error.
    #[error("Serialization error: {message}")]
    SerializationError {
        /// Description of the serialization failure
        message: String,
        /// Underlying serde error
        #[source]
        source: Option<serde_json::Error>,
    },
}

impl Error {
    /// Returns `true` if this is a missing-operation-name error.
    #[must_use]
    pub const fn is_missing_operation_name(&self) -> bool {
        matches!(self, Self::MissingOperationName { .. })
    }

    /// Returns `true` if this is a missing-client-host error.
    #[must_use]
    pub const fn is_missing_host(&self) -> bool {
        matches!(self, Self::MissingClientHost { .. })
    }

    /// Returns `true` if this is an unknown-client error.
    #[must_use]
    pub const fn is_unknown_client(&self) -> bool {
        matches!(self, Self::UnknownClient { .. })
    }

    /// Returns `true` if this is a document parse error.
    #[must_use]
    pub const fn is_parse_error(&self) -> bool {
        matches!(self, Self::DocumentParse { .. })
    }

    /// Returns `true` if this is a generation failure.
    #[must_use]
    pub const fn is_generation_error(&self) -> bool {
        matches!(self, Self::GenerationFailed { .. })
    }

    /// Returns `true` if this is a configuration error.
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(self, Self::ConfigError { .. })
    }

    /// Returns `true` if this is a dispatch failure.
    #[must_use]
    pub const fn is_dispatch_error(&self) -> bool {
        matches!(self, Self::Dispatch(_))
    }

    /// Returns the captured error record for a dispatch failure.
    #[must_use]
    pub const fn dispatch_record(&self) -> Option<&ErrorRecord> {
        match self {
            Self::Dispatch(record) => Some(record),
            _ => None,
        }
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;
