//! The error record captured when a dispatched call fails.
//!
//! Callers only ever handle this one error shape: transport failures and
//! GraphQL-level errors are both folded into it. The session keeps the
//! most recent record (overwritten by the next failure, never accumulated)
//! so late-registering error handlers can be caught up.

use crate::{ClientName, OperationName};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single GraphQL error entry from a response `errors` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GqlError {
    /// Error message.
    pub message: String,
    /// Response path the error applies to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<Value>>,
    /// Server-defined extensions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
}

/// Captured context for one failed dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// Client the failing call was dispatched to.
    pub client: ClientName,
    /// Operation type (`query`, `mutation`, `subscription`) when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_type: Option<String>,
    /// Name of the failing operation.
    pub operation_name: OperationName,
    /// HTTP status code when the transport produced one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    /// GraphQL-level errors from the response body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gql_errors: Option<Vec<GqlError>>,
}
