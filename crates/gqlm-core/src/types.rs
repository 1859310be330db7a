//! Strong domain types for multi-client GraphQL binding generation.
//!
//! This module implements the newtype pattern to provide type safety for
//! domain primitives.
//!
//! # Type Safety Benefits
//!
//! Using strong types instead of primitives prevents:
//! - Mixing up client names with operation names
//! - Accidental type conversions
//!
//! # Examples
//!
//! ```
//! use gqlm_core::{ClientName, OperationName};
//!
//! // Type-safe identifiers
//! let client = ClientName::new("blog");
//! let operation = OperationName::new("GetPosts");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Client name identifier (newtype over String).
///
/// Identifies one logical GraphQL endpoint registration. Using a strong
/// type prevents accidentally mixing client names with operation names.
///
/// The name `"default"` is special: it is the attribution fallback and the
/// client used for operations not found in any operation list.
///
/// # Examples
///
/// ```
/// use gqlm_core::ClientName;
///
/// let name = ClientName::new("blog");
/// assert_eq!(name.as_str(), "blog");
/// assert!(!name.is_default());
/// assert!(ClientName::default_client().is_default());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientName(String);

impl ClientName {
    /// The reserved fallback client name.
    pub const DEFAULT: &'static str = "default";

    /// Creates a new client name.
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the client name for the reserved `"default"` client.
    ///
    /// # Examples
    ///
    /// ```
    /// use gqlm_core::ClientName;
    ///
    /// assert_eq!(ClientName::default_client().as_str(), "default");
    /// ```
    #[inline]
    #[must_use]
    pub fn default_client() -> Self {
        Self(Self::DEFAULT.to_string())
    }

    /// Returns `true` if this is the reserved `"default"` client.
    #[inline]
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.0 == Self::DEFAULT
    }

    /// Returns the client name as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `ClientName` and returns the inner `String`.
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ClientName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ClientName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ClientName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Operation name identifier (newtype over String).
///
/// Represents the declared name of a single GraphQL query, mutation, or
/// subscription definition.
///
/// # Examples
///
/// ```
/// use gqlm_core::OperationName;
///
/// let op = OperationName::new("GetPosts");
/// assert_eq!(op.as_str(), "GetPosts");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OperationName(String);

impl OperationName {
    /// Creates a new operation name.
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the operation name as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `OperationName` and returns the inner `String`.
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for OperationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for OperationName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for OperationName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// An operation after client attribution.
///
/// Pairs the raw name found in a document with the client it was attributed
/// to and the canonical (client-prefix-stripped) binding name.
///
/// # Examples
///
/// ```
/// use gqlm_core::{AttributedOperation, ClientName, OperationName};
///
/// let attributed = AttributedOperation {
///     raw_name: OperationName::new("blog_GetPosts"),
///     client: ClientName::new("blog"),
///     canonical_name: OperationName::new("GetPosts"),
/// };
/// assert_eq!(attributed.canonical_name.as_str(), "GetPosts");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributedOperation {
    /// Name exactly as declared in the document.
    pub raw_name: OperationName,
    /// Client this operation belongs to.
    pub client: ClientName,
    /// Binding name after redundant client-prefix stripping.
    pub canonical_name: OperationName,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_name_creation() {
        let name = ClientName::new("blog");
        assert_eq!(name.as_str(), "blog");
    }

    #[test]
    fn test_client_name_default() {
        let name = ClientName::default_client();
        assert!(name.is_default());
        assert_eq!(name.as_str(), "default");
    }

    #[test]
    fn test_client_name_from_string() {
        let name = ClientName::from("todos".to_string());
        assert_eq!(name.as_str(), "todos");
    }

    #[test]
    fn test_client_name_display() {
        let name = ClientName::new("blog");
        assert_eq!(format!("{name}"), "blog");
    }

    #[test]
    fn test_client_name_into_inner() {
        let name = ClientName::new("blog");
        assert_eq!(name.into_inner(), "blog");
    }

    #[test]
    fn test_operation_name_creation() {
        let op = OperationName::new("GetPosts");
        assert_eq!(op.as_str(), "GetPosts");
    }

    #[test]
    fn test_operation_name_display() {
        let op = OperationName::new("GetUser");
        assert_eq!(format!("{op}"), "GetUser");
    }

    #[test]
    fn test_operation_name_from_str() {
        let op = OperationName::from("GetUser");
        assert_eq!(op.as_str(), "GetUser");
    }

    #[test]
    fn test_attributed_operation_fields() {
        let attributed = AttributedOperation {
            raw_name: OperationName::new("blog_GetPosts"),
            client: ClientName::new("blog"),
            canonical_name: OperationName::new("GetPosts"),
        };
        assert_eq!(attributed.raw_name.as_str(), "blog_GetPosts");
        assert_eq!(attributed.client.as_str(), "blog");
    }

    #[test]
    fn test_types_are_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}
        assert_send::<ClientName>();
        assert_sync::<ClientName>();
        assert_send::<OperationName>();
        assert_sync::<OperationName>();
    }
}
