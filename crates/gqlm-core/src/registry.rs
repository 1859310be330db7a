//! Operation Registry: which operations belong to which client.
//!
//! Built incrementally while scanning documents, finalized before binding
//! generation, and consulted at runtime to route a call to the right
//! client. Insertion order is preserved per client and an operation name
//! belongs to exactly one client.
//!
//! # Examples
//!
//! ```
//! use gqlm_core::{ClientName, OperationName, OperationRegistry};
//!
//! let mut registry = OperationRegistry::new();
//! registry.add_client(ClientName::new("default"));
//! registry.add_client(ClientName::new("blog"));
//! registry.register(&ClientName::new("blog"), OperationName::new("GetPosts"));
//!
//! let owner = registry.resolve_client(&OperationName::new("GetPosts"));
//! assert_eq!(owner.as_str(), "blog");
//! ```

use crate::{ClientName, OperationName};
use serde_json::{Map, Value};

/// Mapping from client name to its ordered, duplicate-free operation list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationRegistry {
    clients: Vec<(ClientName, Vec<OperationName>)>,
}

impl OperationRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a client with an empty operation list.
    ///
    /// Idempotent: re-adding an existing client is a no-op.
    pub fn add_client(&mut self, client: ClientName) {
        if !self.clients.iter().any(|(name, _)| *name == client) {
            self.clients.push((client, Vec::new()));
        }
    }

    /// Returns `true` if the client is known to the registry.
    #[must_use]
    pub fn has_client(&self, client: &ClientName) -> bool {
        self.clients.iter().any(|(name, _)| name == client)
    }

    /// Registers an operation under a client.
    ///
    /// Idempotent per client; an operation already owned by another client
    /// is not re-registered (first attribution wins), preserving the
    /// one-client-per-operation invariant.
    ///
    /// Returns `true` if the operation was newly recorded.
    pub fn register(&mut self, client: &ClientName, operation: OperationName) -> bool {
        if let Some(owner) = self.owner(&operation) {
            if owner != client {
                tracing::debug!(
                    operation = operation.as_str(),
                    owner = owner.as_str(),
                    rejected = client.as_str(),
                    "Operation already attributed; keeping first attribution"
                );
            }
            return false;
        }
        let Some((_, operations)) = self.clients.iter_mut().find(|(name, _)| name == client) else {
            return false;
        };
        operations.push(operation);
        true
    }

    /// Returns the client owning an operation, if any.
    #[must_use]
    pub fn owner(&self, operation: &OperationName) -> Option<&ClientName> {
        self.clients
            .iter()
            .find(|(_, operations)| operations.contains(operation))
            .map(|(name, _)| name)
    }

    /// Resolves which client services an operation, defaulting to
    /// `default` when the operation is not in any list.
    ///
    /// The default covers single-client setups where attribution was
    /// trivial and no list was populated.
    #[must_use]
    pub fn resolve_client(&self, operation: &OperationName) -> ClientName {
        self.owner(operation)
            .cloned()
            .unwrap_or_else(ClientName::default_client)
    }

    /// Returns the operation list for a client.
    #[must_use]
    pub fn operations(&self, client: &ClientName) -> &[OperationName] {
        self.clients
            .iter()
            .find(|(name, _)| name == client)
            .map_or(&[], |(_, operations)| operations.as_slice())
    }

    /// Iterates clients with their operation lists, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&ClientName, &[OperationName])> {
        self.clients
            .iter()
            .map(|(name, operations)| (name, operations.as_slice()))
    }

    /// Total operation count across all clients.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clients.iter().map(|(_, operations)| operations.len()).sum()
    }

    /// Returns `true` if no operations are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Renders the client→operations map as a JSON value, for embedding in
    /// the emitted bindings module.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        for (client, operations) in &self.clients {
            map.insert(
                client.as_str().to_string(),
                Value::Array(
                    operations
                        .iter()
                        .map(|op| Value::String(op.as_str().to_string()))
                        .collect(),
                ),
            );
        }
        Value::Object(map)
    }
}
