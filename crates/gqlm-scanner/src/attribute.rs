//! Client attribution: decide which client each scanned operation belongs
//! to, and canonicalize its binding name.
//!
//! Attribution is a deterministic, priority-ordered chain of pure rules
//! over `(path, operation name, known clients)` — first match wins. The
//! chain is held as data so new rules can be added without touching the
//! resolution logic:
//!
//! 1. operation-name prefix `<client>_` (overrides the file hints)
//! 2. file-extension hint `*.<client>.graphql|gql`
//! 3. directory hint: a `<client>/` segment immediately preceding the file
//!    name
//! 4. fallback: `default` if configured, else the first configured client
//!
//! # Examples
//!
//! ```
//! use gqlm_core::ClientName;
//! use gqlm_scanner::Attributor;
//! use std::path::Path;
//!
//! let attributor = Attributor::new(
//!     vec![ClientName::new("default"), ClientName::new("blog")],
//!     ClientName::new("default"),
//! );
//!
//! let attributed = attributor.attribute(Path::new("queries/posts.blog.graphql"), "GetPosts");
//! assert_eq!(attributed.client.as_str(), "blog");
//! assert_eq!(attributed.canonical_name.as_str(), "GetPosts");
//! ```

use crate::scan::scan_file;
use gqlm_core::{
    AttributedOperation, ClientName, GqlConfig, OperationName, OperationRegistry, Result,
};
use std::path::{Path, PathBuf};

/// Everything an attribution rule may inspect.
#[derive(Debug)]
pub struct AttributionInput<'a> {
    /// Originating document path.
    pub path: &'a Path,
    /// Raw operation name as declared in the document.
    pub operation: &'a str,
    /// Configured client names, in declaration order.
    pub clients: &'a [ClientName],
}

/// One attribution rule: pure predicate over the input.
pub type AttributionRule = fn(&AttributionInput<'_>) -> Option<ClientName>;

/// The rule chain, highest priority first.
pub const RULES: &[AttributionRule] = &[name_prefix_hint, extension_hint, directory_hint];

/// Rule: the operation's own name starts with `<client>_`.
#[must_use]
pub fn name_prefix_hint(input: &AttributionInput<'_>) -> Option<ClientName> {
    input
        .clients
        .iter()
        .find(|client| {
            input
                .operation
                .strip_prefix(client.as_str())
                .is_some_and(|rest| rest.starts_with('_'))
        })
        .cloned()
}

/// Rule: the path matches `*.<client>.graphql` or `*.<client>.gql`.
#[must_use]
pub fn extension_hint(input: &AttributionInput<'_>) -> Option<ClientName> {
    let file_name = input.path.file_name()?.to_str()?;
    input
        .clients
        .iter()
        .find(|client| {
            let name = client.as_str();
            file_name.ends_with(&format!(".{name}.graphql"))
                || file_name.ends_with(&format!(".{name}.gql"))
        })
        .cloned()
}

/// Rule: the path segment immediately preceding the file name equals a
/// configured client name.
#[must_use]
pub fn directory_hint(input: &AttributionInput<'_>) -> Option<ClientName> {
    let parent = input.path.parent()?.file_name()?.to_str()?;
    input
        .clients
        .iter()
        .find(|client| client.as_str() == parent)
        .cloned()
}

/// Attributes operations to clients and canonicalizes binding names.
#[derive(Debug, Clone)]
pub struct Attributor {
    clients: Vec<ClientName>,
    fallback: ClientName,
}

impl Attributor {
    /// Creates an attributor over an explicit client list and fallback.
    #[must_use]
    pub fn new(clients: Vec<ClientName>, fallback: ClientName) -> Self {
        Self { clients, fallback }
    }

    /// Creates an attributor from a resolved configuration.
    #[must_use]
    pub fn from_config(config: &GqlConfig) -> Self {
        Self::new(
            config.client_names().cloned().collect(),
            config.fallback_client().clone(),
        )
    }

    /// Attributes one operation to a client.
    ///
    /// First matching rule in [`RULES`] wins; when none matches, the
    /// configured fallback is used.
    #[must_use]
    pub fn attribute(&self, path: &Path, raw_name: &str) -> AttributedOperation {
        let input = AttributionInput {
            path,
            operation: raw_name,
            clients: &self.clients,
        };

        let prefix_match = name_prefix_hint(&input);
        let client = RULES
            .iter()
            .find_map(|rule| rule(&input))
            .unwrap_or_else(|| self.fallback.clone());

        let canonical = canonicalize(raw_name, prefix_match.as_ref());
        AttributedOperation {
            raw_name: OperationName::new(raw_name),
            client,
            canonical_name: OperationName::new(canonical),
        }
    }
}

/// Strips redundant prefixes from a raw operation name.
///
/// When the name-prefix rule matched, the anchored `<client>_` prefix is
/// removed. Afterwards, if the remainder still begins with the raw name's
/// first underscore segment (a double-prefix artifact from combining the
/// file hints with name prefixing), one further leading segment is removed.
/// At most those two strips ever apply; a strip that would leave the name
/// empty is skipped.
fn canonicalize(raw_name: &str, prefix_match: Option<&ClientName>) -> String {
    let mut rest = raw_name;

    if let Some(client) = prefix_match
        && let Some(stripped) = rest.strip_prefix(&format!("{client}_"))
        && !stripped.is_empty()
    {
        rest = stripped;
    }

    if let Some(first_segment) = raw_name.split('_').next()
        && first_segment.len() < raw_name.len()
        && let Some(stripped) = rest.strip_prefix(&format!("{first_segment}_"))
        && !stripped.is_empty()
    {
        rest = stripped;
    }

    rest.to_string()
}

/// Runs the scanner and attributor over a document set, populating the
/// registry.
///
/// Registration is idempotent: running twice over the same documents with a
/// registry pre-seeded from the first run yields the same registry.
///
/// # Errors
///
/// Propagates scan failures; a single unnamed operation aborts the whole
/// pass.
pub fn scan_and_attribute(
    config: &GqlConfig,
    documents: &[PathBuf],
    registry: &mut OperationRegistry,
) -> Result<Vec<AttributedOperation>> {
    let attributor = Attributor::from_config(config);
    for client in config.client_names() {
        registry.add_client(client.clone());
    }

    let mut attributed = Vec::new();
    for path in documents {
        for raw_name in scan_file(path)? {
            let operation = attributor.attribute(path, raw_name.as_str());
            registry.register(&operation.client, operation.canonical_name.clone());
            attributed.push(operation);
        }
    }
    Ok(attributed)
}
