//! GraphQL document discovery, operation scanning, and client attribution.
//!
//! Walks configured search roots for `*.gql` / `*.graphql` documents,
//! extracts declared operation names, and attributes each operation to one
//! configured client through an ordered heuristic rule chain.

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod attribute;
pub mod discovery;
pub mod scan;

pub use attribute::{Attributor, AttributionInput, AttributionRule, RULES, scan_and_attribute};
pub use discovery::{ChangeKind, DocumentEvent, discover_documents, is_document_path};
pub use scan::{scan_document, scan_file};
