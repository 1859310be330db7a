//! Document scanning: parse raw text, extract declared operation names.
//!
//! Every top-level query/mutation/subscription definition must carry a
//! name; an unnamed definition is fatal for the generation run because the
//! rest of the pipeline cannot attribute it. Fragments are ignored.

use gqlm_core::{Error, OperationName, Result};
use graphql_parser::query::{Definition, OperationDefinition};
use std::path::Path;

/// Extracts the declared operation names from a document's raw text.
///
/// # Errors
///
/// - [`Error::DocumentParse`] when the text is not valid GraphQL.
/// - [`Error::MissingOperationName`] when any operation definition lacks a
///   name (including anonymous shorthand selection sets).
///
/// # Examples
///
/// ```
/// use gqlm_scanner::scan_document;
/// use std::path::Path;
///
/// let text = "query GetUser { user { id } }\nmutation UpdateUser { update { id } }";
/// let names = scan_document(Path::new("user.graphql"), text).unwrap();
/// assert_eq!(names.len(), 2);
/// assert_eq!(names[0].as_str(), "GetUser");
/// ```
pub fn scan_document(path: &Path, text: &str) -> Result<Vec<OperationName>> {
    let document = graphql_parser::parse_query::<&str>(text).map_err(|e| Error::DocumentParse {
        document: path.display().to_string(),
        message: e.to_string(),
    })?;

    let mut names = Vec::new();
    for definition in &document.definitions {
        let Definition::Operation(operation) = definition else {
            continue;
        };
        let name = match operation {
            OperationDefinition::Query(query) => query.name,
            OperationDefinition::Mutation(mutation) => mutation.name,
            OperationDefinition::Subscription(subscription) => subscription.name,
            // Anonymous shorthand operation.
            OperationDefinition::SelectionSet(_) => None,
        };
        match name {
            Some(name) => names.push(OperationName::new(name)),
            None => {
                return Err(Error::MissingOperationName {
                    document: path.display().to_string(),
                });
            }
        }
    }

    tracing::debug!(
        document = %path.display(),
        operations = names.len(),
        "Scanned document"
    );
    Ok(names)
}

/// Reads a document from disk and extracts its operation names.
///
/// # Errors
///
/// [`Error::Io`] when the file cannot be read, plus everything
/// [`scan_document`] returns.
pub fn scan_file(path: &Path) -> Result<Vec<OperationName>> {
    let text = std::fs::read_to_string(path).map_err(|e| Error::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    scan_document(path, &text)
}
