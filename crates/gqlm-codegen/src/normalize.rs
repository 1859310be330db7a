//! Collision resolver / template normalizer.
//!
//! The external generator is unaware of multi-client attribution and names
//! wrappers purely after raw GraphQL operation names. This post-pass
//! rewrites the generated source so exported binding names match what the
//! attributor decided, without re-invoking the generator.
//!
//! For every `(client, operation)` registry pair:
//! - a wrapper already exported under the bare canonical name is left
//!   alone;
//! - a wrapper named `<client>_<operation>` is rewritten globally (both the
//!   identifier and its Pascal-cased spelling used in type declarations) to
//!   the bare name;
//! - failing that, the first wrapper matching `<anyPrefix>_<operation>` is
//!   rewritten the same way;
//! - otherwise the wrapper keeps whatever name the generator chose.

use gqlm_core::OperationRegistry;
use regex::Regex;

/// Reserved first-parameter name the generator uses on every wrapper.
pub const WRAPPER_PARAM: &str = "variables";

/// Upper-cases the first character of each underscore segment, keeping the
/// underscores. Used for the type-level spelling of wrapper identifiers.
///
/// # Examples
///
/// ```
/// use gqlm_codegen::normalize::pascal_segments;
///
/// assert_eq!(pascal_segments("blog_getPosts"), "Blog_GetPosts");
/// assert_eq!(pascal_segments("getPosts"), "GetPosts");
/// ```
#[must_use]
pub fn pascal_segments(name: &str) -> String {
    name.split('_')
        .map(upper_first)
        .collect::<Vec<_>>()
        .join("_")
}

/// Upper-cases the first character.
#[must_use]
pub fn upper_first(name: &str) -> String {
    let mut chars = name.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().collect::<String>() + chars.as_str()
    })
}

/// Returns `true` if the template exports a wrapper with exactly this name
/// (the identifier immediately followed by the call-argument opening).
fn has_wrapper(template: &str, name: &str) -> bool {
    let pattern = format!(r"\s{}\s*\({WRAPPER_PARAM}", regex::escape(name));
    Regex::new(&pattern)
        .expect("wrapper probe pattern is valid")
        .is_match(template)
}

/// Finds the full identifier of the first wrapper named `<prefix>_<op>`.
fn find_prefixed_wrapper(template: &str, operation: &str) -> Option<String> {
    let pattern = format!(r"(\w+_{})\s*\({WRAPPER_PARAM}", regex::escape(operation));
    Regex::new(&pattern)
        .expect("prefixed wrapper pattern is valid")
        .captures(template)
        .map(|captures| captures[1].to_string())
}

/// Rewrites every word-bounded occurrence of `from` to `to`, in both the
/// value-level spelling and the Pascal-cased type-level spelling. The
/// type-level rewrite is prefix-anchored only, since generated type names
/// carry suffixes (`Query`, `QueryVariables`, `Document`).
fn oust(template: &str, from: &str, to: &str) -> String {
    let value_re =
        Regex::new(&format!(r"\b{}\b", regex::escape(from))).expect("identifier pattern is valid");
    let rewritten = value_re.replace_all(template, to);

    let (from_ps, to_ps) = (pascal_segments(from), pascal_segments(to));
    let type_re = Regex::new(&format!(r"\b{}", regex::escape(&from_ps)))
        .expect("type identifier pattern is valid");
    type_re.replace_all(&rewritten, to_ps.as_str()).into_owned()
}

/// Rewrites the generated source so ambiguously-prefixed wrapper names
/// collapse to their canonical form where safe.
///
/// Callers should skip this pass entirely for a single-client setup named
/// `default` (see `GqlConfig::needs_normalization`); attribution is
/// trivial there and raw names are already canonical.
///
/// # Examples
///
/// ```
/// use gqlm_codegen::normalize_template;
/// use gqlm_core::{ClientName, OperationName, OperationRegistry};
///
/// let mut registry = OperationRegistry::new();
/// registry.add_client(ClientName::new("blog"));
/// registry.register(&ClientName::new("blog"), OperationName::new("GetPosts"));
///
/// let template = "export function getSdk() {\n  return { blog_GetPosts(variables) {} };\n}";
/// let normalized = normalize_template(template, &registry);
/// assert!(normalized.contains("GetPosts(variables)"));
/// assert!(!normalized.contains("blog_GetPosts"));
/// ```
#[must_use]
pub fn normalize_template(template: &str, registry: &OperationRegistry) -> String {
    let mut template = template.to_string();

    for (client, operations) in registry.iter() {
        if operations.is_empty() {
            continue;
        }
        for operation in operations {
            let canonical = operation.as_str();
            // Already exported under the canonical name.
            if has_wrapper(&template, canonical) {
                continue;
            }

            let prefixed = format!("{}_{canonical}", client.as_str());
            if has_wrapper(&template, &prefixed) {
                template = oust(&template, &prefixed, canonical);
                continue;
            }

            if let Some(found) = find_prefixed_wrapper(&template, canonical) {
                tracing::debug!(
                    wrapper = found.as_str(),
                    canonical,
                    "Collapsing generator-assigned wrapper name"
                );
                template = oust(&template, &found, canonical);
            }
            // Otherwise leave untouched; the caller references the wrapper
            // by whatever name the generator chose.
        }
    }

    template
}
