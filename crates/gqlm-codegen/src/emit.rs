//! Binding emitter: derives the exported surface from the normalized
//! template.
//!
//! Purely derived and deterministic given the template: the sorted,
//! deduplicated list of exported wrapper names, a prefixed public export
//! per wrapper, a declaration-only typed alias per wrapper, and the
//! client→operations map literal consumed at runtime. No I/O.

use crate::normalize::{WRAPPER_PARAM, upper_first};
use gqlm_core::{ClientName, Error, OperationName, OperationRegistry, Result};
use handlebars::Handlebars;
use regex::Regex;
use serde::Serialize;

/// One exported call wrapper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Binding {
    /// Wrapper identifier inside the generated SDK.
    pub wrapper: String,
    /// Public export name: `<functionPrefix><PascalCase(wrapper)>`.
    pub export_name: String,
    /// Client whose instance services this wrapper, when known.
    pub client: Option<ClientName>,
}

/// Extracts the exported wrapper names from a (normalized) template.
///
/// A wrapper is any identifier immediately followed by the call-argument
/// opening with the reserved first-parameter name. The result is sorted
/// and deduplicated.
///
/// # Examples
///
/// ```
/// use gqlm_codegen::extract_wrappers;
///
/// let template = "return {\n  GetUser(variables) {},\n  GetPosts(variables) {}\n};";
/// assert_eq!(extract_wrappers(template), ["GetPosts", "GetUser"]);
/// ```
#[must_use]
pub fn extract_wrappers(template: &str) -> Vec<String> {
    let pattern =
        Regex::new(&format!(r"(\w+)\s*\({WRAPPER_PARAM}")).expect("wrapper pattern is valid");
    let mut wrappers: Vec<String> = pattern
        .captures_iter(template)
        .map(|captures| captures[1].to_string())
        .collect();
    wrappers.sort();
    wrappers.dedup();
    wrappers
}

/// Emits the runtime bindings module and type declarations.
#[derive(Debug)]
pub struct BindingEmitter<'a> {
    handlebars: Handlebars<'a>,
    function_prefix: String,
}

#[derive(Serialize)]
struct BindingsContext<'a> {
    operations: String,
    clients_union: String,
    bindings: &'a [Binding],
}

impl BindingEmitter<'_> {
    /// Creates an emitter with the built-in templates registered.
    ///
    /// # Errors
    ///
    /// Returns an error if template registration fails (should not happen
    /// with valid built-in templates).
    pub fn new(function_prefix: impl Into<String>) -> Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);

        handlebars
            .register_template_string("bindings", include_str!("../templates/bindings.ts.hbs"))
            .map_err(|e| Error::SerializationError {
                message: format!("Failed to register bindings template: {e}"),
                source: None,
            })?;
        handlebars
            .register_template_string(
                "declarations",
                include_str!("../templates/declarations.d.ts.hbs"),
            )
            .map_err(|e| Error::SerializationError {
                message: format!("Failed to register declarations template: {e}"),
                source: None,
            })?;

        Ok(Self {
            handlebars,
            function_prefix: function_prefix.into(),
        })
    }

    /// Derives the binding list from a normalized template and the
    /// finalized registry.
    ///
    /// The client is resolved by looking the wrapper name up in the
    /// registry's operation lists; wrappers in no list are dispatched to
    /// the default client at runtime and carry no explicit client here.
    #[must_use]
    pub fn bindings(&self, template: &str, registry: &OperationRegistry) -> Vec<Binding> {
        extract_wrappers(template)
            .into_iter()
            .map(|wrapper| {
                let client = registry.owner(&OperationName::new(wrapper.clone())).cloned();
                let export_name = format!("{}{}", self.function_prefix, upper_first(&wrapper));
                Binding {
                    wrapper,
                    export_name,
                    client,
                }
            })
            .collect()
    }

    /// Renders the runtime bindings module.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if rendering fails.
    pub fn render_bindings(
        &self,
        bindings: &[Binding],
        registry: &OperationRegistry,
    ) -> Result<String> {
        let context = BindingsContext {
            operations: registry.to_json().to_string(),
            clients_union: clients_union(registry),
            bindings,
        };
        self.handlebars
            .render("bindings", &context)
            .map_err(|e| Error::SerializationError {
                message: format!("Failed to render bindings module: {e}"),
                source: None,
            })
    }

    /// Renders the declaration-only typed aliases.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if rendering fails.
    pub fn render_declarations(
        &self,
        bindings: &[Binding],
        registry: &OperationRegistry,
    ) -> Result<String> {
        let context = BindingsContext {
            operations: registry.to_json().to_string(),
            clients_union: clients_union(registry),
            bindings,
        };
        self.handlebars
            .render("declarations", &context)
            .map_err(|e| Error::SerializationError {
                message: format!("Failed to render declarations: {e}"),
                source: None,
            })
    }
}

fn clients_union(registry: &OperationRegistry) -> String {
    let clients: Vec<String> = registry
        .iter()
        .map(|(client, _)| format!("'{client}'"))
        .collect();
    if clients.is_empty() {
        "'default'".to_string()
    } else {
        clients.join(" | ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> OperationRegistry {
        let mut registry = OperationRegistry::new();
        registry.add_client(ClientName::new("default"));
        registry.add_client(ClientName::new("blog"));
        registry.register(&ClientName::new("default"), OperationName::new("GetUser"));
        registry.register(&ClientName::new("blog"), OperationName::new("GetPosts"));
        registry
    }

    const TEMPLATE: &str = "return {\n  GetUser(variables) {},\n  GetPosts(variables) {}\n};";

    #[test]
    fn test_extract_wrappers_sorted_dedup() {
        let template = "a(variables) b(variables) a(variables) c (variables)";
        assert_eq!(extract_wrappers(template), ["a", "b", "c"]);
    }

    #[test]
    fn test_extract_wrappers_ignores_other_calls() {
        let template = "GetUser(variables) request(document) other(vars)";
        assert_eq!(extract_wrappers(template), ["GetUser"]);
    }

    #[test]
    fn test_bindings_prefix_and_client() {
        let emitter = BindingEmitter::new("Gql").unwrap();
        let bindings = emitter.bindings(TEMPLATE, &registry());

        let get_posts = bindings.iter().find(|b| b.wrapper == "GetPosts").unwrap();
        assert_eq!(get_posts.export_name, "GqlGetPosts");
        assert_eq!(get_posts.client.as_ref().unwrap().as_str(), "blog");

        let get_user = bindings.iter().find(|b| b.wrapper == "GetUser").unwrap();
        assert_eq!(get_user.export_name, "GqlGetUser");
        assert_eq!(get_user.client.as_ref().unwrap().as_str(), "default");
    }

    #[test]
    fn test_bindings_unlisted_wrapper_has_no_client() {
        let emitter = BindingEmitter::new("Gql").unwrap();
        let bindings = emitter.bindings("stray(variables)", &registry());
        assert_eq!(bindings[0].client, None);
        assert_eq!(bindings[0].export_name, "GqlStray");
    }

    #[test]
    fn test_render_bindings_module() {
        let emitter = BindingEmitter::new("Gql").unwrap();
        let registry = registry();
        let bindings = emitter.bindings(TEMPLATE, &registry);
        let module = emitter.render_bindings(&bindings, &registry).unwrap();

        assert!(module.contains(r#"export const GqlOperations = {"default":["GetUser"],"blog":["GetPosts"]}"#));
        assert!(module.contains(
            "export const GqlGetPosts = (...params) => GqlInstance().handle('blog')['GetPosts'](...params)"
        ));
        assert!(module.contains(
            "export const GqlGetUser = (...params) => GqlInstance().handle('default')['GetUser'](...params)"
        ));
    }

    #[test]
    fn test_render_bindings_without_client() {
        let emitter = BindingEmitter::new("Gql").unwrap();
        let registry = registry();
        let bindings = emitter.bindings("stray(variables)", &registry);
        let module = emitter.render_bindings(&bindings, &registry).unwrap();
        assert!(module.contains("GqlInstance().handle()['stray']"));
    }

    #[test]
    fn test_render_declarations() {
        let emitter = BindingEmitter::new("Gql").unwrap();
        let registry = registry();
        let bindings = emitter.bindings(TEMPLATE, &registry);
        let declarations = emitter.render_declarations(&bindings, &registry).unwrap();

        assert!(declarations.contains("type GqlClients = 'default' | 'blog'"));
        assert!(declarations.contains(
            "export const GqlGetPosts: (...params: Parameters<GqlFunc['GetPosts']>) => ReturnType<GqlFunc['GetPosts']>"
        ));
    }

    #[test]
    fn test_clients_union_empty_registry() {
        let empty = OperationRegistry::new();
        assert_eq!(clients_union(&empty), "'default'");
    }

    #[test]
    fn test_deterministic_output() {
        let emitter = BindingEmitter::new("Gql").unwrap();
        let registry = registry();
        let a = emitter.bindings(TEMPLATE, &registry);
        let b = emitter.bindings(TEMPLATE, &registry);
        assert_eq!(a, b);
    }
}
