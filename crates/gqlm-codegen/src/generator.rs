//! Contract with the external SDK generator.
//!
//! The generator that turns schemas plus documents into callable, typed
//! wrappers is a black box behind the [`SdkGenerator`] trait: it receives
//! schema descriptors, document paths, and plugin configuration, and
//! returns generated source text. This crate never interprets the
//! generator's internals, only its text output.

use gqlm_core::{ClientConfig, ClientName, GqlConfig, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Schema input for one client.
///
/// Built from the client configuration the way the generator expects it: a
/// validated local schema file when configured, the bare host when no auth
/// is needed, or the host with the auth/static headers attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SchemaDescriptor {
    /// Local schema file.
    Path(PathBuf),
    /// Introspect the host with no extra headers.
    Host(String),
    /// Introspect the host with headers (static headers plus auth token).
    HostWithHeaders {
        /// Host URL.
        host: String,
        /// Headers sent during introspection.
        headers: BTreeMap<String, String>,
    },
}

impl SchemaDescriptor {
    /// Derives the descriptor for one client.
    ///
    /// # Examples
    ///
    /// ```
    /// use gqlm_codegen::SchemaDescriptor;
    /// use gqlm_core::{ClientSource, GqlConfig};
    /// # use std::collections::BTreeMap;
    ///
    /// let config = GqlConfig::builder()
    ///     .client("default", ClientSource::host("https://a.test"))
    ///     .build_with_env(&BTreeMap::<String, String>::new())
    ///     .unwrap();
    /// let descriptor = SchemaDescriptor::for_client(config.client("default").unwrap());
    /// assert_eq!(descriptor, SchemaDescriptor::Host("https://a.test".to_string()));
    /// ```
    #[must_use]
    pub fn for_client(client: &ClientConfig) -> Self {
        if let Some(path) = &client.schema_path {
            return Self::Path(path.clone());
        }
        let Some(token_header) = client.token.header_value() else {
            return Self::Host(client.host.clone());
        };
        let mut headers = client.headers.clone();
        headers.insert(client.token.name.clone(), token_header);
        Self::HostWithHeaders {
            host: client.host.clone(),
            headers,
        }
    }
}

/// Everything the external generator needs for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerateRequest {
    /// Schema descriptors per client, in declaration order.
    pub schemas: Vec<(ClientName, SchemaDescriptor)>,
    /// Document file paths to generate wrappers for.
    pub documents: Vec<PathBuf>,
    /// Name of the generated output file.
    pub output_file: String,
    /// Generator plugin list.
    pub plugins: Vec<String>,
    /// Emit operation types only.
    pub only_operation_types: bool,
    /// Suppress generator output.
    pub silent: bool,
}

impl GenerateRequest {
    /// Name of the generated SDK file.
    pub const OUTPUT_FILE: &'static str = "gql-sdk.ts";

    /// The plugin always present.
    pub const BASE_PLUGIN: &'static str = "typescript";

    /// Plugins appended only when at least one document was discovered.
    pub const OPERATION_PLUGINS: [&'static str; 2] =
        ["typescript-operations", "typescript-graphql-request"];

    /// Builds the request for a configuration and discovered document set.
    ///
    /// Operation plugins are only included when documents exist; a
    /// documentless project still generates base schema types.
    #[must_use]
    pub fn from_config(config: &GqlConfig, documents: Vec<PathBuf>) -> Self {
        let mut plugins = vec![Self::BASE_PLUGIN.to_string()];
        if !documents.is_empty() {
            plugins.extend(Self::OPERATION_PLUGINS.iter().map(ToString::to_string));
        }

        Self {
            schemas: config
                .clients()
                .map(|(name, client)| (name.clone(), SchemaDescriptor::for_client(client)))
                .collect(),
            documents,
            output_file: Self::OUTPUT_FILE.to_string(),
            plugins,
            only_operation_types: config.only_operation_types(),
            silent: config.silent(),
        }
    }
}

/// The external SDK generator.
///
/// Given schema descriptors, document file paths, and plugin config,
/// returns the generated source text naming every exported call wrapper
/// after the raw operation name it saw.
pub trait SdkGenerator {
    /// Runs one generation pass.
    ///
    /// # Errors
    ///
    /// Returns [`gqlm_core::Error::GenerationFailed`] when the generator
    /// cannot produce output; this aborts the whole pipeline run.
    fn generate(&self, request: &GenerateRequest) -> Result<String>;
}
