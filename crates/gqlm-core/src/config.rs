//! Client configuration for multi-client GraphQL binding generation.
//!
//! This module resolves the declared client map into a finalized
//! configuration: environment-variable overrides are applied, hosts are
//! validated, schema paths are checked, and token secrets are redacted from
//! the public view.
//!
//! # Examples
//!
//! ```
//! use gqlm_core::{ClientSource, GqlConfig};
//!
//! let config = GqlConfig::builder()
//!     .client("default", ClientSource::host("https://api.example.com/graphql"))
//!     .client("blog", ClientSource::host("https://blog.example.com/graphql"))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.client_names().count(), 2);
//! assert_eq!(config.function_prefix(), "Gql");
//! ```

use crate::{ClientName, Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Auth token descriptor for a client.
///
/// The formatted header value is `"<type> <value>"`, trimmed, which
/// supports an explicitly empty token type (raw token in the header).
///
/// # Examples
///
/// ```
/// use gqlm_core::TokenConfig;
///
/// let token = TokenConfig::with_value("secret");
/// assert_eq!(token.header_value().as_deref(), Some("Bearer secret"));
/// assert_eq!(token.name, "Authorization");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Token secret. `None` means no auth header is emitted.
    #[serde(default)]
    pub value: Option<String>,
    /// Header name the token is sent under. Default: `Authorization`.
    #[serde(default = "TokenConfig::default_name")]
    pub name: String,
    /// Token scheme placed before the value. Default: `Bearer`; may be
    /// explicitly empty.
    #[serde(rename = "type", default = "TokenConfig::default_type")]
    pub token_type: String,
}

impl TokenConfig {
    fn default_name() -> String {
        "Authorization".to_string()
    }

    fn default_type() -> String {
        "Bearer".to_string()
    }

    /// Creates a token config with a value and default name/type.
    #[must_use]
    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::default()
        }
    }

    /// Formats the header value as `"<type> <value>"`, trimmed.
    ///
    /// Returns `None` when no token value is present.
    ///
    /// # Examples
    ///
    /// ```
    /// use gqlm_core::TokenConfig;
    ///
    /// let mut token = TokenConfig::with_value("abc");
    /// token.token_type = String::new();
    /// assert_eq!(token.header_value().as_deref(), Some("abc"));
    /// ```
    #[must_use]
    pub fn header_value(&self) -> Option<String> {
        self.value
            .as_ref()
            .map(|value| format!("{} {value}", self.token_type).trim().to_string())
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            value: None,
            name: Self::default_name(),
            token_type: Self::default_type(),
        }
    }
}

/// CORS descriptor applied to a client's requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Request mode (e.g. `cors`, `no-cors`, `same-origin`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    /// Credentials mode (e.g. `include`, `omit`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<String>,
}

/// Declared (pre-resolution) client entry.
///
/// A client is declared either as a bare host URL or as a full descriptor,
/// mirroring the public runtime config shape.
///
/// # Examples
///
/// ```
/// use gqlm_core::ClientSource;
///
/// let simple = ClientSource::host("https://api.example.com/graphql");
/// let full = ClientSource::full("https://api.example.com/graphql")
///     .token_value("secret")
///     .proxy_cookies(false);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClientSource {
    /// Shorthand: just the host URL.
    Host(String),
    /// Full descriptor.
    Descriptor(Box<ClientDescriptor>),
}

/// Full client declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientDescriptor {
    /// Server-side host URL.
    #[serde(default)]
    pub host: Option<String>,
    /// Alternate host used from client-side (browser) contexts.
    #[serde(default, rename = "clientHost")]
    pub client_host: Option<String>,
    /// Auth token descriptor.
    #[serde(default)]
    pub token: Option<TokenConfig>,
    /// Static headers sent with every request.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Forward the inbound cookie header in server contexts. Default: true.
    #[serde(default, rename = "proxyCookies")]
    pub proxy_cookies: Option<bool>,
    /// Local schema file used instead of host introspection.
    #[serde(default)]
    pub schema: Option<PathBuf>,
    /// Keep the token value in the public (redacted) config view.
    #[serde(default, rename = "retainToken")]
    pub retain_token: bool,
}

impl ClientSource {
    /// Declares a client by host URL alone.
    #[must_use]
    pub fn host(host: impl Into<String>) -> Self {
        Self::Host(host.into())
    }

    /// Starts a full client descriptor with the given host.
    #[must_use]
    pub fn full(host: impl Into<String>) -> Self {
        Self::Descriptor(Box::new(ClientDescriptor {
            host: Some(host.into()),
            ..ClientDescriptor::default()
        }))
    }

    /// Sets the client-side host override.
    #[must_use]
    pub fn client_host(self, client_host: impl Into<String>) -> Self {
        let mut desc = self.into_descriptor();
        desc.client_host = Some(client_host.into());
        Self::Descriptor(Box::new(desc))
    }

    /// Sets a token value with default name/type.
    #[must_use]
    pub fn token_value(self, value: impl Into<String>) -> Self {
        let mut desc = self.into_descriptor();
        desc.token = Some(TokenConfig::with_value(value));
        Self::Descriptor(Box::new(desc))
    }

    /// Sets the full token descriptor.
    #[must_use]
    pub fn token(self, token: TokenConfig) -> Self {
        let mut desc = self.into_descriptor();
        desc.token = Some(token);
        Self::Descriptor(Box::new(desc))
    }

    /// Adds a static header.
    #[must_use]
    pub fn header(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let mut desc = self.into_descriptor();
        desc.headers.insert(name.into(), value.into());
        Self::Descriptor(Box::new(desc))
    }

    /// Enables or disables cookie forwarding.
    #[must_use]
    pub fn proxy_cookies(self, enabled: bool) -> Self {
        let mut desc = self.into_descriptor();
        desc.proxy_cookies = Some(enabled);
        Self::Descriptor(Box::new(desc))
    }

    /// Sets a local schema path.
    #[must_use]
    pub fn schema(self, path: impl Into<PathBuf>) -> Self {
        let mut desc = self.into_descriptor();
        desc.schema = Some(path.into());
        Self::Descriptor(Box::new(desc))
    }

    /// Keeps the token value in the redacted public view.
    #[must_use]
    pub fn retain_token(self, retain: bool) -> Self {
        let mut desc = self.into_descriptor();
        desc.retain_token = retain;
        Self::Descriptor(Box::new(desc))
    }

    fn into_descriptor(self) -> ClientDescriptor {
        match self {
            Self::Host(host) => ClientDescriptor {
                host: Some(host),
                ..ClientDescriptor::default()
            },
            Self::Descriptor(desc) => *desc,
        }
    }
}

/// Finalized configuration for one client.
///
/// Produced by [`GqlConfig`] resolution; immutable for the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientConfig {
    /// Server-side host URL.
    pub host: String,
    /// Alternate host for client-side contexts.
    #[serde(rename = "clientHost", skip_serializing_if = "Option::is_none")]
    pub client_host: Option<String>,
    /// Auth token descriptor (value possibly redacted).
    pub token: TokenConfig,
    /// Static headers sent with every request.
    pub headers: BTreeMap<String, String>,
    /// Forward the inbound cookie header in server contexts.
    #[serde(rename = "proxyCookies")]
    pub proxy_cookies: bool,
    /// Validated local schema file used instead of host introspection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_path: Option<PathBuf>,
    /// Whether the public view keeps the token value.
    #[serde(skip)]
    pub retain_token: bool,
}

impl ClientConfig {
    /// Returns a copy safe to expose publicly: the token value is cleared
    /// unless `retain_token` was set.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut public = self.clone();
        if !self.retain_token {
            public.token.value = None;
        }
        public
    }
}

/// Environment lookup used during resolution.
///
/// Abstracted so tests can resolve against a fixed map instead of the
/// process environment.
pub trait EnvSource {
    /// Returns the value of an environment variable, if set and non-empty.
    fn get(&self, key: &str) -> Option<String>;
}

/// Process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.is_empty())
    }
}

impl EnvSource for BTreeMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        self.get(key).filter(|v| !v.is_empty()).cloned()
    }
}

/// Finalized multi-client configuration.
///
/// Client order is declaration order; the first declared client is the
/// attribution fallback when no `default` client exists.
///
/// # Examples
///
/// ```
/// use gqlm_core::{ClientSource, GqlConfig};
///
/// let config = GqlConfig::builder()
///     .client("default", ClientSource::host("https://a.test"))
///     .client("blog", ClientSource::host("https://b.test"))
///     .function_prefix("Gql")
///     .build()
///     .unwrap();
///
/// assert_eq!(config.fallback_client().as_str(), "default");
/// assert_eq!(config.client("blog").unwrap().host, "https://b.test");
/// ```
#[derive(Debug, Clone)]
pub struct GqlConfig {
    clients: Vec<(ClientName, ClientConfig)>,
    document_paths: Vec<PathBuf>,
    function_prefix: String,
    only_operation_types: bool,
    silent: bool,
}

impl GqlConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> GqlConfigBuilder {
        GqlConfigBuilder::new()
    }

    /// Returns the configured client names in declaration order.
    pub fn client_names(&self) -> impl Iterator<Item = &ClientName> {
        self.clients.iter().map(|(name, _)| name)
    }

    /// Returns the clients with their configuration, in declaration order.
    pub fn clients(&self) -> impl Iterator<Item = (&ClientName, &ClientConfig)> {
        self.clients.iter().map(|(name, config)| (name, config))
    }

    /// Looks up one client's configuration.
    #[must_use]
    pub fn client(&self, name: &str) -> Option<&ClientConfig> {
        self.clients
            .iter()
            .find(|(client, _)| client.as_str() == name)
            .map(|(_, config)| config)
    }

    /// Returns the attribution fallback client: `default` if configured,
    /// else the first declared client.
    ///
    /// # Panics
    ///
    /// Never panics: resolution guarantees at least one client.
    #[must_use]
    pub fn fallback_client(&self) -> &ClientName {
        self.clients
            .iter()
            .find(|(name, _)| name.is_default())
            .or_else(|| self.clients.first())
            .map(|(name, _)| name)
            .expect("resolution guarantees at least one client")
    }

    /// Returns `true` when binding names need template normalization:
    /// more than one client, or the sole client is not `default`.
    #[must_use]
    pub fn needs_normalization(&self) -> bool {
        self.clients.len() > 1 || self.clients.first().is_none_or(|(name, _)| !name.is_default())
    }

    /// Extra search roots for documents.
    #[must_use]
    pub fn document_paths(&self) -> &[PathBuf] {
        &self.document_paths
    }

    /// Prefix applied to every exported wrapper name.
    #[must_use]
    pub fn function_prefix(&self) -> &str {
        &self.function_prefix
    }

    /// Whether the generator should emit operation types only.
    #[must_use]
    pub const fn only_operation_types(&self) -> bool {
        self.only_operation_types
    }

    /// Whether the generator should suppress its own output.
    #[must_use]
    pub const fn silent(&self) -> bool {
        self.silent
    }

    /// Returns the public (token-redacted) view of every client.
    #[must_use]
    pub fn public_clients(&self) -> Vec<(ClientName, ClientConfig)> {
        self.clients
            .iter()
            .map(|(name, config)| (name.clone(), config.redacted()))
            .collect()
    }
}

/// Builder for [`GqlConfig`].
///
/// `build()` performs full resolution: environment overrides, host
/// validation, and schema path checks.
#[derive(Debug, Default)]
pub struct GqlConfigBuilder {
    clients: Vec<(ClientName, ClientSource)>,
    document_paths: Vec<PathBuf>,
    function_prefix: Option<String>,
    only_operation_types: bool,
    silent: bool,
}

impl GqlConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            clients: Vec::new(),
            document_paths: Vec::new(),
            function_prefix: None,
            only_operation_types: true,
            silent: true,
        }
    }

    /// Declares a client. Declaration order is preserved.
    #[must_use]
    pub fn client(mut self, name: impl Into<ClientName>, source: ClientSource) -> Self {
        self.clients.push((name.into(), source));
        self
    }

    /// Adds a document search root.
    #[must_use]
    pub fn document_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.document_paths.push(path.into());
        self
    }

    /// Sets the exported wrapper prefix. Default: `Gql`.
    #[must_use]
    pub fn function_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.function_prefix = Some(prefix.into());
        self
    }

    /// Sets whether the generator emits operation types only.
    #[must_use]
    pub const fn only_operation_types(mut self, enabled: bool) -> Self {
        self.only_operation_types = enabled;
        self
    }

    /// Sets whether the generator suppresses its own output.
    #[must_use]
    pub const fn silent(mut self, enabled: bool) -> Self {
        self.silent = enabled;
        self
    }

    /// Resolves the configuration against the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingClientHost`] when a client has no host after
    /// environment overrides, or when no clients are declared and `GQL_HOST`
    /// is unset.
    pub fn build(self) -> Result<GqlConfig> {
        self.build_with_env(&ProcessEnv)
    }

    /// Resolves the configuration against an explicit environment source.
    ///
    /// # Errors
    ///
    /// Same as [`GqlConfigBuilder::build`].
    pub fn build_with_env(mut self, env: &impl EnvSource) -> Result<GqlConfig> {
        // No declared clients: fall back to a single `default` client from
        // GQL_HOST / GQL_CLIENT_HOST.
        if self.clients.is_empty() {
            let host = env.get("GQL_HOST").ok_or_else(|| Error::MissingClientHost {
                client: ClientName::DEFAULT.to_string(),
            })?;
            let mut source = ClientSource::host(host);
            if let Some(client_host) = env.get("GQL_CLIENT_HOST") {
                source = source.client_host(client_host);
            }
            self.clients.push((ClientName::default_client(), source));
        }

        let mut clients = Vec::with_capacity(self.clients.len());
        for (name, source) in self.clients {
            let config = resolve_client(&name, source, env)?;
            clients.push((name, config));
        }

        Ok(GqlConfig {
            clients,
            document_paths: self.document_paths,
            function_prefix: self.function_prefix.unwrap_or_else(|| "Gql".to_string()),
            only_operation_types: self.only_operation_types,
            silent: self.silent,
        })
    }
}

/// Environment variable name for a per-client override.
///
/// The `default` client reads the bare variable; others read
/// `GQL_<CLIENT>_<SUFFIX>` with the client name upper-cased.
fn env_key(client: &ClientName, suffix: &str) -> String {
    if client.is_default() {
        format!("GQL_{suffix}")
    } else {
        format!("GQL_{}_{suffix}", client.as_str().to_uppercase())
    }
}

fn resolve_client(
    name: &ClientName,
    source: ClientSource,
    env: &impl EnvSource,
) -> Result<ClientConfig> {
    let desc = source.into_descriptor();

    let host = env
        .get(&env_key(name, "HOST"))
        .or(desc.host)
        .ok_or_else(|| Error::MissingClientHost {
            client: name.as_str().to_string(),
        })?;
    let client_host = env.get(&env_key(name, "CLIENT_HOST")).or(desc.client_host);

    let mut token = desc.token.unwrap_or_default();
    if let Some(value) = env.get(&env_key(name, "TOKEN")) {
        token.value = Some(value);
    }
    if let Some(header_name) = env.get(&env_key(name, "TOKEN_NAME")) {
        token.name = header_name;
    }

    // Configured but missing schema files are non-fatal: fall back to
    // host-based introspection.
    let schema_path = desc.schema.filter(|path| {
        let exists = path.exists();
        if !exists {
            tracing::warn!(
                client = name.as_str(),
                path = %path.display(),
                "Schema file does not exist; falling back to host introspection"
            );
        }
        exists
    });

    Ok(ClientConfig {
        host,
        client_host,
        token,
        headers: desc.headers,
        proxy_cookies: desc.proxy_cookies.unwrap_or(true),
        schema_path,
        retain_token: desc.retain_token,
    })
}
