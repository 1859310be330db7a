//! Runtime dispatch session.
//!
//! A [`Session`] owns the finalized client configuration, the operation
//! registry, and an operation catalog (name to query text). Client state
//! (effective request options per client) is initialized lazily on first
//! use and mutated through patch-based setters. Dispatch resolves the
//! owning client from the registry, snapshots that client's transport and
//! headers under the lock, releases the lock, and performs the request.
//!
//! # Examples
//!
//! ```no_run
//! use gqlm_core::{ClientSource, GqlConfig, OperationRegistry};
//! use gqlm_runtime::{OperationCatalog, OperationKind, Session};
//!
//! # async fn demo() -> gqlm_core::Result<()> {
//! let config = GqlConfig::builder()
//!     .client("default", ClientSource::host("https://api.example.com/graphql"))
//!     .build()?;
//! let mut registry = OperationRegistry::new();
//! registry.add_client("default".into());
//! registry.register(&"default".into(), "GetUser".into());
//!
//! let mut catalog = OperationCatalog::new();
//! catalog.insert("GetUser", OperationKind::Query, "query GetUser { user { id } }");
//!
//! let session = Session::new(config, registry, catalog);
//! let data = session.dispatch("GetUser", None).await?;
//! # let _ = data;
//! # Ok(())
//! # }
//! ```

use crate::client::GqlClient;
use crate::state::RequestOptions;
use gqlm_core::{
    ClientConfig, ClientName, CorsConfig, Error, ErrorRecord, GqlConfig, OperationName,
    OperationRegistry, Result,
};
use serde_json::{Map, Value, json};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Where the session is executing, which decides host selection and
/// cookie forwarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClientContext {
    /// Server-side context: uses the primary host and may forward the
    /// inbound cookie header.
    #[default]
    Server,
    /// Browser context: prefers the client-side host override and never
    /// forwards cookies.
    Browser,
}

/// GraphQL operation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    /// A `query` operation.
    Query,
    /// A `mutation` operation.
    Mutation,
    /// A `subscription` operation.
    Subscription,
}

impl OperationKind {
    /// Lowercase keyword for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Mutation => "mutation",
            Self::Subscription => "subscription",
        }
    }
}

/// One dispatchable operation: its kind and full query text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationEntry {
    /// Operation kind.
    pub kind: OperationKind,
    /// Full document text sent as the request `query`.
    pub query: String,
}

/// Name-keyed catalog of dispatchable operations.
#[derive(Debug, Clone, Default)]
pub struct OperationCatalog {
    entries: BTreeMap<OperationName, OperationEntry>,
}

impl OperationCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an operation. A repeated name overwrites the previous
    /// entry.
    pub fn insert(
        &mut self,
        name: impl Into<OperationName>,
        kind: OperationKind,
        query: impl Into<String>,
    ) {
        self.entries.insert(
            name.into(),
            OperationEntry {
                kind,
                query: query.into(),
            },
        );
    }

    /// Looks up an operation by name.
    #[must_use]
    pub fn get(&self, name: &OperationName) -> Option<&OperationEntry> {
        self.entries.get(name)
    }

    /// Number of cataloged operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no operations are cataloged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Handler invoked with every captured dispatch failure.
pub type ErrorHandler = Arc<dyn Fn(&ErrorRecord) + Send + Sync>;

struct ClientState {
    instance: GqlClient,
    defaults: RequestOptions,
    options: RequestOptions,
}

struct SessionState {
    clients: HashMap<ClientName, ClientState>,
    handler: Option<ErrorHandler>,
    last_error: Option<ErrorRecord>,
}

/// Stateful multi-client dispatch session.
///
/// Cheap to share behind an `Arc`; all mutation goes through the internal
/// lock.
pub struct Session {
    config: GqlConfig,
    registry: OperationRegistry,
    catalog: OperationCatalog,
    context: ClientContext,
    inbound_cookie: Option<String>,
    http: reqwest::Client,
    state: Mutex<Option<SessionState>>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("context", &self.context)
            .field("clients", &self.config.client_names().count())
            .field("operations", &self.catalog.len())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Creates a session in the server context.
    #[must_use]
    pub fn new(config: GqlConfig, registry: OperationRegistry, catalog: OperationCatalog) -> Self {
        Self {
            config,
            registry,
            catalog,
            context: ClientContext::Server,
            inbound_cookie: None,
            http: reqwest::Client::new(),
            state: Mutex::new(None),
        }
    }

    /// Sets the execution context.
    #[must_use]
    pub fn with_context(mut self, context: ClientContext) -> Self {
        self.context = context;
        self
    }

    /// Sets the inbound request cookie header, forwarded to clients with
    /// cookie proxying enabled when running server-side.
    #[must_use]
    pub fn with_inbound_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.inbound_cookie = Some(cookie.into());
        self
    }

    /// Resolves the client that owns an operation, falling back to the
    /// attribution fallback for unknown names.
    #[must_use]
    pub fn resolve_client(&self, operation: &OperationName) -> ClientName {
        self.registry.resolve_client(operation)
    }

    /// The most recently captured dispatch failure, if any.
    pub async fn last_error(&self) -> Option<ErrorRecord> {
        let guard = self.state.lock().await;
        guard.as_ref().and_then(|state| state.last_error.clone())
    }

    /// Registers the single error handler.
    ///
    /// If a failure was already captured before registration, the handler
    /// is invoked with it immediately. A second registration replaces the
    /// first.
    pub async fn on_error(&self, handler: impl Fn(&ErrorRecord) + Send + Sync + 'static) {
        let handler: ErrorHandler = Arc::new(handler);
        let pending = {
            let mut guard = self.state.lock().await;
            let state = Self::state_mut(
                &mut guard,
                &self.config,
                self.context,
                self.inbound_cookie.as_deref(),
                &self.http,
            );
            state.handler = Some(Arc::clone(&handler));
            state.last_error.clone()
        };
        if let Some(record) = pending {
            debug!(operation = %record.operation_name, "Replaying captured failure to new error handler");
            handler(&record);
        }
    }

    /// Dispatches an operation to its owning client.
    ///
    /// Returns the response `data` value. Failures are captured as an
    /// [`ErrorRecord`], delivered to the registered handler, and returned
    /// as [`Error::Dispatch`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownOperation`] for a name absent from the
    /// catalog and [`Error::Dispatch`] for transport or GraphQL failures.
    pub async fn dispatch(
        &self,
        operation: impl Into<OperationName>,
        variables: Option<Value>,
    ) -> Result<Value> {
        let operation = operation.into();
        let client = self.registry.resolve_client(&operation);
        self.dispatch_to(&client, operation, variables).await
    }

    /// Dispatches an operation to an explicitly chosen client, bypassing
    /// registry resolution.
    ///
    /// # Errors
    ///
    /// Same as [`Session::dispatch`], plus [`Error::UnknownClient`] for an
    /// unconfigured client.
    pub async fn dispatch_to(
        &self,
        client: &ClientName,
        operation: impl Into<OperationName>,
        variables: Option<Value>,
    ) -> Result<Value> {
        let operation = operation.into();
        let client = client.clone();
        let entry = self
            .catalog
            .get(&operation)
            .ok_or_else(|| Error::UnknownOperation {
                operation: operation.to_string(),
            })?
            .clone();

        // Snapshot the transport and headers, then release the lock for
        // the duration of the request.
        let (instance, headers, handler) = {
            let mut guard = self.state.lock().await;
            let state = Self::state_mut(
                &mut guard,
                &self.config,
                self.context,
                self.inbound_cookie.as_deref(),
                &self.http,
            );
            let client_state =
                state
                    .clients
                    .get(&client)
                    .ok_or_else(|| Error::UnknownClient {
                        client: client.to_string(),
                    })?;
            (
                client_state.instance.clone(),
                client_state.options.headers(),
                state.handler.clone(),
            )
        };

        match instance
            .request(&entry.query, operation.as_str(), variables, &headers)
            .await
        {
            Ok(data) => Ok(data),
            Err(failure) => {
                let record = ErrorRecord {
                    client,
                    operation_type: Some(entry.kind.as_str().to_string()),
                    operation_name: operation,
                    status_code: failure.status_code,
                    gql_errors: failure.gql_errors,
                };
                warn!(
                    client = %record.client,
                    operation = %record.operation_name,
                    status = record.status_code,
                    "GraphQL dispatch failed"
                );
                {
                    let mut guard = self.state.lock().await;
                    if let Some(state) = guard.as_mut() {
                        state.last_error = Some(record.clone());
                    }
                }
                if let Some(handler) = handler {
                    handler(&record);
                }
                Err(Error::Dispatch(record))
            }
        }
    }

    /// Applies a raw options patch to one client's state.
    ///
    /// An empty patch resets the client to empty options (the configured
    /// defaults are only restored through [`Session::set_headers`] with
    /// `respect_defaults`); an all-falsy patch deletes the named keys;
    /// anything else merges.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownClient`] for an unconfigured client.
    pub async fn patch_options(&self, client: Option<&ClientName>, patch: &Value) -> Result<()> {
        let client = self.target_client(client)?;
        let mut guard = self.state.lock().await;
        let state = Self::state_mut(
            &mut guard,
            &self.config,
            self.context,
            self.inbound_cookie.as_deref(),
            &self.http,
        );
        let client_state = state
            .clients
            .get_mut(&client)
            .ok_or_else(|| Error::UnknownClient {
                client: client.into_inner(),
            })?;
        client_state.options.patch(patch);
        Ok(())
    }

    /// Replaces or clears one client's runtime headers.
    ///
    /// An empty or null `headers` value clears the runtime headers; with
    /// `respect_defaults` it instead restores the configured defaults
    /// (static headers, token header, proxied cookie). A non-empty value
    /// is merged, with falsy values deleting their key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownClient`] for an unconfigured client.
    pub async fn set_headers(
        &self,
        client: Option<&ClientName>,
        headers: Value,
        respect_defaults: bool,
    ) -> Result<()> {
        let empty = match &headers {
            Value::Object(map) => map.is_empty(),
            Value::Null => true,
            _ => false,
        };
        if empty && respect_defaults {
            let client = self.target_client(client)?;
            let mut guard = self.state.lock().await;
            let state = Self::state_mut(
                &mut guard,
                &self.config,
                self.context,
                self.inbound_cookie.as_deref(),
                &self.http,
            );
            let client_state =
                state
                    .clients
                    .get_mut(&client)
                    .ok_or_else(|| Error::UnknownClient {
                        client: client.into_inner(),
                    })?;
            client_state.options = client_state.defaults.clone();
            return Ok(());
        }

        let patch = if empty {
            json!({ "headers": Value::Null })
        } else {
            json!({ "headers": headers })
        };
        self.patch_options(client, &patch).await
    }

    /// Sets or clears one client's auth token.
    ///
    /// The header name and scheme come from the client's token
    /// configuration. A `None` or empty token deletes the header, which
    /// also clears a token configured statically.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownClient`] for an unconfigured client.
    pub async fn set_token(&self, client: Option<&ClientName>, token: Option<&str>) -> Result<()> {
        let client = self.target_client(client)?;
        let token_config = self
            .config
            .client(client.as_str())
            .map(|config| config.token.clone())
            .ok_or_else(|| Error::UnknownClient {
                client: client.to_string(),
            })?;

        let header_value = match token.filter(|t| !t.is_empty()) {
            Some(value) => Value::String(
                format!("{} {value}", token_config.token_type)
                    .trim()
                    .to_string(),
            ),
            None => Value::Null,
        };
        let mut header_patch = Map::new();
        header_patch.insert(token_config.name, header_value);
        let patch = json!({ "headers": header_patch });
        self.patch_options(Some(&client), &patch).await
    }

    /// Sets one client's CORS options. Fields left unset are untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownClient`] for an unconfigured client.
    pub async fn set_cors(&self, client: Option<&ClientName>, cors: &CorsConfig) -> Result<()> {
        let mut patch = Map::new();
        if let Some(mode) = &cors.mode {
            patch.insert("mode".to_string(), Value::String(mode.clone()));
        }
        if let Some(credentials) = &cors.credentials {
            patch.insert("credentials".to_string(), Value::String(credentials.clone()));
        }
        if patch.is_empty() {
            return Ok(());
        }
        self.patch_options(client, &Value::Object(patch)).await
    }

    /// Effective request options snapshot for one client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownClient`] for an unconfigured client.
    pub async fn client_options(&self, client: Option<&ClientName>) -> Result<RequestOptions> {
        let client = self.target_client(client)?;
        let mut guard = self.state.lock().await;
        let state = Self::state_mut(
            &mut guard,
            &self.config,
            self.context,
            self.inbound_cookie.as_deref(),
            &self.http,
        );
        state
            .clients
            .get(&client)
            .map(|client_state| client_state.options.clone())
            .ok_or_else(|| Error::UnknownClient {
                client: client.into_inner(),
            })
    }

    fn target_client(&self, client: Option<&ClientName>) -> Result<ClientName> {
        let client = client.cloned().unwrap_or_else(ClientName::default_client);
        if self.config.client(client.as_str()).is_none() {
            return Err(Error::UnknownClient {
                client: client.into_inner(),
            });
        }
        Ok(client)
    }

    /// Initializes per-client state on first access.
    fn state_mut<'a>(
        guard: &'a mut Option<SessionState>,
        config: &GqlConfig,
        context: ClientContext,
        inbound_cookie: Option<&str>,
        http: &reqwest::Client,
    ) -> &'a mut SessionState {
        guard.get_or_insert_with(|| {
            let clients = config
                .clients()
                .map(|(name, client_config)| {
                    let endpoint = Self::endpoint_for(client_config, context);
                    let defaults = RequestOptions::with_headers(Self::initial_headers(
                        client_config,
                        context,
                        inbound_cookie,
                    ));
                    debug!(client = %name, endpoint = %endpoint, "Initializing GraphQL client state");
                    (
                        name.clone(),
                        ClientState {
                            instance: GqlClient::new(http.clone(), endpoint),
                            options: defaults.clone(),
                            defaults,
                        },
                    )
                })
                .collect();
            SessionState {
                clients,
                handler: None,
                last_error: None,
            }
        })
    }

    fn endpoint_for(config: &ClientConfig, context: ClientContext) -> String {
        if context == ClientContext::Browser
            && let Some(client_host) = &config.client_host
        {
            return client_host.clone();
        }
        config.host.clone()
    }

    fn initial_headers(
        config: &ClientConfig,
        context: ClientContext,
        inbound_cookie: Option<&str>,
    ) -> BTreeMap<String, String> {
        let mut headers = config.headers.clone();
        if let Some(value) = config.token.header_value() {
            headers.insert(config.token.name.clone(), value);
        }
        if config.proxy_cookies
            && context == ClientContext::Server
            && let Some(cookie) = inbound_cookie
        {
            headers.insert("Cookie".to_string(), cookie.to_string());
        }
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gqlm_core::{ClientSource, TokenConfig};

    fn config() -> GqlConfig {
        GqlConfig::builder()
            .client(
                "default",
                ClientSource::full("https://api.test/graphql")
                    .client_host("https://edge.test/graphql")
                    .token_value("secret")
                    .header("X-App", "demo"),
            )
            .client("blog", ClientSource::host("https://blog.test/graphql"))
            .build_with_env(&BTreeMap::<String, String>::new())
            .unwrap()
    }

    fn session() -> Session {
        let config = config();
        let mut registry = OperationRegistry::new();
        for name in config.client_names() {
            registry.add_client(name.clone());
        }
        registry.register(&"default".into(), "GetUser".into());
        registry.register(&"blog".into(), "GetPosts".into());

        let mut catalog = OperationCatalog::new();
        catalog.insert(
            "GetUser",
            OperationKind::Query,
            "query GetUser { user { id } }",
        );
        catalog.insert(
            "GetPosts",
            OperationKind::Query,
            "query GetPosts { posts { id } }",
        );
        Session::new(config, registry, catalog)
    }

    #[tokio::test]
    async fn test_initial_headers_include_token_and_static() {
        let session = session();
        let options = session.client_options(None).await.unwrap();
        let headers = options.headers();
        assert_eq!(
            headers.get("Authorization").map(String::as_str),
            Some("Bearer secret")
        );
        assert_eq!(headers.get("X-App").map(String::as_str), Some("demo"));
    }

    #[tokio::test]
    async fn test_inbound_cookie_forwarded_server_side_only() {
        let config = config();
        let server = Session::new(
            config.clone(),
            OperationRegistry::new(),
            OperationCatalog::new(),
        )
        .with_inbound_cookie("session=abc");
        let headers = server.client_options(None).await.unwrap().headers();
        assert_eq!(headers.get("Cookie").map(String::as_str), Some("session=abc"));

        let browser = Session::new(config, OperationRegistry::new(), OperationCatalog::new())
            .with_context(ClientContext::Browser)
            .with_inbound_cookie("session=abc");
        let headers = browser.client_options(None).await.unwrap().headers();
        assert!(!headers.contains_key("Cookie"));
    }

    #[tokio::test]
    async fn test_set_token_overrides_and_clears() {
        let session = session();
        session.set_token(None, Some("rotated")).await.unwrap();
        let headers = session.client_options(None).await.unwrap().headers();
        assert_eq!(
            headers.get("Authorization").map(String::as_str),
            Some("Bearer rotated")
        );

        session.set_token(None, None).await.unwrap();
        let headers = session.client_options(None).await.unwrap().headers();
        assert!(!headers.contains_key("Authorization"));
        assert_eq!(headers.get("X-App").map(String::as_str), Some("demo"));
    }

    #[tokio::test]
    async fn test_set_headers_merges_and_restores_defaults() {
        let session = session();
        session
            .set_headers(None, serde_json::json!({"X-Trace": "1"}), false)
            .await
            .unwrap();
        let headers = session.client_options(None).await.unwrap().headers();
        assert_eq!(headers.get("X-Trace").map(String::as_str), Some("1"));
        assert_eq!(headers.get("X-App").map(String::as_str), Some("demo"));

        session.set_headers(None, Value::Null, true).await.unwrap();
        let headers = session.client_options(None).await.unwrap().headers();
        assert!(!headers.contains_key("X-Trace"));
        assert_eq!(
            headers.get("Authorization").map(String::as_str),
            Some("Bearer secret")
        );
    }

    #[tokio::test]
    async fn test_clearing_headers_without_defaults() {
        let session = session();
        session.set_headers(None, Value::Null, false).await.unwrap();
        let headers = session.client_options(None).await.unwrap().headers();
        assert!(headers.is_empty());
    }

    #[tokio::test]
    async fn test_empty_patch_empties_options() {
        let session = session();
        session
            .set_cors(
                None,
                &CorsConfig {
                    mode: Some("cors".to_string()),
                    credentials: None,
                },
            )
            .await
            .unwrap();

        session
            .patch_options(None, &serde_json::json!({}))
            .await
            .unwrap();
        let options = session.client_options(None).await.unwrap();
        assert!(options.is_empty());
    }

    #[tokio::test]
    async fn test_set_cors_patches_mode_and_credentials() {
        let session = session();
        session
            .set_cors(
                Some(&"blog".into()),
                &CorsConfig {
                    mode: Some("cors".to_string()),
                    credentials: Some("include".to_string()),
                },
            )
            .await
            .unwrap();
        let options = session.client_options(Some(&"blog".into())).await.unwrap();
        assert_eq!(options.mode(), Some("cors"));
        assert_eq!(options.credentials(), Some("include"));
    }

    #[tokio::test]
    async fn test_unknown_client_rejected() {
        let session = session();
        let err = session
            .set_token(Some(&"missing".into()), Some("x"))
            .await
            .unwrap_err();
        assert!(err.is_unknown_client());
    }

    #[tokio::test]
    async fn test_unknown_operation_rejected() {
        let session = session();
        let err = session.dispatch("Nope", None).await.unwrap_err();
        assert!(matches!(err, Error::UnknownOperation { .. }));
    }

    #[tokio::test]
    async fn test_resolve_client_uses_registry() {
        let session = session();
        assert_eq!(
            session.resolve_client(&"GetPosts".into()).as_str(),
            "blog"
        );
        assert_eq!(
            session.resolve_client(&"Unregistered".into()).as_str(),
            "default"
        );
    }

    #[test]
    fn test_operation_kind_keywords() {
        assert_eq!(OperationKind::Query.as_str(), "query");
        assert_eq!(OperationKind::Mutation.as_str(), "mutation");
        assert_eq!(OperationKind::Subscription.as_str(), "subscription");
    }

    #[test]
    fn test_empty_token_type_produces_raw_header() {
        let token = TokenConfig {
            value: Some("raw".to_string()),
            token_type: String::new(),
            ..TokenConfig::default()
        };
        assert_eq!(token.header_value().as_deref(), Some("raw"));
    }
}
