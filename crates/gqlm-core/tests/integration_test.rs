//! Integration tests for gqlm-core
//!
//! These tests validate full configuration resolution against a fixed
//! environment and the registry behavior the codegen and runtime crates
//! rely on.

use gqlm_core::{
    ClientName, ClientSource, Error, GqlConfig, OperationRegistry, TokenConfig,
};
use std::collections::BTreeMap;

fn env(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
        .collect()
}

/// Tests a config with no declared clients resolves from GQL_HOST.
#[test]
fn test_env_only_configuration() {
    let config = GqlConfig::builder()
        .build_with_env(&env(&[
            ("GQL_HOST", "https://api.test/graphql"),
            ("GQL_CLIENT_HOST", "https://edge.test/graphql"),
            ("GQL_TOKEN", "from-env"),
        ]))
        .unwrap();

    let client = config.client("default").unwrap();
    assert_eq!(client.host, "https://api.test/graphql");
    assert_eq!(client.client_host.as_deref(), Some("https://edge.test/graphql"));
    assert_eq!(client.token.value.as_deref(), Some("from-env"));
}

/// Tests per-client environment overrides beat declared values.
#[test]
fn test_client_env_overrides() {
    let config = GqlConfig::builder()
        .client("default", ClientSource::host("https://declared.test"))
        .client(
            "blog",
            ClientSource::full("https://blog.test").token_value("declared"),
        )
        .build_with_env(&env(&[
            ("GQL_BLOG_HOST", "https://override.test"),
            ("GQL_BLOG_TOKEN", "rotated"),
            ("GQL_BLOG_TOKEN_NAME", "X-Api-Key"),
        ]))
        .unwrap();

    let blog = config.client("blog").unwrap();
    assert_eq!(blog.host, "https://override.test");
    assert_eq!(blog.token.value.as_deref(), Some("rotated"));
    assert_eq!(blog.token.name, "X-Api-Key");

    // The default client is untouched by blog-scoped variables.
    assert_eq!(config.client("default").unwrap().host, "https://declared.test");
}

/// Tests a client with no host anywhere fails resolution.
#[test]
fn test_missing_host_is_fatal() {
    let err = GqlConfig::builder()
        .client("blog", ClientSource::Descriptor(Box::default()))
        .build_with_env(&BTreeMap::<String, String>::new())
        .unwrap_err();
    assert!(matches!(err, Error::MissingClientHost { client } if client == "blog"));
}

/// Tests the public view redacts token values unless retention is opted
/// into.
#[test]
fn test_public_view_redacts_tokens() {
    let config = GqlConfig::builder()
        .client(
            "default",
            ClientSource::full("https://a.test").token_value("secret"),
        )
        .client(
            "blog",
            ClientSource::full("https://b.test")
                .token_value("kept")
                .retain_token(true),
        )
        .build_with_env(&BTreeMap::<String, String>::new())
        .unwrap();

    let public: BTreeMap<_, _> = config
        .public_clients()
        .into_iter()
        .map(|(name, client)| (name.into_inner(), client))
        .collect();
    assert_eq!(public["default"].token.value, None);
    assert_eq!(public["blog"].token.value.as_deref(), Some("kept"));
}

/// Tests the fallback client is `default` when present, else the first
/// declared client.
#[test]
fn test_fallback_client_selection() {
    let with_default = GqlConfig::builder()
        .client("blog", ClientSource::host("https://b.test"))
        .client("default", ClientSource::host("https://a.test"))
        .build_with_env(&BTreeMap::<String, String>::new())
        .unwrap();
    assert_eq!(with_default.fallback_client().as_str(), "default");

    let without_default = GqlConfig::builder()
        .client("blog", ClientSource::host("https://b.test"))
        .client("shop", ClientSource::host("https://s.test"))
        .build_with_env(&BTreeMap::<String, String>::new())
        .unwrap();
    assert_eq!(without_default.fallback_client().as_str(), "blog");
    assert!(without_default.needs_normalization());
}

/// Tests registry ownership: first attribution wins and unknown
/// operations resolve to the default client.
#[test]
fn test_registry_ownership_and_resolution() {
    let mut registry = OperationRegistry::new();
    registry.add_client(ClientName::default_client());
    registry.add_client(ClientName::new("blog"));

    assert!(registry.register(&"blog".into(), "GetPosts".into()));
    assert!(!registry.register(&"default".into(), "GetPosts".into()));

    assert_eq!(registry.owner(&"GetPosts".into()).unwrap().as_str(), "blog");
    assert_eq!(registry.resolve_client(&"GetPosts".into()).as_str(), "blog");
    assert_eq!(registry.resolve_client(&"Unknown".into()).as_str(), "default");
}

/// Tests token header formatting, including an explicitly empty scheme.
#[test]
fn test_token_header_formatting() {
    assert_eq!(
        TokenConfig::with_value("abc").header_value().as_deref(),
        Some("Bearer abc")
    );

    let raw = TokenConfig {
        value: Some("raw-token".to_string()),
        token_type: String::new(),
        ..TokenConfig::default()
    };
    assert_eq!(raw.header_value().as_deref(), Some("raw-token"));

    assert_eq!(TokenConfig::default().header_value(), None);
}
