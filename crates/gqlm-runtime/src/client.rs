//! Thin HTTP transport for GraphQL requests.
//!
//! One [`GqlClient`] wraps one endpoint. It knows nothing about clients,
//! sessions, or operation ownership; it posts a standard GraphQL request
//! body and folds transport and GraphQL-level failures into a single
//! [`DispatchFailure`] shape for the session to contextualize.

use gqlm_core::GqlError;
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use tracing::debug;

/// A GraphQL endpoint bound to a shared HTTP connection pool.
#[derive(Debug, Clone)]
pub struct GqlClient {
    http: reqwest::Client,
    endpoint: String,
}

/// Why a dispatched request failed.
///
/// Transport errors carry a synthesized single-entry error list so that
/// callers always have a message to surface.
#[derive(Debug, Clone)]
pub struct DispatchFailure {
    /// HTTP status code when the transport produced one.
    pub status_code: Option<u16>,
    /// GraphQL-level errors, or a synthesized transport error.
    pub gql_errors: Option<Vec<GqlError>>,
}

impl DispatchFailure {
    fn transport(message: String, status_code: Option<u16>) -> Self {
        Self {
            status_code,
            gql_errors: Some(vec![GqlError {
                message,
                path: None,
                extensions: None,
            }]),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GqlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<GqlError>>,
}

impl GqlClient {
    /// Creates a client for one endpoint on a shared connection pool.
    #[must_use]
    pub fn new(http: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }

    /// Endpoint URL this client posts to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Posts a GraphQL request and returns the response `data` value.
    ///
    /// # Errors
    ///
    /// Returns a [`DispatchFailure`] when the transport fails, the server
    /// responds with a non-success status, or the response carries a
    /// non-empty `errors` array.
    pub async fn request(
        &self,
        query: &str,
        operation_name: &str,
        variables: Option<Value>,
        headers: &BTreeMap<String, String>,
    ) -> Result<Value, DispatchFailure> {
        let body = json!({
            "query": query,
            "variables": variables.unwrap_or(Value::Null),
            "operationName": operation_name,
        });

        let mut request = self.http.post(&self.endpoint).json(&body);
        for (name, value) in headers {
            request = request.header(name, value);
        }

        debug!(endpoint = %self.endpoint, operation = operation_name, "Dispatching GraphQL request");

        let response = request
            .send()
            .await
            .map_err(|err| DispatchFailure::transport(err.to_string(), err.status().map(|s| s.as_u16())))?;

        let status = response.status();
        let parsed: GqlResponse = match response.json().await {
            Ok(parsed) => parsed,
            Err(err) => {
                return Err(DispatchFailure::transport(
                    err.to_string(),
                    Some(status.as_u16()),
                ));
            }
        };

        let has_errors = parsed.errors.as_ref().is_some_and(|errors| !errors.is_empty());
        if !status.is_success() || has_errors {
            return Err(DispatchFailure {
                status_code: Some(status.as_u16()),
                gql_errors: parsed.errors.filter(|errors| !errors.is_empty()),
            });
        }

        Ok(parsed.data.unwrap_or(Value::Null))
    }
}
