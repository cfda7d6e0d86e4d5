//! GraphQL over HTTP with reqwest

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

use super::{AuthProvider, GraphQlTransport};
use crate::error::CoreError;

/// Default platform endpoint
pub const DEFAULT_ENDPOINT: &str = "https://learn.reboot01.com/api/graphql-engine/v1/graphql";

const AUTH_ERROR_MARKERS: [&str; 3] = ["JWT", "authentication", "unauthorized"];

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<GraphQlError>>,
}

/// Map an HTTP status and body onto the `data` payload or a typed failure
pub fn interpret_response(status: u16, body: &str) -> Result<Value, CoreError> {
    if status == 401 {
        return Err(CoreError::AuthExpired {
            message: "server rejected the token (401)".to_string(),
        });
    }
    if !(200..300).contains(&status) {
        return Err(CoreError::network(format!("HTTP {}: {}", status, body.trim())));
    }

    let response: GraphQlResponse =
        serde_json::from_str(body).map_err(|source| CoreError::Decode {
            what: "GraphQL response".to_string(),
            source,
        })?;

    if let Some(errors) = response.errors.filter(|e| !e.is_empty()) {
        if let Some(auth) = errors
            .iter()
            .find(|e| AUTH_ERROR_MARKERS.iter().any(|m| e.message.contains(m)))
        {
            return Err(CoreError::AuthExpired {
                message: auth.message.clone(),
            });
        }
        return Err(CoreError::GraphQl {
            message: errors[0].message.clone(),
        });
    }

    response.data.ok_or_else(|| CoreError::DataUnavailable {
        what: "response without data".to_string(),
    })
}

/// POSTs documents to a GraphQL endpoint with the provider's bearer token
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
    auth: Arc<dyn AuthProvider>,
}

impl HttpTransport {
    pub fn new(
        endpoint: impl Into<String>,
        auth: Arc<dyn AuthProvider>,
        timeout: Duration,
    ) -> Result<Self, CoreError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("xpboard/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            auth,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl GraphQlTransport for HttpTransport {
    async fn query(&self, document: &str, variables: Value) -> Result<Value, CoreError> {
        let token = self
            .auth
            .current_token()
            .ok_or(CoreError::NotAuthenticated)?;
        if token.split('.').count() != 3 {
            return Err(CoreError::AuthExpired {
                message: "invalid token format".to_string(),
            });
        }

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(token.trim())
            .json(&json!({ "query": document, "variables": variables }))
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        tracing::debug!(status, bytes = body.len(), "GraphQL response received");

        interpret_response(status, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_payload_returned() {
        let data = interpret_response(200, r#"{"data":{"user":[{"id":1}]}}"#).unwrap();
        assert_eq!(data["user"][0]["id"], 1);
    }

    #[test]
    fn test_unauthorized_status_is_auth_failure() {
        let err = interpret_response(401, "").unwrap_err();
        assert!(err.is_auth_failure());
    }

    #[test]
    fn test_graphql_auth_errors_detected() {
        let body = r#"{"errors":[{"message":"Could not verify JWT: JWTExpired"}]}"#;
        assert!(interpret_response(200, body).unwrap_err().is_auth_failure());
    }

    #[test]
    fn test_other_graphql_errors_keep_first_message() {
        let body = r#"{"errors":[{"message":"field 'foo' not found"},{"message":"second"}]}"#;
        match interpret_response(200, body) {
            Err(CoreError::GraphQl { message }) => assert_eq!(message, "field 'foo' not found"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_server_errors_and_garbage() {
        assert!(matches!(
            interpret_response(502, "bad gateway"),
            Err(CoreError::Network { .. })
        ));
        assert!(matches!(
            interpret_response(200, "<html>"),
            Err(CoreError::Decode { .. })
        ));
        assert!(matches!(
            interpret_response(200, "{}"),
            Err(CoreError::DataUnavailable { .. })
        ));
    }
}
