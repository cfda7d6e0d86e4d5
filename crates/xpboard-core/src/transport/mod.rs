//! Collaborator seams: authentication and GraphQL transport
//!
//! The dashboard only consumes these traits. Default implementations are a
//! bearer-token provider (`auth`) and a reqwest client (`http`).

use async_trait::async_trait;
use serde_json::Value;

use crate::error::CoreError;

pub mod auth;
pub mod http;

pub use auth::{JwtClaims, TokenAuth};
pub use http::HttpTransport;

/// Session state owned outside the dashboard
pub trait AuthProvider: Send + Sync {
    fn is_authenticated(&self) -> bool;

    fn current_token(&self) -> Option<String>;

    /// End the session (token dropped, caller returns to signed-out state)
    fn on_logout(&self);
}

/// Executes one GraphQL document and returns its `data` payload
#[async_trait]
pub trait GraphQlTransport: Send + Sync {
    /// Fails with `AuthExpired`, `Network` or `GraphQl`
    async fn query(&self, document: &str, variables: Value) -> Result<Value, CoreError>;
}
