//! Bearer-token authentication from a pre-issued JWT

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use parking_lot::RwLock;
use serde::Deserialize;
use serde_json::Value;

use super::AuthProvider;

/// Claims the dashboard reads from the token payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JwtClaims {
    #[serde(default)]
    pub sub: Option<Value>,
    #[serde(default)]
    pub exp: Option<i64>,
}

impl JwtClaims {
    /// Numeric user id from `sub` (string or number)
    pub fn user_id(&self) -> Option<i64> {
        match self.sub.as_ref()? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }
}

/// Decode the payload segment of a three-part JWT (signature not verified)
pub fn decode_claims(token: &str) -> Option<JwtClaims> {
    let parts: Vec<&str> = token.trim().split('.').collect();
    if parts.len() != 3 {
        return None;
    }
    let payload = URL_SAFE_NO_PAD
        .decode(parts[1].trim_end_matches('='))
        .ok()?;
    serde_json::from_slice(&payload).ok()
}

/// Token supplied on the command line or environment
///
/// Authenticated while the token has three segments and an `exp` in the future.
#[derive(Debug, Default)]
pub struct TokenAuth {
    token: RwLock<Option<String>>,
}

impl TokenAuth {
    pub fn new(token: impl Into<String>) -> Self {
        let token = token.into();
        let token = token.trim();
        Self {
            token: RwLock::new((!token.is_empty()).then(|| token.to_string())),
        }
    }

    pub fn claims(&self) -> Option<JwtClaims> {
        self.token.read().as_deref().and_then(decode_claims)
    }

    /// Seconds until expiry (negative once expired)
    pub fn seconds_until_expiry(&self) -> Option<i64> {
        let exp = self.claims()?.exp?;
        Some(exp - Utc::now().timestamp())
    }

    /// True when the token expires within `window_secs`
    pub fn is_expiring(&self, window_secs: i64) -> bool {
        self.seconds_until_expiry()
            .map_or(true, |remaining| remaining < window_secs)
    }
}

impl AuthProvider for TokenAuth {
    fn is_authenticated(&self) -> bool {
        self.seconds_until_expiry()
            .is_some_and(|remaining| remaining > 0)
    }

    fn current_token(&self) -> Option<String> {
        self.token.read().clone()
    }

    fn on_logout(&self) {
        if self.token.write().take().is_some() {
            tracing::info!("Session ended, token cleared");
        }
    }
}
