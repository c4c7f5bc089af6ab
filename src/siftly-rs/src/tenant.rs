//! Tenant tokens: HS256-signed JWTs that restrict searches for a delegated
//! client without exposing the signing key.
//!
//! The claims carry the search rules verbatim, the first 8 characters of the
//! signing key (so the server can find the parent key) and an optional
//! expiration.

use crate::{Client, ClientError, Result};
use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};

const KEY_PREFIX_LEN: usize = 8;

#[derive(Debug, Clone, Default)]
pub struct TenantTokenOptions {
    /// Signing key; falls back to the client's configured key
    pub api_key: Option<String>,
    /// Must be strictly in the future when set
    pub expires_at: Option<DateTime<Utc>>,
}

impl TenantTokenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TenantTokenClaims {
    pub search_rules: serde_json::Value,
    pub api_key_prefix: String,
    /// Expiration as unix seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

impl Client {
    /// Sign a tenant token restricting searches to `search_rules`.
    ///
    /// `search_rules` must be a non-empty object (index uid to rule) or a
    /// non-empty array of index uids. No request is made.
    pub fn generate_tenant_token(
        &self,
        search_rules: serde_json::Value,
        options: &TenantTokenOptions,
    ) -> Result<String> {
        issue_tenant_token(
            search_rules,
            options,
            self.config.api_key.as_deref(),
            Utc::now(),
        )
    }
}

fn issue_tenant_token(
    search_rules: serde_json::Value,
    options: &TenantTokenOptions,
    default_key: Option<&str>,
    now: DateTime<Utc>,
) -> Result<String> {
    let has_rules = match &search_rules {
        serde_json::Value::Object(rules) => !rules.is_empty(),
        serde_json::Value::Array(rules) => !rules.is_empty(),
        _ => false,
    };
    if !has_rules {
        return Err(ClientError::Validation(
            "search rules must be a non-empty object or array".to_string(),
        ));
    }

    let secret = options
        .api_key
        .as_deref()
        .filter(|k| !k.is_empty())
        .or(default_key.filter(|k| !k.is_empty()))
        .ok_or_else(|| {
            ClientError::Validation("an API key is required to sign a tenant token".to_string())
        })?;
    if secret.chars().count() < KEY_PREFIX_LEN {
        return Err(ClientError::Validation(format!(
            "the signing API key must be at least {} characters long",
            KEY_PREFIX_LEN
        )));
    }

    // `exp` carries whole seconds, so compare at that resolution
    if let Some(expires_at) = options.expires_at {
        if expires_at.timestamp() <= now.timestamp() {
            return Err(ClientError::Validation(
                "the token expiration must be in the future".to_string(),
            ));
        }
    }

    let claims = TenantTokenClaims {
        search_rules,
        api_key_prefix: secret.chars().take(KEY_PREFIX_LEN).collect(),
        exp: options.expires_at.map(|at| at.timestamp()),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok(token)
}
