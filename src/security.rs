// ==============================================================================
// security.rs - Token Validation
// ==============================================================================
// Description: Bearer credential parsing and token-to-identity validation
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================
//
// Security: The static validator is demo-grade. A deployment that issues
// signed tokens replaces `StaticTokenValidator` with a validator that checks
// signature and expiry; the `TokenValidator` contract stays the same.
//
// ==============================================================================

use anyhow::{bail, Result};
use std::collections::HashMap;

use crate::error::AuthError;
use crate::models::Identity;

// ==============================================================================
// CONSTANTS
// ==============================================================================

/// Case-sensitive authorization scheme
const BEARER_SCHEME: &str = "Bearer";

/// Built-in demo credential
pub const DEMO_TOKEN: &str = "demo-valid-token";

// ==============================================================================
// CREDENTIAL PARSING
// ==============================================================================

/// Extracts the credential from a raw `Authorization` header value
///
/// The value is used verbatim: it must be exactly `Bearer <token>` with a
/// single space and a non-empty token. Surrounding whitespace, a lowercase
/// scheme or extra segments are format errors, not normalized.
pub fn parse_bearer(header: Option<&str>) -> Result<&str, AuthError> {
    let header = match header {
        None | Some("") => return Err(AuthError::MissingToken),
        Some(header) => header,
    };

    let mut parts = header.split(' ');
    let (Some(scheme), Some(token), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(AuthError::InvalidFormat);
    };

    if scheme != BEARER_SCHEME || token.is_empty() {
        return Err(AuthError::InvalidFormat);
    }

    Ok(token)
}

// ==============================================================================
// TOKEN VALIDATION
// ==============================================================================

/// Maps a credential to an identity
///
/// Implementations must be pure: the same token always yields the same result.
pub trait TokenValidator: Send + Sync {
    fn validate(&self, token: &str) -> Result<Identity, AuthError>;
}

/// Fixed token table
#[derive(Debug, Clone, Default)]
pub struct StaticTokenValidator {
    tokens: HashMap<String, Identity>,
}

impl StaticTokenValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validator that knows only the demo token
    pub fn demo() -> Self {
        Self::new().with_token(
            DEMO_TOKEN,
            Identity::new("user-123", "demo@example.com", "Demo User"),
        )
    }

    pub fn with_token(mut self, token: impl Into<String>, identity: Identity) -> Self {
        self.tokens.insert(token.into(), identity);
        self
    }

    /// Adds tokens from a `token:id:email:name;token:id:email:name` list
    pub fn with_token_list(mut self, list: &str) -> Result<Self> {
        for entry in list.split(';').map(str::trim).filter(|e| !e.is_empty()) {
            let fields: Vec<&str> = entry.splitn(4, ':').collect();
            let [token, id, email, name] = fields[..] else {
                bail!("Malformed token entry (expected token:id:email:name): {}", entry);
            };
            if token.is_empty() || id.is_empty() || email.is_empty() || name.is_empty() {
                bail!("Token entry has an empty field: {}", entry);
            }
            self.tokens
                .insert(token.to_string(), Identity::new(id, email, name));
        }
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl TokenValidator for StaticTokenValidator {
    fn validate(&self, token: &str) -> Result<Identity, AuthError> {
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }

        self.tokens
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }
}
