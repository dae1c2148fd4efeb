// ==============================================================================
// middleware/auth.rs - Bearer Token Authentication Gate
// ==============================================================================
// Description: Extract and validate the Authorization bearer credential and
//              attach the caller identity to the request context
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================
//
// Security: This gate runs first on every protected route. A request without
// an acceptable `Authorization: Bearer <token>` header is rejected with 401
// Unauthorized before any other stage or the handler runs.
//
// Handlers read the identity back with the `CurrentUser` extractor (or
// `MaybeUser` when the identity is optional).
//
// ==============================================================================

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::context::RequestContext;
use crate::error::AuthError;
use crate::models::Identity;
use crate::security::{parse_bearer, TokenValidator};

/// Validates the request's credential and returns the caller identity
///
/// The header value is taken verbatim; see [`parse_bearer`].
pub fn authenticate(headers: &HeaderMap, validator: &dyn TokenValidator) -> Result<Identity, AuthError> {
    let header = headers
        .get(AUTHORIZATION)
        .map(|value| value.to_str().map_err(|_| AuthError::InvalidFormat))
        .transpose()?;

    let token = parse_bearer(header).inspect_err(|e| {
        if *e == AuthError::MissingToken {
            warn!("No JWT token found in request");
        }
    })?;

    match validator.validate(token) {
        Ok(identity) => {
            debug!("User {} authenticated successfully", identity.email);
            Ok(identity)
        }
        Err(e) => {
            error!(reason = %e, "JWT validation failed");
            Err(e)
        }
    }
}

/// Axum middleware guarding the routes it wraps
pub async fn auth_gate(
    State(validator): State<Arc<dyn TokenValidator>>,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate(request.headers(), validator.as_ref()) {
        Ok(identity) => {
            RequestContext::from_extensions_mut(request.extensions_mut()).attach_identity(identity);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

/// Identity attached by the auth gate
///
/// # Example
/// ```rust,ignore
/// async fn whoami(CurrentUser(identity): CurrentUser) -> impl IntoResponse {
///     format!("Hello, {}!", identity.name)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Identity);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .and_then(RequestContext::identity)
            .cloned()
            .map(CurrentUser)
            .ok_or(AuthError::MissingIdentity)
    }
}

/// Identity if one was attached; never rejects
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<Identity>);

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(
            parts
                .extensions
                .get::<RequestContext>()
                .and_then(RequestContext::identity)
                .cloned(),
        ))
    }
}
