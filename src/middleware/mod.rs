// ==============================================================================
// middleware/mod.rs - Request Processing Pipeline
// ==============================================================================
// Description: Auth gate, correlation & timing, response envelope and rate
//              limiting stages
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================
//
// Per-request order on protected routes:
//
//   auth gate -> correlation (entry) -> handler -> envelope -> correlation (exit)
//
// ==============================================================================

pub mod auth;
pub mod correlation;
pub mod envelope;
pub mod rate_limit;

pub use auth::{auth_gate, CurrentUser, MaybeUser};
pub use correlation::{CorrelationLayer, Correlator};
pub use envelope::shape_response;
pub use rate_limit::{limit_clients, ClientLimiter};

use axum::{
    extract::{ConnectInfo, OriginalUri},
    http::{Request, Uri},
};
use std::net::SocketAddr;

/// Header consulted when the peer address is unavailable (behind a proxy or in tests)
const FORWARDED_FOR: &str = "x-forwarded-for";

/// Path and query exactly as received
///
/// Nested routers see the URI with their prefix stripped, so the router's
/// `OriginalUri` wins when present.
pub fn request_path<B>(request: &Request<B>) -> String {
    let uri = request
        .extensions()
        .get::<OriginalUri>()
        .map(|OriginalUri(uri)| uri)
        .unwrap_or_else(|| request.uri());
    path_and_query(uri)
}

fn path_and_query(uri: &Uri) -> String {
    uri.path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string())
}

/// Best-effort client address for logging and rate limiting
pub fn client_address<B>(request: &Request<B>) -> String {
    if let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }

    request
        .headers()
        .get(FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("unknown")
        .to_string()
}
