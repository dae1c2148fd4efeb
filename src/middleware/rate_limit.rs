// ==============================================================================
// middleware/rate_limit.rs - Per-Client Rate Limiting
// ==============================================================================
// Description: Rejects clients exceeding the configured request budget with
//              429 Too Many Requests
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

use anyhow::{Context, Result};
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::error::ErrorResponse;
use crate::middleware::client_address;

/// Limiter keyed by client address
pub type ClientLimiter = governor::DefaultKeyedRateLimiter<String>;

/// Builds a limiter allowing `max_requests` per `window` for each client
///
/// The budget refills continuously (one request every `window / max_requests`)
/// with a burst of `max_requests`.
pub fn client_limiter(max_requests: u32, window: Duration) -> Result<Arc<ClientLimiter>> {
    let burst = NonZeroU32::new(max_requests).context("Rate limit must allow at least one request")?;
    let period = window / max_requests;
    let quota = Quota::with_period(period)
        .context("Rate limit window too short for the request budget")?
        .allow_burst(burst);

    Ok(Arc::new(RateLimiter::keyed(quota)))
}

/// Axum middleware enforcing the per-client budget
pub async fn limit_clients(
    State(limiter): State<Arc<ClientLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let client = client_address(&request);

    if limiter.check_key(&client).is_err() {
        warn!(client = %client, "Rate limit exceeded");
        let status = StatusCode::TOO_MANY_REQUESTS;
        return (
            status,
            Json(ErrorResponse::new(status.as_u16(), "Too many requests")),
        )
            .into_response();
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request as HttpRequest, routing::get, Router};
    use tower::ServiceExt;

    fn app(limiter: Arc<ClientLimiter>) -> Router {
        Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(axum::middleware::from_fn_with_state(limiter, limit_clients))
    }

    fn from(client: &str) -> HttpRequest<Body> {
        HttpRequest::builder()
            .uri("/")
            .header("x-forwarded-for", client)
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn test_invalid_budget() {
        assert!(client_limiter(0, Duration::from_secs(60)).is_err());
        assert!(client_limiter(10, Duration::ZERO).is_err());
    }

    #[tokio::test]
    async fn test_budget_is_per_client() {
        let limiter = client_limiter(2, Duration::from_secs(3600)).unwrap();

        for _ in 0..2 {
            let response = app(limiter.clone()).oneshot(from("10.0.0.1")).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = app(limiter.clone()).oneshot(from("10.0.0.1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

        let response = app(limiter).oneshot(from("10.0.0.2")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
