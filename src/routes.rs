// ==============================================================================
// routes.rs - Router Assembly
// ==============================================================================
// Description: Wires handlers, the request pipeline and transport layers
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::get,
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::handlers;
use crate::middleware::{
    auth_gate, correlation::REQUEST_ID_HEADER, limit_clients, shape_response, ClientLimiter,
    CorrelationLayer, Correlator,
};
use crate::state::AppState;

/// Prefix for routes behind the request pipeline
pub const API_PREFIX: &str = "/api/v1";

/// Build the service router
pub fn build_router(state: AppState, config: &Config, limiter: Arc<ClientLimiter>) -> Router {
    // Layers run outermost-last: auth gate, then correlation, then envelope
    let api_routes = Router::new()
        .route(
            "/users",
            get(handlers::list_users).post(handlers::create_user),
        )
        .route(
            "/users/{id}",
            get(handlers::get_user).delete(handlers::delete_user),
        )
        .route("/weather/{zip}", get(handlers::current_weather))
        .route("/me", get(handlers::me))
        .layer(from_fn_with_state(state.clock(), shape_response))
        .layer(CorrelationLayer::new(Correlator::new(
            state.sink(),
            state.clock(),
        )))
        .layer(from_fn_with_state(state.validator(), auth_gate));

    let allowed_origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_credentials(false)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION])
        .expose_headers([header::CONTENT_TYPE, REQUEST_ID_HEADER.clone()]);

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .nest(API_PREFIX, api_routes)
        .layer(
            ServiceBuilder::new()
                // Request tracing
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                // Security headers
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::X_CONTENT_TYPE_OPTIONS,
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::X_FRAME_OPTIONS,
                    HeaderValue::from_static("DENY"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("referrer-policy"),
                    HeaderValue::from_static("no-referrer"),
                ))
                // Per-client request budget
                .layer(from_fn_with_state(limiter, limit_clients))
                .layer(DefaultBodyLimit::max(config.body_limit_bytes)),
        )
        .with_state(state)
}
