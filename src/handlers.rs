// ==============================================================================
// handlers.rs - API Request Handlers
// ==============================================================================
// Description: HTTP request handlers for the user and weather endpoints
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================
//
// Handlers under /api/v1 return `Reply` or `HandlerFailure`; the pipeline
// around them adds the envelope, request id and logging.
//
// ==============================================================================

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use chrono::Utc;
use tracing::{error, info};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::HandlerFailure,
    middleware::CurrentUser,
    models::*,
    response::Reply,
    state::AppState,
    store::MAX_PAGE_SIZE,
    validator::{check_zip, validation_failure},
};

const DEFAULT_PAGE: u64 = 1;
const DEFAULT_PAGE_SIZE: u64 = 20;

/// Root endpoint - API information
pub async fn root() -> Json<ApiInfoResponse> {
    Json(ApiInfoResponse {
        service: "Weather API Gateway",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: vec![
            "/health - Health check",
            "/api/v1/users - Register user (POST) or list users (GET)",
            "/api/v1/users/{id} - Get user (GET) or delete (DELETE)",
            "/api/v1/weather/{zip} - Current weather for a zip code (GET)",
            "/api/v1/me - Authenticated caller (GET)",
        ],
    })
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now(),
    })
}

/// Register a user
pub async fn create_user(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    body: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<Reply, HandlerFailure> {
    let Json(request) = body.map_err(json_failure)?;
    request.validate().map_err(validation_failure)?;
    let created_by = caller.require(IdentityField::Id)?;

    let user = state.users().create(request).await;
    info!(user_id = %user.id, created_by = %created_by, "User registered");

    Reply::created(&user)
}

/// List users a page at a time
pub async fn list_users(
    State(state): State<AppState>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Reply, HandlerFailure> {
    let Query(query) = query.map_err(|e| {
        HandlerFailure::bad_request("Invalid pagination parameters").with_detail(e.body_text())
    })?;

    let page = query.page.unwrap_or(DEFAULT_PAGE);
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE);
    if page == 0 || limit == 0 {
        return Err(HandlerFailure::bad_request(
            "page and limit must be positive integers",
        ));
    }

    Reply::ok(&state.users().list(page, limit).await)
}

/// Fetch a single user
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Reply, HandlerFailure> {
    let id = parse_user_id(&id)?;

    match state.users().get(id).await {
        Some(user) => Reply::ok(&user),
        None => Err(HandlerFailure::not_found("User not found")),
    }
}

/// Remove a user
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Reply, HandlerFailure> {
    let id = parse_user_id(&id)?;

    if !state.users().delete(id).await {
        return Err(HandlerFailure::not_found("User not found"));
    }

    info!(user_id = %id, "User deleted");
    Reply::ok(&DeleteResponse { deleted: true })
}

/// Current weather for a zip code
pub async fn current_weather(
    State(state): State<AppState>,
    Path(zip): Path<String>,
) -> Result<Reply, HandlerFailure> {
    check_zip(&zip)?;

    let report = state.weather().current(&zip).await.map_err(|e| {
        error!(zip = %zip, error = %e, "Weather lookup failed");
        HandlerFailure::internal("Unable to retrieve weather").with_detail(format!("{:#}", e))
    })?;

    Reply::ok(&report)
}

/// The authenticated caller
pub async fn me(CurrentUser(identity): CurrentUser) -> Result<Reply, HandlerFailure> {
    Reply::ok(&identity)
}

/// Malformed or mistyped bodies are 400; size and content-type problems keep
/// the rejection's own status
fn json_failure(rejection: JsonRejection) -> HandlerFailure {
    let detail = rejection.body_text();
    match rejection.status() {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            HandlerFailure::bad_request("Invalid user data").with_detail(detail)
        }
        status => HandlerFailure::new(detail.clone())
            .with_status(status)
            .with_detail(detail),
    }
}

fn parse_user_id(raw: &str) -> Result<Uuid, HandlerFailure> {
    Uuid::parse_str(raw)
        .map_err(|e| HandlerFailure::bad_request("Invalid user id").with_detail(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user_id() {
        assert!(parse_user_id("6f1c1d0e-8a5b-4c55-9a7e-2b3f4d5e6a7b").is_ok());

        let err = parse_user_id("not-a-uuid").unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.message, "Invalid user id");
    }
}
