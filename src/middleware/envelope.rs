// ==============================================================================
// middleware/envelope.rs - Response Envelope Stage
// ==============================================================================
// Description: Wraps successful handler payloads in the uniform response
//              envelope (pagination lifting, success messages, request id)
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================
//
// Runs innermost, directly around the handler. Failures pass through
// untouched; their status was already fixed when the failure was rendered.
//
// ==============================================================================

use axum::{
    extract::{Request, State},
    http::{Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::clock::Clock;
use crate::context::RequestContext;
use crate::error::HandlerFailure;
use crate::middleware::request_path;
use crate::models::{Envelope, PageMeta};
use crate::response::{json_response, Payload};

/// Request facts the envelope depends on
#[derive(Debug, Clone, Copy)]
pub struct EnvelopeRequest<'a> {
    pub method: &'a Method,
    pub path: &'a str,
    pub status: StatusCode,
    pub request_id: Option<&'a str>,
}

/// Output of the envelope stage
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Shaped {
    /// Payload already looked like an envelope and was left alone
    Passthrough(Value),
    Wrapped(Envelope),
}

impl Shaped {
    pub fn into_value(self) -> Result<Value, serde_json::Error> {
        match self {
            Shaped::Passthrough(value) => Ok(value),
            Shaped::Wrapped(envelope) => serde_json::to_value(envelope),
        }
    }
}

/// True when the payload already carries the envelope markers
///
/// Structural check only: any object with a boolean `success` and a
/// `timestamp` field counts as already wrapped.
pub fn is_enveloped(payload: &Value) -> bool {
    payload.get("success").is_some_and(Value::is_boolean) && payload.get("timestamp").is_some()
}

/// Pagination metadata when the payload is `{ items: [...], total, page, limit }`
pub fn page_meta(payload: &Value) -> Option<PageMeta> {
    let object = payload.as_object()?;
    if !object.get("items")?.is_array() {
        return None;
    }

    Some(PageMeta {
        total: object.get("total")?.as_u64()?,
        page: object.get("page")?.as_u64()?,
        limit: object.get("limit")?.as_u64()?,
    })
}

/// User-facing message implied by method and status
pub fn success_message(method: &Method, status: StatusCode) -> Option<&'static str> {
    match (method, status) {
        (&Method::POST, StatusCode::CREATED) => Some("Resource created successfully"),
        (&Method::PUT, StatusCode::OK) | (&Method::PATCH, StatusCode::OK) => {
            Some("Resource updated successfully")
        }
        (&Method::DELETE, StatusCode::OK) => Some("Resource deleted successfully"),
        _ => None,
    }
}

/// Builds the envelope for one successful payload
///
/// The payload is moved into the envelope, never modified in place.
pub fn transform(request: &EnvelopeRequest<'_>, payload: Value, timestamp: String) -> Shaped {
    if is_enveloped(&payload) {
        return Shaped::Passthrough(payload);
    }

    let (data, meta) = match page_meta(&payload) {
        Some(meta) => {
            let mut payload = payload;
            let items = payload.get_mut("items").map(Value::take).unwrap_or_default();
            (items, Some(meta))
        }
        None => (payload, None),
    };

    let message = match meta {
        Some(_) => None,
        None => success_message(request.method, request.status).map(str::to_string),
    };

    Shaped::Wrapped(Envelope {
        success: true,
        data,
        timestamp,
        path: request.path.to_string(),
        request_id: request.request_id.map(str::to_string),
        meta,
        message,
    })
}

/// Axum middleware applying [`transform`] to handler replies
pub async fn shape_response(
    State(clock): State<Arc<dyn Clock>>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request_path(&request);
    let request_id = request
        .extensions()
        .get::<RequestContext>()
        .and_then(RequestContext::request_id)
        .map(|id| id.as_str().to_string());

    let mut response = next.run(request).await;

    if response.extensions().get::<HandlerFailure>().is_some() {
        return response;
    }
    let Some(Payload(payload)) = response.extensions_mut().remove::<Payload>() else {
        return response;
    };

    let status = response.status();
    let envelope_request = EnvelopeRequest {
        method: &method,
        path: &path,
        status,
        request_id: request_id.as_deref(),
    };

    match transform(&envelope_request, payload, clock.timestamp()).into_value() {
        Ok(body) => {
            let (parts, _) = response.into_parts();
            let mut shaped = json_response(status, body);
            for (name, value) in parts.headers.iter() {
                if !shaped.headers().contains_key(name) {
                    shaped.headers_mut().insert(name.clone(), value.clone());
                }
            }
            shaped
        }
        Err(e) => HandlerFailure::internal("Failed to serialize response")
            .with_detail(e.to_string())
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use axum::{body::to_bytes, http::Request as HttpRequest, routing::get, Router};
    use chrono::{DateTime, TimeZone, Utc};
    use serde_json::json;
    use tower::ServiceExt;

    const STAMP: &str = "2026-10-19T12:00:00.000Z";

    fn request<'a>(method: &'a Method, status: StatusCode) -> EnvelopeRequest<'a> {
        EnvelopeRequest {
            method,
            path: "/api/test",
            status,
            request_id: Some("test-request-123"),
        }
    }

    fn wrapped(shaped: Shaped) -> Envelope {
        match shaped {
            Shaped::Wrapped(envelope) => envelope,
            Shaped::Passthrough(value) => panic!("expected envelope, got passthrough {value}"),
        }
    }

    #[test]
    fn test_wraps_simple_data() {
        let data = json!({ "id": 1, "name": "Test" });
        let envelope = wrapped(transform(
            &request(&Method::GET, StatusCode::OK),
            data.clone(),
            STAMP.to_string(),
        ));

        assert!(envelope.success);
        assert_eq!(envelope.data, data);
        assert_eq!(envelope.timestamp, STAMP);
        assert_eq!(envelope.path, "/api/test");
        assert_eq!(envelope.request_id.as_deref(), Some("test-request-123"));
        assert!(envelope.meta.is_none());
        assert!(envelope.message.is_none());
        assert!(DateTime::parse_from_rfc3339(&envelope.timestamp).is_ok());
    }

    #[test]
    fn test_missing_request_id_is_omitted() {
        let req = EnvelopeRequest {
            request_id: None,
            ..request(&Method::GET, StatusCode::OK)
        };
        let shaped = transform(&req, json!({ "test": "data" }), STAMP.to_string());
        let value = shaped.into_value().unwrap();

        assert!(!value.as_object().unwrap().contains_key("requestId"));
    }

    #[test]
    fn test_does_not_double_wrap() {
        let already = json!({
            "success": true,
            "data": { "id": 1 },
            "timestamp": "2026-10-19T11:59:59.000Z",
            "path": "/api/test",
        });
        let req = request(&Method::GET, StatusCode::OK);

        let first = transform(&req, already.clone(), STAMP.to_string()).into_value().unwrap();
        let second = transform(&req, first.clone(), "2030-01-01T00:00:00.000Z".to_string())
            .into_value()
            .unwrap();

        assert_eq!(first, already);
        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
    }

    #[test]
    fn test_detects_envelope_with_success_false() {
        let transformed = json!({
            "success": false,
            "timestamp": "2026-10-19T11:59:59.000Z",
            "error": "Some error",
        });

        let shaped = transform(
            &request(&Method::GET, StatusCode::OK),
            transformed.clone(),
            STAMP.to_string(),
        );
        assert_eq!(shaped, Shaped::Passthrough(transformed));
    }

    #[test]
    fn test_non_boolean_success_is_wrapped() {
        let payload = json!({ "success": "yes", "timestamp": "now" });
        let envelope = wrapped(transform(
            &request(&Method::GET, StatusCode::OK),
            payload.clone(),
            STAMP.to_string(),
        ));
        assert_eq!(envelope.data, payload);
    }

    #[test]
    fn test_paginated_data() {
        let payload = json!({
            "items": [{ "id": 1 }, { "id": 2 }],
            "total": 50,
            "page": 2,
            "limit": 20,
        });

        let envelope = wrapped(transform(
            &request(&Method::GET, StatusCode::OK),
            payload,
            STAMP.to_string(),
        ));

        assert_eq!(envelope.data, json!([{ "id": 1 }, { "id": 2 }]));
        assert_eq!(
            envelope.meta,
            Some(PageMeta {
                total: 50,
                page: 2,
                limit: 20
            })
        );
    }

    #[test]
    fn test_paginated_post_gets_no_message() {
        let payload = json!({ "items": [], "total": 0, "page": 1, "limit": 10 });
        let envelope = wrapped(transform(
            &request(&Method::POST, StatusCode::CREATED),
            payload,
            STAMP.to_string(),
        ));

        assert!(envelope.meta.is_some());
        assert!(envelope.message.is_none());
    }

    #[test]
    fn test_items_not_array_is_ordinary_data() {
        let payload = json!({ "items": "not an array", "total": 100 });
        let envelope = wrapped(transform(
            &request(&Method::GET, StatusCode::OK),
            payload.clone(),
            STAMP.to_string(),
        ));

        assert_eq!(envelope.data, payload);
        assert!(envelope.meta.is_none());
    }

    #[test]
    fn test_success_messages() {
        let cases = [
            (Method::POST, StatusCode::CREATED, Some("Resource created successfully")),
            (Method::PUT, StatusCode::OK, Some("Resource updated successfully")),
            (Method::PATCH, StatusCode::OK, Some("Resource updated successfully")),
            (Method::DELETE, StatusCode::OK, Some("Resource deleted successfully")),
            (Method::GET, StatusCode::OK, None),
            (Method::GET, StatusCode::CREATED, None),
            (Method::POST, StatusCode::OK, None),
            (Method::DELETE, StatusCode::NO_CONTENT, None),
        ];

        for (method, status, expected) in cases {
            let envelope = wrapped(transform(
                &request(&method, status),
                json!({ "id": 1 }),
                STAMP.to_string(),
            ));
            assert_eq!(envelope.message.as_deref(), expected, "{method} {status}");
        }
    }

    #[test]
    fn test_edge_case_payloads() {
        for payload in [Value::Null, json!([]), json!("simple string"), json!(42)] {
            let envelope = wrapped(transform(
                &request(&Method::GET, StatusCode::OK),
                payload.clone(),
                STAMP.to_string(),
            ));
            assert!(envelope.success);
            assert_eq!(envelope.data, payload);
        }
    }

    #[test]
    fn test_same_input_same_structure() {
        let data = json!({ "id": 1, "name": "Test" });
        let req = request(&Method::GET, StatusCode::OK);

        let first = transform(&req, data.clone(), STAMP.to_string());
        let second = transform(&req, data.clone(), STAMP.to_string());

        assert_eq!(first, second);
    }

    fn fixed_clock() -> Arc<dyn Clock> {
        Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()))
    }

    #[tokio::test]
    async fn test_middleware_wraps_replies() {
        use crate::response::Reply;

        let app = Router::new()
            .route(
                "/items",
                get(|| async { Reply::ok(&json!({ "id": 7 })) }),
            )
            .layer(axum::middleware::from_fn_with_state(fixed_clock(), shape_response));

        let response = app
            .oneshot(HttpRequest::builder().uri("/items?sort=asc").body(axum::body::Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(
            body,
            json!({
                "success": true,
                "data": { "id": 7 },
                "timestamp": STAMP,
                "path": "/items?sort=asc",
            })
        );
    }

    #[tokio::test]
    async fn test_middleware_leaves_failures_alone() {
        let app = Router::new()
            .route(
                "/missing",
                get(|| async { Err::<crate::response::Reply, _>(HandlerFailure::not_found("Gone")) }),
            )
            .layer(axum::middleware::from_fn_with_state(fixed_clock(), shape_response));

        let response = app
            .oneshot(HttpRequest::builder().uri("/missing").body(axum::body::Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({ "statusCode": 404, "message": "Gone" }));
    }

    #[tokio::test]
    async fn test_middleware_ignores_plain_responses() {
        let app = Router::new()
            .route("/plain", get(|| async { "ok" }))
            .layer(axum::middleware::from_fn_with_state(fixed_clock(), shape_response));

        let response = app
            .oneshot(HttpRequest::builder().uri("/plain").body(axum::body::Body::empty()).unwrap())
            .await
            .unwrap();

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"ok");
    }
}
