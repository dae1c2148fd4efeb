// ==============================================================================
// response.rs - Handler Success Results
// ==============================================================================
// Description: JSON success replies that expose their payload to the
//              response-shaping stages
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;

use crate::error::HandlerFailure;

/// Body of a successful response, kept in the response extensions
///
/// The envelope stage replaces it with the envelope it builds; the
/// correlation stage reads it for the response size metric.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload(pub Value);

/// Successful handler result
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    status: StatusCode,
    payload: Value,
}

impl Reply {
    /// Serializes `value` with the given status
    pub fn with_status<T: Serialize>(status: StatusCode, value: &T) -> Result<Self, HandlerFailure> {
        let payload = serde_json::to_value(value).map_err(|e| {
            HandlerFailure::internal("Failed to serialize response").with_detail(e.to_string())
        })?;
        Ok(Self { status, payload })
    }

    /// 200 OK
    pub fn ok<T: Serialize>(value: &T) -> Result<Self, HandlerFailure> {
        Self::with_status(StatusCode::OK, value)
    }

    /// 201 Created
    pub fn created<T: Serialize>(value: &T) -> Result<Self, HandlerFailure> {
        Self::with_status(StatusCode::CREATED, value)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        json_response(self.status, self.payload)
    }
}

/// JSON response whose body is `payload`, with the payload attached as an extension
pub fn json_response(status: StatusCode, payload: Value) -> Response {
    let bytes = match serde_json::to_vec(&payload) {
        Ok(bytes) => bytes,
        Err(e) => {
            return HandlerFailure::internal("Failed to serialize response")
                .with_detail(e.to_string())
                .into_response()
        }
    };

    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response.extensions_mut().insert(Payload(payload));
    response
}
