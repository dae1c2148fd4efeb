// ==============================================================================
// error.rs - Pipeline Error Types
// ==============================================================================
// Description: Authentication failures, handler failures and the error record
//              derived from them for logging and error responses
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::models::IdentityField;

/// Status used when a failure does not carry one of its own
pub const DEFAULT_FAILURE_STATUS: u16 = 500;

/// Authentication failures raised by the Auth Gate and identity accessors
///
/// Every variant surfaces to the client as 401 Unauthorized; the message
/// tells the variants apart.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No Authorization header, an empty header, or an empty credential
    #[error("No token provided")]
    MissingToken,

    /// Scheme other than exactly `Bearer`, or a header that does not split
    /// into scheme and credential
    #[error("Invalid token format")]
    InvalidFormat,

    /// Well-formed bearer credential rejected by the token validator
    #[error("Invalid token")]
    InvalidToken,

    /// Handler asked for the identity but the gate never attached one
    #[error("User not found in request")]
    MissingIdentity,

    /// Identity is attached but the requested field is empty
    #[error("User {0} not available")]
    FieldUnavailable(IdentityField),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(ErrorResponse::new(status.as_u16(), self.to_string()));
        (status, body).into_response()
    }
}

/// Failure surfaced by application logic wrapped by the pipeline
///
/// `status` is optional: a failure without one is reported as 500. The
/// value is carried through the response extensions untouched so the
/// Correlation & Timing Stage can observe exactly what the handler returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct HandlerFailure {
    pub status: Option<u16>,
    pub message: String,
    pub detail: Option<String>,
}

impl HandlerFailure {
    /// Failure with no status and no detail
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
            detail: None,
        }
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = Some(status.as_u16());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(message).with_status(StatusCode::BAD_REQUEST)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(message).with_status(StatusCode::NOT_FOUND)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(message).with_status(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Status code after defaulting
    pub fn status_code(&self) -> u16 {
        self.status.unwrap_or(DEFAULT_FAILURE_STATUS)
    }

    pub fn record(&self) -> ErrorRecord {
        ErrorRecord {
            status_code: self.status_code(),
            message: self.message.clone(),
            detail: self.detail.clone(),
        }
    }
}

impl IntoResponse for HandlerFailure {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        // Out-of-range codes collapse to 500 rather than producing an invalid response
        let status =
            StatusCode::from_u16(status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = Json(ErrorResponse::new(status.as_u16(), self.message.clone()));

        let mut response = (status, body).into_response();
        response.extensions_mut().insert(self);
        response
    }
}

impl From<AuthError> for HandlerFailure {
    fn from(error: AuthError) -> Self {
        Self::new(error.to_string()).with_status(error.status())
    }
}

/// Normalized view of a failure used for logging
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorRecord {
    pub status_code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Error body returned to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub status_code: u16,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code,
            message: message.into(),
        }
    }
}
