// ==============================================================================
// models.rs - API Data Models
// ==============================================================================
// Description: Identity, response envelope and request/response models for
//              the users and weather endpoints
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;
use validator::Validate;

use crate::error::AuthError;

// ==============================================================================
// IDENTITY
// ==============================================================================

/// Authenticated caller, produced only by the Auth Gate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub email: String,
    pub name: String,
}

/// Selectable identity properties
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityField {
    Id,
    Email,
    Name,
}

impl IdentityField {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdentityField::Id => "id",
            IdentityField::Email => "email",
            IdentityField::Name => "name",
        }
    }
}

impl fmt::Display for IdentityField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Identity {
    pub fn new(id: impl Into<String>, email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            name: name.into(),
        }
    }

    /// Returns one property, failing when it is empty
    pub fn require(&self, field: IdentityField) -> Result<&str, AuthError> {
        let value = match field {
            IdentityField::Id => &self.id,
            IdentityField::Email => &self.email,
            IdentityField::Name => &self.name,
        };

        if value.is_empty() {
            Err(AuthError::FieldUnavailable(field))
        } else {
            Ok(value)
        }
    }
}

// ==============================================================================
// RESPONSE ENVELOPE
// ==============================================================================

/// Uniform wrapper for successful responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub success: bool,
    pub data: Value,
    /// ISO-8601 instant, millisecond precision, UTC
    pub timestamp: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<PageMeta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Pagination metadata lifted out of a paginated payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

/// Paginated handler result; the envelope stage turns it into `data` + `meta`
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

/// Pagination query parameters
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

// ==============================================================================
// USERS
// ==============================================================================

/// User registration request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,

    #[validate(custom(function = "crate::validator::validate_zip"))]
    pub zip: String,

    #[validate(email(message = "email must be a valid address"))]
    pub email: Option<String>,
}

/// Registered user
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub zip: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Result of a delete operation
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}

// ==============================================================================
// WEATHER
// ==============================================================================

/// Current conditions for a location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherReport {
    pub date: String,
    pub location_name: String,
    pub temperature: i32,
    pub weather_icons: Vec<String>,
    pub descriptions: Vec<String>,
    pub wind_direction: String,
    pub wind_speed: u32,
    pub humidity: u32,
    pub uv_index: u32,
    pub visibility: u32,
}

// ==============================================================================
// SERVICE INFO
// ==============================================================================

/// Root endpoint response
#[derive(Debug, Serialize)]
pub struct ApiInfoResponse {
    pub service: &'static str,
    pub version: &'static str,
    pub endpoints: Vec<&'static str>,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: DateTime<Utc>,
}
