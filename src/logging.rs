// ==============================================================================
// logging.rs - Pipeline Log Events and Sinks
// ==============================================================================
// Description: Structured request/response/error log lines keyed by request
//              id, emitted through an injected sink
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================
//
// The Correlation & Timing Stage never logs through a global logger. It is
// handed a `LogSink` and emits one of four events per call site:
//
//   IncomingRequest   [id] GET /api/v1/users - 10.0.0.1 - Mozilla/5.0
//   RequestCompleted  [id] GET /api/v1/users 200 - 3ms
//   ResponseMetrics   [id] Response size: 512 bytes
//   RequestError      [id] GET /api/v1/users/x 404 - 1ms - User not found
//
// ==============================================================================

use std::fmt;
use tracing::{debug, error, info};

/// Request entered the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingRequest {
    pub request_id: String,
    pub method: String,
    pub path: String,
    pub client: String,
    /// Empty when the header is absent
    pub user_agent: String,
}

/// Request finished successfully
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestCompleted {
    pub request_id: String,
    pub method: String,
    pub path: String,
    pub status: u16,
    pub duration_ms: u64,
}

/// Serialized size of a structured response payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseMetrics {
    pub request_id: String,
    pub bytes: usize,
}

/// Request failed downstream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestError {
    pub request_id: String,
    pub method: String,
    pub path: String,
    pub status: u16,
    pub duration_ms: u64,
    pub message: String,
    pub detail: Option<String>,
}

/// One pipeline log line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEvent {
    Incoming(IncomingRequest),
    Completed(RequestCompleted),
    Metrics(ResponseMetrics),
    Failed(RequestError),
}

impl LogEvent {
    /// Log context name
    pub fn kind(&self) -> &'static str {
        match self {
            LogEvent::Incoming(_) => "IncomingRequest",
            LogEvent::Completed(_) => "RequestCompleted",
            LogEvent::Metrics(_) => "ResponseMetrics",
            LogEvent::Failed(_) => "RequestError",
        }
    }

    pub fn request_id(&self) -> &str {
        match self {
            LogEvent::Incoming(e) => &e.request_id,
            LogEvent::Completed(e) => &e.request_id,
            LogEvent::Metrics(e) => &e.request_id,
            LogEvent::Failed(e) => &e.request_id,
        }
    }
}

impl fmt::Display for LogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogEvent::Incoming(e) => write!(
                f,
                "[{}] {} {} - {} - {}",
                e.request_id, e.method, e.path, e.client, e.user_agent
            ),
            LogEvent::Completed(e) => write!(
                f,
                "[{}] {} {} {} - {}ms",
                e.request_id, e.method, e.path, e.status, e.duration_ms
            ),
            LogEvent::Metrics(e) => {
                write!(f, "[{}] Response size: {} bytes", e.request_id, e.bytes)
            }
            LogEvent::Failed(e) => write!(
                f,
                "[{}] {} {} {} - {}ms - {}",
                e.request_id, e.method, e.path, e.status, e.duration_ms, e.message
            ),
        }
    }
}

/// Destination for pipeline log events
pub trait LogSink: Send + Sync {
    fn emit(&self, event: LogEvent);
}

/// Forwards pipeline events to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn emit(&self, event: LogEvent) {
        let kind = event.kind();
        match &event {
            LogEvent::Incoming(e) => info!(
                kind,
                request_id = %e.request_id,
                method = %e.method,
                path = %e.path,
                client = %e.client,
                user_agent = %e.user_agent,
                "{}",
                event
            ),
            LogEvent::Completed(e) => info!(
                kind,
                request_id = %e.request_id,
                method = %e.method,
                path = %e.path,
                status = e.status,
                duration_ms = e.duration_ms,
                "{}",
                event
            ),
            LogEvent::Metrics(e) => debug!(
                kind,
                request_id = %e.request_id,
                bytes = e.bytes,
                "{}",
                event
            ),
            LogEvent::Failed(e) => error!(
                kind,
                request_id = %e.request_id,
                method = %e.method,
                path = %e.path,
                status = e.status,
                duration_ms = e.duration_ms,
                detail = e.detail.as_deref().unwrap_or(""),
                "{}",
                event
            ),
        }
    }
}

#[cfg(test)]
pub use recording::RecordingSink;
