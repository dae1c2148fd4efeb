// ==============================================================================
// middleware/correlation.rs - Correlation & Timing Stage
// ==============================================================================
// Description: Assigns a request id, times the downstream handler and logs
//              incoming/completed/error events keyed by that id
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================
//
// The stage only observes. The handler runs exactly once and whatever it
// returns, success or failure, is handed back unchanged. The only shared
// state is the sink and the clock; timers live on the stack of each call.
//
// ==============================================================================

use axum::{
    extract::Request,
    http::{header::USER_AGENT, HeaderName, HeaderValue},
    response::Response,
};
use futures::future::BoxFuture;
use serde_json::Value;
use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};

use crate::clock::Clock;
use crate::context::{RequestContext, RequestId};
use crate::error::{ErrorRecord, HandlerFailure};
use crate::logging::{
    IncomingRequest, LogEvent, LogSink, RequestCompleted, RequestError, ResponseMetrics,
};
use crate::middleware::{client_address, request_path};
use crate::response::{Payload, Reply};

/// Response header echoing the request id
pub static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

// ==============================================================================
// OBSERVED VALUES
// ==============================================================================

/// Request facts captured on entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestMeta {
    pub method: String,
    pub path: String,
    pub client: String,
    pub user_agent: String,
}

impl RequestMeta {
    pub fn from_request<B>(request: &axum::http::Request<B>) -> Self {
        Self {
            method: request.method().to_string(),
            path: request_path(request),
            client: client_address(request),
            user_agent: request
                .headers()
                .get(USER_AGENT)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string(),
        }
    }
}

/// Successful result as seen by the stage
pub trait Outcome {
    fn status(&self) -> u16;

    /// Structured body, when there is one
    fn payload(&self) -> Option<&Value>;
}

/// Failed result as seen by the stage
pub trait Failure {
    fn record(&self) -> ErrorRecord;
}

impl Outcome for Response {
    fn status(&self) -> u16 {
        Response::status(self).as_u16()
    }

    fn payload(&self) -> Option<&Value> {
        self.extensions().get::<Payload>().map(|p| &p.0)
    }
}

impl Failure for Response {
    fn record(&self) -> ErrorRecord {
        match self.extensions().get::<HandlerFailure>() {
            Some(failure) => failure.record(),
            None => ErrorRecord {
                status_code: Response::status(self).as_u16(),
                message: Response::status(self)
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string(),
                detail: None,
            },
        }
    }
}

impl Outcome for Reply {
    fn status(&self) -> u16 {
        Reply::status(self).as_u16()
    }

    fn payload(&self) -> Option<&Value> {
        Some(Reply::payload(self))
    }
}

impl Failure for HandlerFailure {
    fn record(&self) -> ErrorRecord {
        HandlerFailure::record(self)
    }
}

// ==============================================================================
// CORRELATOR
// ==============================================================================

/// Logging and timing around one downstream call
#[derive(Clone)]
pub struct Correlator {
    sink: Arc<dyn LogSink>,
    clock: Arc<dyn Clock>,
}

impl Correlator {
    pub fn new(sink: Arc<dyn LogSink>, clock: Arc<dyn Clock>) -> Self {
        Self { sink, clock }
    }

    /// Runs `handler` once with a fresh request id attached to `context`
    ///
    /// Logs the incoming line before the call, then either a completion line
    /// (plus a size line for object payloads) or an error line. The
    /// handler's result is returned as-is.
    pub async fn wrap<F, Fut, T, E>(
        &self,
        meta: &RequestMeta,
        context: &mut RequestContext,
        handler: F,
    ) -> Result<T, E>
    where
        F: FnOnce(RequestContext) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        T: Outcome,
        E: Failure,
    {
        let request_id = context.attach_request_id(RequestId::generate()).clone();
        let start = self.clock.monotonic();

        self.sink.emit(LogEvent::Incoming(IncomingRequest {
            request_id: request_id.to_string(),
            method: meta.method.clone(),
            path: meta.path.clone(),
            client: meta.client.clone(),
            user_agent: meta.user_agent.clone(),
        }));

        let result = handler(context.clone()).await;
        let duration_ms = u64::try_from(self.clock.elapsed_since(start).as_millis()).unwrap_or(u64::MAX);

        match &result {
            Ok(outcome) => self.completed(&request_id, meta, outcome, duration_ms),
            Err(failure) => self.failed(&request_id, meta, &failure.record(), duration_ms),
        }

        result
    }

    fn completed<T: Outcome>(&self, request_id: &RequestId, meta: &RequestMeta, outcome: &T, duration_ms: u64) {
        self.sink.emit(LogEvent::Completed(RequestCompleted {
            request_id: request_id.to_string(),
            method: meta.method.clone(),
            path: meta.path.clone(),
            status: outcome.status(),
            duration_ms,
        }));

        // Arrays and primitives do not get a size line
        if let Some(payload) = outcome.payload().filter(|p| p.is_object()) {
            if let Ok(bytes) = serde_json::to_vec(payload) {
                self.sink.emit(LogEvent::Metrics(ResponseMetrics {
                    request_id: request_id.to_string(),
                    bytes: bytes.len(),
                }));
            }
        }
    }

    fn failed(&self, request_id: &RequestId, meta: &RequestMeta, record: &ErrorRecord, duration_ms: u64) {
        self.sink.emit(LogEvent::Failed(RequestError {
            request_id: request_id.to_string(),
            method: meta.method.clone(),
            path: meta.path.clone(),
            status: record.status_code,
            duration_ms,
            message: record.message.clone(),
            detail: record.detail.clone(),
        }));
    }
}

// ==============================================================================
// TOWER LAYER
// ==============================================================================

/// Layer installing the correlation stage in front of a service
#[derive(Clone)]
pub struct CorrelationLayer {
    correlator: Correlator,
}

impl CorrelationLayer {
    pub fn new(correlator: Correlator) -> Self {
        Self { correlator }
    }
}

impl<S> Layer<S> for CorrelationLayer {
    type Service = CorrelationService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CorrelationService {
            inner,
            correlator: self.correlator.clone(),
        }
    }
}

/// Service produced by [`CorrelationLayer`]
#[derive(Clone)]
pub struct CorrelationService<S> {
    inner: S,
    correlator: Correlator,
}

impl<S> Service<Request> for CorrelationService<S>
where
    S: Service<Request, Response = Response, Error = Infallible> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Response, Infallible>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request) -> Self::Future {
        // Use the instance that was polled ready, leave a fresh clone behind
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let correlator = self.correlator.clone();

        Box::pin(async move {
            let meta = RequestMeta::from_request(&request);
            let mut context = request
                .extensions_mut()
                .remove::<RequestContext>()
                .unwrap_or_default();

            let result = correlator
                .wrap(&meta, &mut context, move |context| async move {
                    request.extensions_mut().insert(context);
                    let response = match inner.call(request).await {
                        Ok(response) => response,
                        Err(never) => match never {},
                    };
                    if is_failure(&response) {
                        Err(response)
                    } else {
                        Ok(response)
                    }
                })
                .await;

            let mut response = match result {
                Ok(response) | Err(response) => response,
            };
            if let Some(request_id) = context.request_id() {
                if let Ok(value) = HeaderValue::from_str(request_id.as_str()) {
                    response.headers_mut().insert(&REQUEST_ID_HEADER, value);
                }
            }

            Ok(response)
        })
    }
}

/// Handler failures plus any other error status produced downstream
/// (method mismatch, extractor rejections)
fn is_failure(response: &Response) -> bool {
    let status = response.status();
    response.extensions().get::<HandlerFailure>().is_some()
        || status.is_client_error()
        || status.is_server_error()
}
