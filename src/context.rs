// ==============================================================================
// context.rs - Per-Request Context
// ==============================================================================
// Description: Request id and identity carried through the pipeline for one
//              request
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

use axum::http::Extensions;
use std::fmt;
use uuid::Uuid;

use crate::models::Identity;

/// Correlator tying together the log lines of one request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(String);

impl RequestId {
    /// Fresh random id (UUID v4); safe to call from any number of tasks
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// State owned by a single request
///
/// The Auth Gate sets `identity` and the Correlation & Timing Stage sets
/// `request_id`. Each can be set once; later attempts are ignored so an
/// attached identity never changes for the rest of the request.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    request_id: Option<RequestId>,
    identity: Option<Identity>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Attaches the request id; returns the id in effect afterwards
    pub fn attach_request_id(&mut self, request_id: RequestId) -> &RequestId {
        self.request_id.get_or_insert(request_id)
    }

    /// Attaches the identity; returns false when one was already present
    pub fn attach_identity(&mut self, identity: Identity) -> bool {
        if self.identity.is_some() {
            return false;
        }
        self.identity = Some(identity);
        true
    }

    /// Context stored in request extensions, created on first access
    pub fn from_extensions_mut(extensions: &mut Extensions) -> &mut Self {
        extensions.get_or_insert_default::<RequestContext>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::join_all;
    use std::collections::HashSet;

    #[test]
    fn test_request_id_is_uuid() {
        let id = RequestId::generate();
        assert!(Uuid::parse_str(id.as_str()).is_ok());
        assert_eq!(format!("{id}"), id.as_str());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_request_ids_are_unique() {
        let handles = (0..1000).map(|_| tokio::spawn(async { RequestId::generate() }));
        let ids: Vec<RequestId> = join_all(handles)
            .await
            .into_iter()
            .map(|r| r.unwrap())
            .collect();

        let unique: HashSet<&RequestId> = ids.iter().collect();
        assert_eq!(unique.len(), 1000);
    }

    #[test]
    fn test_identity_attached_once() {
        let mut context = RequestContext::new();
        let first = Identity::new("user-1", "one@example.com", "One");
        let second = Identity::new("user-2", "two@example.com", "Two");

        assert!(context.attach_identity(first.clone()));
        assert!(!context.attach_identity(second));
        assert_eq!(context.identity(), Some(&first));
    }

    #[test]
    fn test_request_id_attached_once() {
        let mut context = RequestContext::new();
        let first = RequestId::generate();

        context.attach_request_id(first.clone());
        let effective = context.attach_request_id(RequestId::generate()).clone();

        assert_eq!(effective, first);
    }

    #[test]
    fn test_context_from_extensions() {
        let mut extensions = Extensions::new();
        RequestContext::from_extensions_mut(&mut extensions)
            .attach_identity(Identity::new("u", "e@example.com", "N"));

        let context = extensions.get::<RequestContext>().unwrap();
        assert_eq!(context.identity().unwrap().id, "u");
        assert!(context.request_id().is_none());
    }
}
