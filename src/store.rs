// ==============================================================================
// store.rs - In-Memory User Store
// ==============================================================================
// Description: Registered users kept in process memory
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::clock::Clock;
use crate::models::{CreateUserRequest, Page, User};

/// Largest page a listing may request
pub const MAX_PAGE_SIZE: u64 = 100;

/// Thread-safe user registry
#[derive(Clone)]
pub struct UserStore {
    users: Arc<RwLock<BTreeMap<Uuid, User>>>,
    clock: Arc<dyn Clock>,
}

impl UserStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            users: Arc::new(RwLock::new(BTreeMap::new())),
            clock,
        }
    }

    /// Stores a new user and returns it
    pub async fn create(&self, request: CreateUserRequest) -> User {
        let now = self.clock.now();
        let user = User {
            id: Uuid::new_v4(),
            name: request.name,
            email: request.email,
            zip: request.zip,
            created_at: now,
            updated_at: now,
        };

        self.users.write().await.insert(user.id, user.clone());
        user
    }

    pub async fn get(&self, id: Uuid) -> Option<User> {
        self.users.read().await.get(&id).cloned()
    }

    /// Returns page `page` (1-based) of users ordered by creation time
    ///
    /// `limit` is clamped to [`MAX_PAGE_SIZE`].
    pub async fn list(&self, page: u64, limit: u64) -> Page<User> {
        let limit = limit.min(MAX_PAGE_SIZE);
        let users = self.users.read().await;

        let mut all: Vec<&User> = users.values().collect();
        all.sort_by_key(|u| u.created_at);

        let skip = page.saturating_sub(1).saturating_mul(limit);
        let items = all
            .into_iter()
            .skip(usize::try_from(skip).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .cloned()
            .collect();

        Page {
            items,
            total: users.len() as u64,
            page,
            limit,
        }
    }

    /// Removes a user; returns whether it existed
    pub async fn delete(&self, id: Uuid) -> bool {
        self.users.write().await.remove(&id).is_some()
    }
}
