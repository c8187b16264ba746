use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

use crate::{error::Result, session::ConversationSession};

/// Exclusive access to one user's session. Dropping it releases the user.
pub type SessionGuard = OwnedMutexGuard<ConversationSession>;

/// Trait for storing and retrieving conversation sessions keyed by user id
#[async_trait]
pub trait SessionStorage: Send + Sync {
    /// Lock the user's session, creating `{Start, empty claim}` on first contact.
    /// Messages for the same user are serialized on this lock.
    async fn get_or_create(&self, user_id: &str) -> Result<SessionGuard>;

    /// Snapshot of the session, if the user has one.
    async fn get(&self, user_id: &str) -> Result<Option<ConversationSession>>;

    /// Put an existing session back to its initial state.
    async fn reset(&self, user_id: &str) -> Result<()>;

    /// Drop sessions idle for at least `max_idle` that nobody holds.
    /// Returns the number of evicted sessions.
    async fn evict_idle(&self, max_idle: Duration) -> Result<usize>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

type SessionSlot = Arc<Mutex<ConversationSession>>;

/// In-memory implementation of SessionStorage
pub struct InMemorySessionStorage {
    sessions: Arc<DashMap<String, SessionSlot>>,
}

impl InMemorySessionStorage {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
        }
    }

    fn slot(&self, user_id: &str) -> Option<SessionSlot> {
        self.sessions.get(user_id).map(|entry| entry.clone())
    }
}

impl Default for InMemorySessionStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStorage for InMemorySessionStorage {
    async fn get_or_create(&self, user_id: &str) -> Result<SessionGuard> {
        let slot = self
            .sessions
            .entry(user_id.to_string())
            .or_insert_with(|| {
                debug!(user_id = %user_id, "Creating new session");
                Arc::new(Mutex::new(ConversationSession::new(user_id)))
            })
            .clone();
        Ok(slot.lock_owned().await)
    }

    async fn get(&self, user_id: &str) -> Result<Option<ConversationSession>> {
        match self.slot(user_id) {
            Some(slot) => Ok(Some(slot.lock().await.clone())),
            None => Ok(None),
        }
    }

    async fn reset(&self, user_id: &str) -> Result<()> {
        if let Some(slot) = self.slot(user_id) {
            slot.lock().await.reset();
        }
        Ok(())
    }

    async fn evict_idle(&self, max_idle: Duration) -> Result<usize> {
        let now = Instant::now();
        let mut evicted = 0usize;
        self.sessions.retain(|_, slot| {
            // a clone outside the map means a turn is about to lock it
            if Arc::strong_count(slot) > 1 {
                return true;
            }
            let keep = match slot.try_lock() {
                Ok(session) => now.saturating_duration_since(session.last_active) < max_idle,
                Err(_) => true,
            };
            if !keep {
                evicted += 1;
            }
            keep
        });
        if evicted > 0 {
            debug!(evicted, remaining = self.sessions.len(), "Evicted idle sessions");
        }
        Ok(evicted)
    }

    fn len(&self) -> usize {
        self.sessions.len()
    }
}
