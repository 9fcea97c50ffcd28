//! Session registry: which sessions are online right now.

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::models::SessionId;

#[derive(Debug, Clone)]
struct SessionEntry {
    logged_in: bool,
    connected_at: DateTime<Utc>,
}

/// Concurrent registry of active sessions.
///
/// Shard-locked map; no registry-wide lock is held across network sends,
/// so pairing and settings traffic never wait on a broadcast in flight.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: DashMap<SessionId, SessionEntry>,
}

impl SessionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connected session. Returns false if it was already
    /// registered.
    pub fn register(&self, id: SessionId, logged_in: bool) -> bool {
        if self.sessions.contains_key(&id) {
            return false;
        }
        self.sessions.insert(
            id,
            SessionEntry {
                logged_in,
                connected_at: Utc::now(),
            },
        );
        true
    }

    /// Flip the logged-in flag reported by the gateway.
    pub fn set_logged_in(&self, id: &SessionId, logged_in: bool) {
        if let Some(mut entry) = self.sessions.get_mut(id) {
            entry.logged_in = logged_in;
        }
    }

    /// Drop one session. Returns whether it existed.
    pub fn remove(&self, id: &SessionId) -> bool {
        self.sessions.remove(id).is_some()
    }

    /// Drop every session, returning their ids.
    pub fn drain(&self) -> Vec<SessionId> {
        let ids: Vec<SessionId> = self.sessions.iter().map(|e| e.key().clone()).collect();
        self.sessions.clear();
        ids
    }

    #[must_use]
    pub fn contains(&self, id: &SessionId) -> bool {
        self.sessions.contains_key(id)
    }

    /// Snapshot of sessions currently able to broadcast.
    #[must_use]
    pub fn logged_in_sessions(&self) -> Vec<SessionId> {
        self.sessions
            .iter()
            .filter(|e| e.value().logged_in)
            .map(|e| e.key().clone())
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// When the session connected, if it is registered.
    #[must_use]
    pub fn connected_at(&self, id: &SessionId) -> Option<DateTime<Utc>> {
        self.sessions.get(id).map(|e| e.connected_at)
    }
}
