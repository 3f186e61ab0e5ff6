// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory session store.
//!
//! Each browser gets its own `Session` keyed by a random ID, so one user's
//! credential, vehicles and address are never visible to another request.
//! Nothing survives a restart.

use crate::config::MAX_SESSION_TTL_SECS;
use crate::error::AppError;
use crate::models::Session;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Opaque session identifier.
pub type SessionId = Uuid;

/// Shared session map, cheap to clone.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<DashMap<SessionId, Session>>,
    ttl: Duration,
}

impl SessionStore {
    /// `ttl` is clamped to `MAX_SESSION_TTL_SECS`, the bound `Config`
    /// already enforces.
    pub fn new(ttl: std::time::Duration) -> Self {
        let secs = ttl.as_secs().min(MAX_SESSION_TTL_SECS);
        Self {
            sessions: Arc::new(DashMap::new()),
            ttl: Duration::seconds(secs as i64),
        }
    }

    /// Create an empty session and return its ID. Idle sessions are
    /// purged first so the map stays bounded without a background task.
    pub fn create(&self) -> SessionId {
        let purged = self.purge_expired();
        if purged > 0 {
            tracing::debug!(purged, "Purged idle sessions");
        }
        let id = Uuid::new_v4();
        self.sessions.insert(id, Session::new(Utc::now()));
        tracing::debug!(session_id = %id, "Session created");
        id
    }

    /// Whether `id` names a live session. Expired sessions are dropped.
    pub fn contains(&self, id: SessionId) -> bool {
        self.touch(id, Utc::now())
    }

    /// Clone of the session's current state.
    pub fn get(&self, id: SessionId) -> Result<Session, AppError> {
        if !self.contains(id) {
            return Err(AppError::Unauthorized);
        }
        self.sessions
            .get(&id)
            .map(|s| s.clone())
            .ok_or(AppError::Unauthorized)
    }

    /// Mutate a session in place and return what `f` returns.
    pub fn update<T>(
        &self,
        id: SessionId,
        f: impl FnOnce(&mut Session) -> T,
    ) -> Result<T, AppError> {
        if !self.contains(id) {
            return Err(AppError::Unauthorized);
        }
        let mut entry = self.sessions.get_mut(&id).ok_or(AppError::Unauthorized)?;
        Ok(f(entry.value_mut()))
    }

    pub fn remove(&self, id: SessionId) {
        if self.sessions.remove(&id).is_some() {
            tracing::debug!(session_id = %id, "Session removed");
        }
    }

    /// Drop every session idle for longer than the TTL.
    pub fn purge_expired(&self) -> usize {
        let cutoff = Utc::now() - self.ttl;
        let before = self.sessions.len();
        self.sessions.retain(|_, s| s.last_seen > cutoff);
        before.saturating_sub(self.sessions.len())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn touch(&self, id: SessionId, now: DateTime<Utc>) -> bool {
        // Expiry check and removal run under one shard lock.
        if self
            .sessions
            .remove_if(&id, |_, s| now - s.last_seen > self.ttl)
            .is_some()
        {
            tracing::debug!(session_id = %id, "Session expired");
            return false;
        }

        match self.sessions.get_mut(&id) {
            Some(mut entry) => {
                entry.last_seen = entry.last_seen.max(now);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Address;

    fn address(street: &str) -> Address {
        Address {
            street: street.to_string(),
            city: "San Francisco".to_string(),
            region: "CA".to_string(),
            postal_code: "94102".to_string(),
        }
    }

    #[test]
    fn test_sessions_are_isolated() {
        let store = SessionStore::new(std::time::Duration::from_secs(60));
        let alice = store.create();
        let bob = store.create();

        store
            .update(alice, |s| s.address = Some(address("200 Larkin St")))
            .unwrap();
        store
            .update(bob, |s| s.address = Some(address("1 Dr Carlton B Goodlett Pl")))
            .unwrap();

        assert_eq!(store.get(alice).unwrap().address.unwrap().street, "200 Larkin St");
        assert_eq!(
            store.get(bob).unwrap().address.unwrap().street,
            "1 Dr Carlton B Goodlett Pl"
        );
    }

    #[test]
    fn test_unknown_session_unauthorized() {
        let store = SessionStore::new(std::time::Duration::from_secs(60));
        assert!(matches!(store.get(Uuid::new_v4()), Err(AppError::Unauthorized)));
    }

    #[test]
    fn test_expired_session_is_dropped() {
        let store = SessionStore::new(std::time::Duration::from_secs(60));
        let id = store.create();
        store
            .update(id, |s| s.last_seen = Utc::now() - Duration::minutes(5))
            .unwrap();

        assert!(!store.contains(id));
        assert!(store.is_empty());
    }

    #[test]
    fn test_touch_refreshes_live_session() {
        let store = SessionStore::new(std::time::Duration::from_secs(60));
        let id = store.create();
        let stale = Utc::now() - Duration::seconds(30);
        store.update(id, |s| s.last_seen = stale).unwrap();

        assert!(store.contains(id));
        assert!(store.get(id).unwrap().last_seen > stale);
    }

    #[test]
    fn test_update_on_expired_session_is_rejected() {
        let store = SessionStore::new(std::time::Duration::from_secs(60));
        let id = store.create();
        store
            .update(id, |s| s.last_seen = Utc::now() - Duration::minutes(5))
            .unwrap();

        let result = store.update(id, |s| s.address = Some(address("200 Larkin St")));
        assert!(matches!(result, Err(AppError::Unauthorized)));
        assert!(store.is_empty());
    }

    #[test]
    fn test_huge_ttl_is_clamped() {
        let store = SessionStore::new(std::time::Duration::MAX);
        let id = store.create();
        assert!(store.contains(id));
        assert_eq!(store.purge_expired(), 0);
    }

    #[test]
    fn test_purge_expired() {
        let store = SessionStore::new(std::time::Duration::from_secs(60));
        let stale = store.create();
        let _fresh = store.create();
        store
            .update(stale, |s| s.last_seen = Utc::now() - Duration::hours(1))
            .unwrap();

        assert_eq!(store.purge_expired(), 1);
        assert_eq!(store.len(), 1);
    }
}
