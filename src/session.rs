use std::{collections::HashMap, sync::Arc};

use chrono::{Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{Session, User};

// Longer lifetimes are clamped.
const MAX_TTL_SECS: u64 = 30 * 24 * 60 * 60;

/// SessionStore
///
/// The live login sessions. The only place a session's identity and role are
/// written; everything else reads through `get`.
pub struct SessionStore {
    ttl: Duration,
    sessions: RwLock<HashMap<Uuid, Session>>,
}

pub type SessionState = Arc<SessionStore>;

impl SessionStore {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            ttl: Duration::seconds(ttl_secs.min(MAX_TTL_SECS) as i64),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Effective session lifetime, after clamping.
    pub fn ttl_secs(&self) -> u64 {
        self.ttl.num_seconds().max(0) as u64
    }

    /// Opens a session for `user`, fixing its current role.
    pub async fn open(&self, user: &User) -> Session {
        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4(),
            user_id: user.id,
            email: user.email.clone(),
            role: user.role,
            created_at: now,
            expires_at: now + self.ttl,
        };
        self.sessions
            .write()
            .await
            .insert(session.id, session.clone());
        tracing::info!(session_id = %session.id, user_id = %user.id, role = %user.role, "session opened");
        session
    }

    /// Returns the session if it exists and has not expired. Expired sessions are
    /// dropped on access.
    pub async fn get(&self, id: Uuid) -> Option<Session> {
        let session = self.sessions.read().await.get(&id).cloned()?;
        if session.is_expired(Utc::now()) {
            self.sessions.write().await.remove(&id);
            return None;
        }
        Some(session)
    }

    /// Removes the session. Returns false if it was not open.
    pub async fn close(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            tracing::info!(session_id = %id, "session closed");
        }
        removed
    }

    /// Drops every expired session; returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired(now));
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
