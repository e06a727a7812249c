use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use uuid::Uuid;

use crate::models::{LoginGrant, SessionRecord};

/// Upper bound applied to TTLs too large for chrono to represent.
const MAX_TTL_DAYS: i64 = 365 * 100;

#[derive(Clone, Debug)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<String, SessionRecord>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Create a session for a login grant and return the new record.
    pub fn create(&self, grant: LoginGrant) -> SessionRecord {
        let now = Utc::now();
        let ttl = chrono::Duration::from_std(self.ttl)
            .unwrap_or_else(|_| chrono::Duration::days(MAX_TTL_DAYS));
        let record = SessionRecord {
            id: Uuid::new_v4().to_string(),
            access_token: grant.access_token,
            user: grant.user,
            created_at: now,
            expires_at: now
                .checked_add_signed(ttl)
                .unwrap_or_else(|| now + chrono::Duration::days(MAX_TTL_DAYS)),
        };

        let mut sessions = self.sessions.lock().expect("session lock poisoned");
        sessions.insert(record.id.clone(), record.clone());
        tracing::debug!(session = %record.id, "Session created");
        record
    }

    /// Look up a live session. Expired records are dropped and reported as absent.
    pub fn get(&self, id: &str) -> Option<SessionRecord> {
        let mut sessions = self.sessions.lock().expect("session lock poisoned");
        match sessions.get(id) {
            Some(record) if record.is_expired_at(Utc::now()) => {
                sessions.remove(id);
                tracing::debug!(session = %id, "Session expired");
                None
            }
            Some(record) => Some(record.clone()),
            None => None,
        }
    }

    /// Remove a session. Returns true if it existed.
    pub fn revoke(&self, id: &str) -> bool {
        let mut sessions = self.sessions.lock().expect("session lock poisoned");
        sessions.remove(id).is_some()
    }

    /// Drop every expired session and return how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.lock().expect("session lock poisoned");
        let before = sessions.len();
        sessions.retain(|_, record| !record.is_expired_at(now));
        before - sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().expect("session lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
