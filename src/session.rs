use crate::types::{User, UserType};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};
use tracing::{debug, info};
use uuid::Uuid;

/// Who is logged in. Handed to a dashboard when it is mounted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub user_type: UserType,
    pub user_id: i64,
    pub user_name: String,
}

impl Session {
    pub fn issue(user_type: UserType, user: &User) -> Self {
        Self {
            access_token: Uuid::new_v4().to_string(),
            user_type,
            user_id: user.id(),
            user_name: user.name().to_string(),
        }
    }
}

pub const DEFAULT_MAX_SESSIONS: usize = 1024;
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(8 * 60 * 60);

struct Entry<T> {
    opened_at: Instant,
    dashboard: Arc<Mutex<T>>,
}

/// Live sessions by access token. Each entry owns the dashboard mounted for it,
/// and logging out drops that dashboard together with its store.
///
/// Holds at most `max_sessions` entries. Opening one more evicts the oldest,
/// and sessions older than `ttl` are treated as logged out.
pub struct SessionRegistry<T> {
    sessions: Arc<Mutex<HashMap<String, Entry<T>>>>,
    max_sessions: usize,
    ttl: Duration,
}

impl<T> Clone for SessionRegistry<T> {
    fn clone(&self) -> Self {
        Self {
            sessions: self.sessions.clone(),
            max_sessions: self.max_sessions,
            ttl: self.ttl,
        }
    }
}

impl<T> Default for SessionRegistry<T> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_TTL)
    }
}

impl<T> std::fmt::Debug for SessionRegistry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("sessions", &self.len())
            .field("max_sessions", &self.max_sessions)
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl<T> SessionRegistry<T> {
    pub fn new(max_sessions: usize, ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(Mutex::default()),
            max_sessions: max_sessions.max(1),
            ttl,
        }
    }

    pub fn open(&self, token: String, dashboard: T) {
        self.open_at(token, dashboard, Instant::now());
    }

    fn open_at(&self, token: String, dashboard: T, now: Instant) {
        let mut sessions = self.lock();
        let ttl = self.ttl;
        let before = sessions.len();
        sessions.retain(|_, entry| now.duration_since(entry.opened_at) < ttl);
        if sessions.len() < before {
            debug!(expired = before - sessions.len(), "Expired sessions removed");
        }

        while sessions.len() >= self.max_sessions && !sessions.contains_key(&token) {
            let Some(oldest) = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.opened_at)
                .map(|(token, _)| token.clone())
            else {
                break;
            };
            sessions.remove(&oldest);
            info!("Oldest session evicted");
        }

        sessions.insert(
            token,
            Entry {
                opened_at: now,
                dashboard: Arc::new(Mutex::new(dashboard)),
            },
        );
    }

    pub fn get(&self, token: &str) -> Option<Arc<Mutex<T>>> {
        self.get_at(token, Instant::now())
    }

    fn get_at(&self, token: &str, now: Instant) -> Option<Arc<Mutex<T>>> {
        let mut sessions = self.lock();
        let entry = sessions.get(token)?;
        if now.duration_since(entry.opened_at) >= self.ttl {
            sessions.remove(token);
            info!("Session expired");
            return None;
        }
        Some(entry.dashboard.clone())
    }

    /// Returns false when the token was not logged in.
    pub fn logout(&self, token: &str) -> bool {
        let removed = self.lock().remove(token).is_some();
        if removed {
            info!("Session closed");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Entry<T>>> {
        self.sessions.lock().unwrap_or_else(|err| err.into_inner())
    }
}
