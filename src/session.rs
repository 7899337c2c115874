use std::collections::HashMap;
use std::time::{Duration, Instant};

use log::{debug, info};
use parking_lot::Mutex;
use uuid::Uuid;

use crate::quota::{Admission, QuotaTracker};

pub const SESSION_COOKIE: &str = "ytscribe_session";

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

pub type SessionId = Uuid;

#[derive(Debug)]
struct Session {
    quota: QuotaTracker,
    last_seen: Instant,
}

impl Session {
    fn is_expired(&self, now: Instant, idle_ttl: Duration) -> bool {
        now.saturating_duration_since(self.last_seen) >= idle_ttl
    }
}

struct Sessions {
    map: HashMap<SessionId, Session>,
    last_sweep: Instant,
}

impl Sessions {
    fn sweep(&mut self, now: Instant, idle_ttl: Duration) {
        if now.saturating_duration_since(self.last_sweep) < SWEEP_INTERVAL {
            return;
        }
        self.last_sweep = now;
        let before = self.map.len();
        self.map.retain(|_, s| !s.is_expired(now, idle_ttl));
        let expired = before - self.map.len();
        if expired > 0 {
            info!("Expired {expired} idle sessions, {} live", self.map.len());
        }
    }

    fn drop_if_expired(&mut self, id: SessionId, now: Instant, idle_ttl: Duration) {
        if self.map.get(&id).is_some_and(|s| s.is_expired(now, idle_ttl)) {
            debug!("Session {id} idled out");
            self.map.remove(&id);
        }
    }
}

/// Per-browser quota state keyed by the id carried in the session cookie.
///
/// A session is only stored once it has submitted something, and is dropped
/// after `idle_ttl` without requests. Every quota decision happens under the
/// store lock, so concurrent requests from one browser cannot overrun the
/// limit.
pub struct SessionStore {
    query_limit: u32,
    idle_ttl: Duration,
    inner: Mutex<Sessions>,
}

impl SessionStore {
    pub fn new(query_limit: u32, idle_ttl: Duration) -> Self {
        Self {
            query_limit,
            idle_ttl,
            inner: Mutex::new(Sessions {
                map: HashMap::new(),
                last_sweep: Instant::now(),
            }),
        }
    }

    /// The cookie's session id, or a fresh one for a first visit. Ids are not
    /// stored until they submit, and an idled-out id starts over.
    pub fn resolve(&self, id: Option<SessionId>) -> SessionId {
        self.resolve_at(id, Instant::now())
    }

    fn resolve_at(&self, id: Option<SessionId>, now: Instant) -> SessionId {
        let mut inner = self.inner.lock();
        inner.sweep(now, self.idle_ttl);
        match id {
            Some(id) => {
                inner.drop_if_expired(id, now, self.idle_ttl);
                if let Some(session) = inner.map.get_mut(&id) {
                    session.last_seen = now;
                }
                id
            }
            None => Uuid::new_v4(),
        }
    }

    /// Check and count one submission for the session
    pub fn try_submit(&self, id: SessionId) -> Admission {
        self.try_submit_at(id, Instant::now())
    }

    fn try_submit_at(&self, id: SessionId, now: Instant) -> Admission {
        let mut inner = self.inner.lock();
        inner.drop_if_expired(id, now, self.idle_ttl);
        let session = inner.map.entry(id).or_insert_with(|| {
            info!("Created session {id}");
            Session {
                quota: QuotaTracker::new(self.query_limit),
                last_seen: now,
            }
        });
        session.last_seen = now;
        let admission = session.quota.try_submit();
        debug!(
            "Session {id} {admission:?} at {}/{}",
            session.quota.query_count(),
            session.quota.limit()
        );
        admission
    }

    /// Current quota for the session; untouched sessions have a fresh one
    pub fn quota(&self, id: SessionId) -> QuotaTracker {
        self.inner
            .lock()
            .map
            .get(&id)
            .map(|s| s.quota)
            .unwrap_or_else(|| QuotaTracker::new(self.query_limit))
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.inner.lock().map.len()
    }
}

/// Pull the session id out of a `Cookie` header value
pub fn session_id_from_cookie(header: &str) -> Option<SessionId> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

/// Browser-session cookie: no expiry, so it goes away with the browser session
pub fn session_cookie(id: SessionId) -> String {
    format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax")
}
