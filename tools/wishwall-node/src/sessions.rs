use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tracing::{debug, info, warn};

use wishwall_common::error::{BoardError, Result};
use wishwall_common::identity::{Role, Session};

/// Hours a session may go unused before it is dropped.
pub const SESSION_IDLE_HOURS: i64 = 12;

/// Most sessions held at once. Signing in beyond this evicts the least
/// recently used one.
pub const MAX_SESSIONS: usize = 4096;

#[derive(Debug, Clone)]
struct Entry {
    session: Session,
    last_seen: DateTime<Utc>,
}

/// Sessions issued by this node, keyed by bearer token.
#[derive(Debug)]
pub struct SessionRegistry {
    sessions: DashMap<String, Entry>,
    admin_token: Option<String>,
    allow_anonymous: bool,
    idle_ttl: Duration,
    capacity: usize,
}

impl SessionRegistry {
    pub fn new(admin_token: Option<String>, allow_anonymous: bool) -> Self {
        SessionRegistry {
            sessions: DashMap::new(),
            admin_token: admin_token.filter(|t| !t.is_empty()),
            allow_anonymous,
            idle_ttl: Duration::hours(SESSION_IDLE_HOURS),
            capacity: MAX_SESSIONS,
        }
    }

    pub fn with_limits(mut self, idle_ttl: Duration, capacity: usize) -> Self {
        self.idle_ttl = idle_ttl;
        self.capacity = capacity.max(1);
        self
    }

    /// Issue a session. The admin token yields a moderator, no token a guest.
    pub fn sign_in(&self, token: Option<&str>) -> Result<Session> {
        self.sign_in_at(token, Utc::now())
    }

    fn sign_in_at(&self, token: Option<&str>, now: DateTime<Utc>) -> Result<Session> {
        let role = match token {
            Some(presented) if self.admin_token.as_deref() == Some(presented) => Role::Moderator,
            Some(_) => {
                warn!("Sign-in with unknown token");
                return Err(BoardError::Unauthorized("unknown token".into()));
            }
            None if self.allow_anonymous => Role::Guest,
            None => {
                return Err(BoardError::Unauthorized(
                    "anonymous sign-in is disabled".into(),
                ))
            }
        };
        self.make_room(now);
        let session = Session::issue(role, now);
        self.sessions.insert(
            session.token.clone(),
            Entry {
                session: session.clone(),
                last_seen: now,
            },
        );
        info!(session = %session.id, ?role, "Session issued");
        Ok(session)
    }

    /// Look up the session behind a bearer token and mark it as used.
    pub fn resolve(&self, token: Option<&str>) -> Result<Session> {
        self.resolve_at(token, Utc::now())
    }

    fn resolve_at(&self, token: Option<&str>, now: DateTime<Utc>) -> Result<Session> {
        let token = token.ok_or_else(|| BoardError::Unauthorized("missing bearer token".into()))?;
        let expired = {
            let mut entry = self
                .sessions
                .get_mut(token)
                .ok_or_else(|| BoardError::Unauthorized("unknown session".into()))?;
            if now - entry.last_seen < self.idle_ttl {
                entry.last_seen = now;
                return Ok(entry.session.clone());
            }
            entry.session.id.clone()
        };
        self.sessions.remove(token);
        debug!(session = %expired, "Session expired");
        Err(BoardError::Unauthorized("session expired".into()))
    }

    /// Drop idle sessions, then the least recently used ones, until one more fits.
    fn make_room(&self, now: DateTime<Utc>) {
        if self.sessions.len() < self.capacity {
            return;
        }
        let ttl = self.idle_ttl;
        self.sessions.retain(|_, entry| now - entry.last_seen < ttl);
        while self.sessions.len() >= self.capacity {
            let oldest = self
                .sessions
                .iter()
                .min_by_key(|entry| entry.value().last_seen)
                .map(|entry| entry.key().clone());
            let Some(token) = oldest else { break };
            if let Some((_, entry)) = self.sessions.remove(&token) {
                debug!(session = %entry.session.id, "Session evicted");
            }
        }
    }

    /// Like [`resolve`](Self::resolve), but the session must be a moderator's.
    pub fn resolve_moderator(&self, token: Option<&str>) -> Result<Session> {
        let session = self.resolve(token)?;
        if !session.role.can_moderate() {
            return Err(BoardError::Forbidden(format!(
                "session {} may not moderate",
                session.id
            )));
        }
        Ok(session)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
