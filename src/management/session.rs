use std::{collections::HashMap, sync::Arc, time::Duration};

use chrono::Utc;
use tokio::sync::RwLock;

use crate::{
    types::{AuthFlow, Token},
    utils,
};

pub const SESSION_COOKIE: &str = "albumhue_session";

/// Sessions that never finished logging in are dropped after this long.
const PENDING_TTL: Duration = Duration::from_secs(10 * 60);

/// Logged-in sessions are dropped after a week without requests.
const IDLE_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Upper bound on sessions without a token.
const MAX_ANONYMOUS: usize = 1024;

#[derive(Debug, Clone, Default)]
struct Session {
    token: Option<Token>,
    pending: Option<AuthFlow>,
    last_seen: u64,
}

fn now() -> u64 {
    Utc::now().timestamp() as u64
}

/// In-memory sessions keyed by the value of [`SESSION_COOKIE`].
///
/// Handlers only use the store to look a credential up; the access token is
/// then passed explicitly to the Spotify client.
///
/// Stale entries are evicted whenever a session is created: anonymous ones
/// after ten minutes, logged-in ones after a week without use. The number of
/// anonymous sessions is capped, oldest first out.
#[derive(Debug, Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    max_anonymous: usize,
    pending_ttl: u64,
    idle_ttl: u64,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_limits(MAX_ANONYMOUS, PENDING_TTL)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with a custom cap on anonymous sessions and their lifetime.
    pub fn with_limits(max_anonymous: usize, pending_ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            max_anonymous: max_anonymous.max(1),
            pending_ttl: pending_ttl.as_secs(),
            idle_ttl: IDLE_TTL.as_secs(),
        }
    }

    /// Creates an empty session and returns its id.
    pub async fn create(&self) -> String {
        let now = now();
        let mut sessions = self.sessions.write().await;
        self.evict(&mut sessions, now);

        let id = utils::generate_session_id();
        sessions.insert(
            id.clone(),
            Session {
                last_seen: now,
                ..Session::default()
            },
        );
        id
    }

    fn evict(&self, sessions: &mut HashMap<String, Session>, now: u64) {
        sessions.retain(|_, s| {
            let ttl = if s.token.is_some() {
                self.idle_ttl
            } else {
                self.pending_ttl
            };
            s.last_seen.saturating_add(ttl) > now
        });

        let mut anonymous: Vec<(u64, String)> = sessions
            .iter()
            .filter(|(_, s)| s.token.is_none())
            .map(|(id, s)| (s.last_seen, id.clone()))
            .collect();

        // leave room for the session about to be inserted
        if anonymous.len() >= self.max_anonymous {
            anonymous.sort();
            let excess = anonymous.len() + 1 - self.max_anonymous;
            for (_, id) in anonymous.into_iter().take(excess) {
                sessions.remove(&id);
            }
        }
    }

    pub async fn exists(&self, id: &str) -> bool {
        self.sessions.read().await.contains_key(id)
    }

    pub async fn begin_auth(&self, id: &str, flow: AuthFlow) {
        let mut sessions = self.sessions.write().await;
        let session = sessions.entry(id.to_string()).or_default();
        session.pending = Some(flow);
        session.last_seen = now();
    }

    /// Removes and returns the pending login, so a callback can only be used once.
    pub async fn take_auth(&self, id: &str) -> Option<AuthFlow> {
        let mut sessions = self.sessions.write().await;
        sessions.get_mut(id).and_then(|s| s.pending.take())
    }

    pub async fn store_token(&self, id: &str, token: Token) {
        let mut sessions = self.sessions.write().await;
        let session = sessions.entry(id.to_string()).or_default();
        session.token = Some(token);
        session.last_seen = now();
    }

    pub async fn token(&self, id: &str) -> Option<Token> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(id)?;
        session.last_seen = now();
        session.token.clone()
    }

    pub async fn remove(&self, id: &str) {
        self.sessions.write().await.remove(id);
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
