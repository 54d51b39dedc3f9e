//! Shared application state and the in-memory session table.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use esrs_chat::LLMStatus;
use esrs_core::{EsrsConfig, MAX_SESSION_TTL_MINUTES};
use esrs_runtime::{Assistant, ConversationState};
use esrs_store::IndexStore;
use parking_lot::RwLock;
use tracing::{debug, info};

const MAX_SESSIONS: usize = 1000;

struct SessionEntry {
    conversation: ConversationState,
    last_seen: DateTime<Utc>,
}

/// Conversations keyed by session id, expiring after a sliding TTL.
///
/// Writes are last-write-wins: two concurrent requests of one session both
/// start from the same snapshot and the later store replaces the earlier.
pub struct SessionManager {
    sessions: RwLock<HashMap<String, SessionEntry>>,
    ttl: Duration,
    max_sessions: usize,
}

impl SessionManager {
    pub fn new(ttl_minutes: u64, max_sessions: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl: Duration::minutes(ttl_minutes.min(MAX_SESSION_TTL_MINUTES) as i64),
            max_sessions,
        }
    }

    fn is_expired(&self, entry: &SessionEntry, now: DateTime<Utc>) -> bool {
        now - entry.last_seen > self.ttl
    }

    /// Snapshot of a live session's conversation. Refreshes its TTL.
    pub fn get(&self, id: &str) -> Option<ConversationState> {
        let now = Utc::now();
        let mut sessions = self.sessions.write();
        let expired = match sessions.get_mut(id) {
            Some(entry) if !self.is_expired(entry, now) => {
                entry.last_seen = now;
                return Some(entry.conversation.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            sessions.remove(id);
            debug!("Session {} expired", id);
        }
        None
    }

    /// Store a session's conversation, evicting expired then oldest sessions.
    pub fn put(&self, id: &str, conversation: ConversationState) {
        let now = Utc::now();
        let mut sessions = self.sessions.write();

        if !sessions.contains_key(id) && sessions.len() >= self.max_sessions {
            sessions.retain(|_, entry| now - entry.last_seen <= self.ttl);
            if sessions.len() >= self.max_sessions {
                if let Some(oldest) = sessions
                    .iter()
                    .min_by_key(|(_, entry)| entry.last_seen)
                    .map(|(id, _)| id.clone())
                {
                    sessions.remove(&oldest);
                    info!("Session cap reached, evicted {}", oldest);
                }
            }
        }

        sessions.insert(
            id.to_string(),
            SessionEntry {
                conversation,
                last_seen: now,
            },
        );
    }

    pub fn remove(&self, id: &str) -> bool {
        self.sessions.write().remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    #[cfg(test)]
    fn backdate(&self, id: &str, by: Duration) {
        if let Some(entry) = self.sessions.write().get_mut(id) {
            entry.last_seen = entry.last_seen - by;
        }
    }
}

/// Shared application state accessible from all route handlers.
pub struct AppState {
    pub config: EsrsConfig,
    pub store: Arc<IndexStore>,
    pub assistant: Assistant,
    pub llm_status: LLMStatus,
    pub reranker: String,
    pub sessions: SessionManager,
}

impl AppState {
    pub fn new(
        config: EsrsConfig,
        store: Arc<IndexStore>,
        assistant: Assistant,
        llm_status: LLMStatus,
        reranker: String,
    ) -> Self {
        let sessions = SessionManager::new(config.session_ttl_minutes, MAX_SESSIONS);
        Self {
            config,
            store,
            assistant,
            llm_status,
            reranker,
            sessions,
        }
    }
}
