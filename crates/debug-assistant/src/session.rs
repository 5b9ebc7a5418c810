/// In-memory session transcripts.
///
/// A session is an append-only list of chat turns keyed by an opaque hex id.
/// Transcripts live only as long as the server process; ending a session
/// discards its transcript.
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

use crate::model::{ChatTurn, Role};

pub struct SessionStore {
    sessions: Mutex<HashMap<String, Vec<ChatTurn>>>,
    counter: AtomicU64,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            counter: AtomicU64::new(0),
        }
    }

    /// Create a session seeded with one assistant turn (the greeting shown
    /// before the user asks anything) and return its id.
    pub async fn start(&self, greeting: &str) -> String {
        let id = self.new_session_id();
        let mut sessions = self.sessions.lock().await;
        sessions.insert(
            id.clone(),
            vec![ChatTurn {
                role: Role::Assistant,
                text: greeting.to_string(),
            }],
        );
        id
    }

    pub async fn contains(&self, session_id: &str) -> bool {
        self.sessions.lock().await.contains_key(session_id)
    }

    /// Append a turn to an existing session. Returns false for an unknown id.
    pub async fn append(&self, session_id: &str, role: Role, text: &str) -> bool {
        let mut sessions = self.sessions.lock().await;
        match sessions.get_mut(session_id) {
            Some(turns) => {
                turns.push(ChatTurn {
                    role,
                    text: text.to_string(),
                });
                true
            }
            None => false,
        }
    }

    /// Full transcript in append order, or None for an unknown id.
    pub async fn transcript(&self, session_id: &str) -> Option<Vec<ChatTurn>> {
        self.sessions.lock().await.get(session_id).cloned()
    }

    /// End a session, discarding its transcript. Returns false if the id
    /// was already gone, so ending twice is harmless.
    pub async fn end(&self, session_id: &str) -> bool {
        self.sessions.lock().await.remove(session_id).is_some()
    }

    /// Opaque 32-char hex id, hashed from wall clock, pid, and a counter so
    /// concurrent starts never collide.
    fn new_session_id(&self) -> String {
        let seq = self.counter.fetch_add(1, Ordering::Relaxed);
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        let mut hasher = Sha256::new();
        hasher.update(nanos.to_le_bytes());
        hasher.update(std::process::id().to_le_bytes());
        hasher.update(seq.to_le_bytes());
        let mut hex = format!("{:x}", hasher.finalize());
        hex.truncate(32);
        hex
    }
}
