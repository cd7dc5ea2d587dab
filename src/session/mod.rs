use std::collections::HashMap;
use std::sync::Arc;

use log::info;
use tokio::sync::{ Mutex, RwLock };

use crate::models::chat::{ ChatTurn, Conversation };

/// Append-only log of one session's turns. Insertion order is display order
/// is chronological order; turns are never rewritten or dropped while the
/// session lives.
#[derive(Debug, Default)]
pub struct ConversationState {
    turns: Vec<ChatTurn>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, turn: ChatTurn) {
        self.turns.push(turn);
    }

    /// Full ordered history, for rendering.
    pub fn snapshot(&self) -> Vec<ChatTurn> {
        self.turns.clone()
    }

    /// The last `k` turns in original order, for request assembly. Never
    /// mutates state.
    pub fn window(&self, k: usize) -> &[ChatTurn] {
        let start = self.turns.len().saturating_sub(k);
        &self.turns[start..]
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

/// Process-wide owner of per-session state, keyed by session id. Sessions
/// are created on first interaction and torn down explicitly. Each session
/// carries its own mutex; callers hold it across the completion round trip
/// so concurrent requests for one session serialize while distinct sessions
/// proceed independently.
#[derive(Default)]
pub struct SessionManager {
    sessions: RwLock<HashMap<String, Arc<Mutex<ConversationState>>>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the session's state, creating it on first interaction.
    pub async fn session(&self, session_id: &str) -> Arc<Mutex<ConversationState>> {
        if let Some(state) = self.sessions.read().await.get(session_id) {
            return Arc::clone(state);
        }

        let mut sessions = self.sessions.write().await;
        // Racing creators resolve to whichever entry landed first.
        Arc::clone(
            sessions
                .entry(session_id.to_string())
                .or_insert_with(|| {
                    info!("Session created: {}", session_id);
                    Arc::new(Mutex::new(ConversationState::new()))
                }),
        )
    }

    /// Look up an existing session without creating one.
    pub async fn get(&self, session_id: &str) -> Option<Arc<Mutex<ConversationState>>> {
        self.sessions.read().await.get(session_id).cloned()
    }

    /// Full ordered history for a session, if it exists.
    pub async fn conversation(&self, session_id: &str) -> Option<Conversation> {
        let state = self.get(session_id).await?;
        let turns = state.lock().await.snapshot();
        Some(Conversation {
            id: session_id.to_string(),
            turns,
        })
    }

    /// Tear a session down. Returns false for an unknown id.
    pub async fn remove(&self, session_id: &str) -> bool {
        let removed = self.sessions.write().await.remove(session_id).is_some();
        if removed {
            info!("Session removed: {}", session_id);
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
