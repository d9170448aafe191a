//! In-memory record storage.
//!
//! Thread-safe implementations of the storage traits backed by `RwLock`ed
//! collections. The session store performs compare-and-set transitions
//! under the write lock, which is the single-writer-per-key discipline the
//! Session Ledger relies on. Used by unit tests and embeddings that don't
//! need persistence.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::core::{Message, Session, SessionStatus};
use crate::error::{Result, SwapError};
use crate::storage::{MessageStore, SessionStore};

/// In-memory session store.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl MemorySessionStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Get the number of sessions in the store.
    pub fn len(&self) -> usize {
        self.sessions.read().unwrap().len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.sessions.read().unwrap().is_empty()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, id: &str) -> Result<Option<Session>> {
        let sessions = self.sessions.read().unwrap();
        Ok(sessions.get(id).cloned())
    }

    fn put(&self, session: &Session) -> Result<()> {
        let mut sessions = self.sessions.write().unwrap();
        sessions.insert(session.id.clone(), session.clone());
        Ok(())
    }

    fn list(&self) -> Result<Vec<Session>> {
        let sessions = self.sessions.read().unwrap();
        let mut result: Vec<Session> = sessions.values().cloned().collect();
        result.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(result)
    }

    fn transition(
        &self,
        id: &str,
        expected: SessionStatus,
        target: SessionStatus,
    ) -> Result<Session> {
        // Check-and-set under the write lock: concurrent callers observe
        // either the old or the new status, never a torn state.
        let mut sessions = self.sessions.write().unwrap();
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| SwapError::not_found("session", id))?;
        if session.status != expected {
            return Err(SwapError::invalid_transition(
                session.status.as_str(),
                target.as_str(),
            ));
        }
        session.status = target;
        Ok(session.clone())
    }
}

/// In-memory message store.
///
/// Messages are held in append order, which also resolves `created_at`
/// ties deterministically.
#[derive(Debug, Default)]
pub struct MemoryMessageStore {
    messages: RwLock<Vec<Message>>,
}

impl MemoryMessageStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            messages: RwLock::new(Vec::new()),
        }
    }

    /// Get the total number of messages across all sessions.
    pub fn len(&self) -> usize {
        self.messages.read().unwrap().len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.messages.read().unwrap().is_empty()
    }
}

impl MessageStore for MemoryMessageStore {
    fn append(&self, message: &Message) -> Result<()> {
        let mut messages = self.messages.write().unwrap();
        messages.push(message.clone());
        Ok(())
    }

    fn list_for_session(&self, session_id: &str) -> Result<Vec<Message>> {
        let messages = self.messages.read().unwrap();
        let mut result: Vec<Message> = messages
            .iter()
            .filter(|m| m.session_ref == session_id)
            .cloned()
            .collect();
        // Stable sort keeps append order on equal timestamps.
        result.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(result)
    }
}
