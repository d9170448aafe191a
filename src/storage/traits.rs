//! Storage traits for SkillSwap records.
//!
//! This module defines the `SessionStore` and `MessageStore` traits. The
//! session store owns the compare-and-set transition primitive: the
//! read-validate-write of a single session's status happens atomically
//! inside the store, so two racing transitions from the same observed
//! status can never both succeed.

use std::sync::Arc;

use crate::core::{Message, Session, SessionStatus};
use crate::error::Result;

/// Trait for session storage backends.
pub trait SessionStore: Send + Sync {
    /// Retrieve a session by ID.
    ///
    /// Returns `Ok(None)` if the session doesn't exist.
    fn get(&self, id: &str) -> Result<Option<Session>>;

    /// Save a session.
    ///
    /// Creates a new session or replaces an existing one. Callers other
    /// than the Session Ledger must not use this to rewrite `status`;
    /// status changes go through [`transition`](Self::transition).
    fn put(&self, session: &Session) -> Result<()>;

    /// List all sessions, ordered by `created_at` ascending.
    fn list(&self) -> Result<Vec<Session>>;

    /// Atomically move a session from `expected` to `target` status.
    ///
    /// Fails `NotFound` if the session doesn't exist, and
    /// `InvalidTransition` (reporting the actual current status) if the
    /// session is no longer in `expected`, which is exactly what the
    /// loser of a transition race observes. Returns the updated session.
    fn transition(
        &self,
        id: &str,
        expected: SessionStatus,
        target: SessionStatus,
    ) -> Result<Session>;

    /// Check if a session exists.
    fn exists(&self, id: &str) -> Result<bool> {
        Ok(self.get(id)?.is_some())
    }
}

/// Trait for message storage backends.
///
/// Messages are append-only; there is no update or delete.
pub trait MessageStore: Send + Sync {
    /// Append a message.
    fn append(&self, message: &Message) -> Result<()>;

    /// List every message for a session, ordered by `created_at`
    /// ascending, ties resolved by append order.
    fn list_for_session(&self, session_id: &str) -> Result<Vec<Message>>;
}

/// Blanket implementation of SessionStore for Arc-wrapped stores.
///
/// This allows using `Arc<T>` where `T: SessionStore` is expected, which
/// is useful for sharing one store between ledger, chat gate, and tests.
impl<T: SessionStore + ?Sized> SessionStore for Arc<T> {
    fn get(&self, id: &str) -> Result<Option<Session>> {
        (**self).get(id)
    }

    fn put(&self, session: &Session) -> Result<()> {
        (**self).put(session)
    }

    fn list(&self) -> Result<Vec<Session>> {
        (**self).list()
    }

    fn transition(
        &self,
        id: &str,
        expected: SessionStatus,
        target: SessionStatus,
    ) -> Result<Session> {
        (**self).transition(id, expected, target)
    }
}

/// Blanket implementation of MessageStore for Arc-wrapped stores.
impl<T: MessageStore + ?Sized> MessageStore for Arc<T> {
    fn append(&self, message: &Message) -> Result<()> {
        (**self).append(message)
    }

    fn list_for_session(&self, session_id: &str) -> Result<Vec<Message>> {
        (**self).list_for_session(session_id)
    }
}
