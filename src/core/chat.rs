//! Chat gate for SkillSwap.
//!
//! Message exchange is derived from session status: a session opens for
//! chat on its first acceptance and never closes again. The gate holds no
//! state of its own; eligibility is recomputed from a fresh session read on
//! every access, never cached, since the session can transition between
//! two reads.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::Session;
use crate::error::{Result, SwapError};
use crate::storage::{MessageStore, SessionStore};

/// One chat utterance, scoped to exactly one session.
///
/// Immutable once sent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// Unique message identifier.
    pub id: String,
    /// The session this message belongs to.
    pub session_ref: String,
    /// The sending participant (always one of the session's two).
    pub sender_id: String,
    /// Message text.
    pub body: String,
    /// When the message was sent.
    pub created_at: DateTime<Utc>,
}

static MESSAGE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a message ID.
///
/// Format: msg_MMMMMM_NNN, epoch microseconds plus a process-local
/// counter, the same scheme as session ids. Transcripts are append-only
/// and keyed by session, so no store check is needed here.
pub fn generate_message_id() -> String {
    let now = Utc::now();
    let counter = MESSAGE_COUNTER.fetch_add(1, Ordering::SeqCst);
    format!("msg_{}_{:03}", now.timestamp_micros(), counter % 1000)
}

/// Pure predicate: does this session's current status permit chat?
///
/// True for `accepted`, `rescheduled`, and `completed`; false for
/// `pending`.
pub fn can_exchange_messages(session: &Session) -> bool {
    session.status.is_chat_eligible()
}

/// The chat gate.
///
/// Authorizes message append/read scoped to a session. Reads the session
/// fresh on every call so the eligibility decision always reflects the
/// current status.
pub struct ChatGate {
    sessions: Arc<dyn SessionStore>,
    messages: Arc<dyn MessageStore>,
}

impl ChatGate {
    /// Create a chat gate over the given stores.
    pub fn new(sessions: Arc<dyn SessionStore>, messages: Arc<dyn MessageStore>) -> Self {
        Self { sessions, messages }
    }

    /// Append a message to a session's transcript.
    ///
    /// Fails `NotFound` if the session doesn't exist, `ChatNotEligible`
    /// while the session is still pending, `Forbidden` if the sender is
    /// not a participant, and `Validation` on an empty body.
    pub fn append_message(
        &self,
        session_id: &str,
        sender_id: &str,
        body: &str,
    ) -> Result<Message> {
        let session = self
            .sessions
            .get(session_id)?
            .ok_or_else(|| SwapError::not_found("session", session_id))?;

        if !can_exchange_messages(&session) {
            return Err(SwapError::chat_not_eligible(session.status.as_str()));
        }
        if !session.is_participant(sender_id) {
            return Err(SwapError::forbidden(format!(
                "{} is not a participant of session {}",
                sender_id, session_id
            )));
        }
        if body.trim().is_empty() {
            return Err(SwapError::validation("message body must not be empty"));
        }

        let message = Message {
            id: generate_message_id(),
            session_ref: session_id.to_string(),
            sender_id: sender_id.to_string(),
            body: body.to_string(),
            created_at: Utc::now(),
        };
        self.messages.append(&message)?;

        tracing::debug!(
            session_id,
            sender_id,
            message_id = %message.id,
            "message appended"
        );
        Ok(message)
    }

    /// List a session's messages in creation order.
    ///
    /// Participant-or-admin authorization is the identity collaborator's
    /// concern, not this gate's; any caller with a valid session id reads
    /// the transcript.
    pub fn list_messages(&self, session_id: &str) -> Result<Vec<Message>> {
        if !self.sessions.exists(session_id)? {
            return Err(SwapError::not_found("session", session_id));
        }
        self.messages.list_for_session(session_id)
    }
}
