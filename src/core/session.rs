//! Session record and status state machine for SkillSwap.
//!
//! A session is one proposed/ongoing/finished teaching engagement between a
//! mentor (the skill owner) and a learner (the requester). The status field
//! is the state machine's controlled value: nothing outside the Session
//! Ledger writes it, and the reachable statuses are exactly the ones the
//! transition table in [`SessionStatus::can_transition_to`] allows.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SwapError};

/// Session lifecycle status.
///
/// `Pending` is the initial status; `Completed` is terminal. The full
/// transition table lives in [`can_transition_to`](Self::can_transition_to).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Requested by a learner, not yet acknowledged by the mentor.
    #[default]
    Pending,
    /// Mentor agreed to teach at the proposed slot.
    Accepted,
    /// Mentor pushed the session to another slot; still going ahead.
    Rescheduled,
    /// Teaching happened; triggers the one-time point credit.
    Completed,
}

impl SessionStatus {
    /// Check if this status is terminal (no further transitions defined).
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Completed)
    }

    /// Check if a session in this status permits message exchange.
    ///
    /// Chat opens on the first acceptance and never closes again: a
    /// completed session still allows follow-up messages.
    pub fn is_chat_eligible(&self) -> bool {
        !matches!(self, SessionStatus::Pending)
    }

    /// Check if `target` is a legal next status from this one.
    ///
    /// The table (mentor-only, actor checks happen before this):
    ///
    /// | current     | allowed targets          |
    /// |-------------|--------------------------|
    /// | pending     | accepted, rescheduled    |
    /// | accepted    | completed, rescheduled   |
    /// | rescheduled | completed, accepted      |
    /// | completed   | (none)                   |
    ///
    /// No transition ever returns to `pending`.
    pub fn can_transition_to(&self, target: SessionStatus) -> bool {
        use SessionStatus::*;
        matches!(
            (self, target),
            (Pending, Accepted)
                | (Pending, Rescheduled)
                | (Accepted, Completed)
                | (Accepted, Rescheduled)
                | (Rescheduled, Completed)
                | (Rescheduled, Accepted)
        )
    }

    /// Wire-format name of this status (`pending`, `accepted`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Pending => "pending",
            SessionStatus::Accepted => "accepted",
            SessionStatus::Rescheduled => "rescheduled",
            SessionStatus::Completed => "completed",
        }
    }

    /// Parse a wire-format status name.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(SessionStatus::Pending),
            "accepted" => Ok(SessionStatus::Accepted),
            "rescheduled" => Ok(SessionStatus::Rescheduled),
            "completed" => Ok(SessionStatus::Completed),
            other => Err(SwapError::validation(format!(
                "unknown session status: {}",
                other
            ))),
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One teaching engagement between a mentor and a learner.
///
/// Every field except `status` is immutable after creation. `mentor_id` is
/// resolved from the skill's owner when the session is created; `learner_id`
/// is the requester. The two are guaranteed distinct.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    /// Unique session identifier.
    pub id: String,
    /// Reference to the skill being taught.
    pub skill_ref: String,
    /// The skill owner. Sole actor permitted to transition the session.
    pub mentor_id: String,
    /// The requester.
    pub learner_id: String,
    /// Current lifecycle status. Written only by the Session Ledger.
    pub status: SessionStatus,
    /// Proposed date, e.g. "2025-03-01". Opaque to the state machine.
    pub date: String,
    /// Proposed slot, e.g. "10:00-11:00". Opaque to the state machine.
    pub time_slot: String,
    /// Proposed mode, e.g. "online" or "in-person". Opaque to the state machine.
    pub teaching_mode: String,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Check if `user_id` is one of the two participants.
    pub fn is_participant(&self, user_id: &str) -> bool {
        self.mentor_id == user_id || self.learner_id == user_id
    }

    /// Check if `user_id` is the mentor.
    pub fn is_mentor(&self, user_id: &str) -> bool {
        self.mentor_id == user_id
    }
}

/// Parameters for creating a session. The learner supplies all of these;
/// the mentor is resolved from the skill directory, never passed in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRequest {
    /// The requesting learner.
    pub learner_id: String,
    /// The skill to learn.
    pub skill_ref: String,
    /// Proposed date.
    pub date: String,
    /// Proposed time slot.
    pub time_slot: String,
    /// Proposed teaching mode.
    pub teaching_mode: String,
}

impl SessionRequest {
    /// Reject requests with missing required fields.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("learner_id", &self.learner_id),
            ("skill_ref", &self.skill_ref),
            ("date", &self.date),
            ("time_slot", &self.time_slot),
            ("teaching_mode", &self.teaching_mode),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(SwapError::validation(format!(
                    "{} must not be empty",
                    name
                )));
            }
        }
        Ok(())
    }
}

static SESSION_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a session ID candidate.
///
/// Format: sess_MMMMMM_NNN where MMMMMM is the creation instant in epoch
/// microseconds and NNN a process-local counter that wraps at 1000. The
/// instant keeps ids from separate process invocations apart; the counter
/// keeps calls within the same microsecond apart. This is a candidate
/// only: the Session Ledger checks the store before using one, which is
/// the actual uniqueness authority.
pub fn generate_session_id() -> String {
    let now = Utc::now();
    let counter = SESSION_COUNTER.fetch_add(1, Ordering::SeqCst);
    format!("sess_{}_{:03}", now.timestamp_micros(), counter % 1000)
}

/// Reset the session ID counter.
///
/// Primarily for testing purposes (simulates a fresh process).
#[cfg(test)]
pub fn reset_session_counter() {
    SESSION_COUNTER.store(0, Ordering::SeqCst);
}
