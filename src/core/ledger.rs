//! Session ledger for SkillSwap.
//!
//! The authoritative owner of session records and the only component that
//! moves a session's status. All state mutations go through
//! [`SessionLedger::request_transition`], which checks the actor first
//! (wrong actor reads differently to the caller than wrong state), then the
//! transition table, then applies the change via the store's compare-and-set
//! so racing requests produce at most one winner. The point credit for a
//! completed session is applied synchronously before success is returned:
//! a caller who observes `completed` can rely on the credit being there.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::core::points::PointsLedger;
use crate::core::session::{generate_session_id, Session, SessionRequest, SessionStatus};
use crate::directory::SkillDirectory;
use crate::error::{Result, SwapError};
use crate::storage::SessionStore;

/// A user's sessions grouped by the role they play in each.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionsByRole {
    /// Sessions this user requested.
    pub as_learner: Vec<Session>,
    /// Sessions this user teaches.
    pub as_mentor: Vec<Session>,
}

/// The session ledger.
pub struct SessionLedger {
    sessions: Arc<dyn SessionStore>,
    directory: Arc<dyn SkillDirectory>,
    points: Arc<PointsLedger>,
}

impl SessionLedger {
    /// Create a ledger over the given store, skill directory, and points
    /// ledger.
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        directory: Arc<dyn SkillDirectory>,
        points: Arc<PointsLedger>,
    ) -> Self {
        Self {
            sessions,
            directory,
            points,
        }
    }

    /// Create a session from a learner's request.
    ///
    /// The mentor is resolved from the skill's owner, never passed in.
    /// Fails `Validation` on missing fields or when the learner owns the
    /// skill themselves, and `NotFound` for an unknown skill. The new
    /// session starts `pending`.
    pub fn create_session(&self, request: SessionRequest) -> Result<Session> {
        request.validate()?;

        let skill = self.directory.resolve(&request.skill_ref)?;
        if skill.mentor_id == request.learner_id {
            return Err(SwapError::validation(
                "learner cannot request a session for their own skill",
            ));
        }

        // The generator's instant plus counter makes collisions rare; the
        // store check makes the remaining ones harmless. A candidate id
        // that is already taken (say, two processes started inside the
        // same microsecond) is discarded and regenerated, so `put` never
        // silently replaces an unrelated session.
        let mut id = generate_session_id();
        while self.sessions.exists(&id)? {
            id = generate_session_id();
        }

        let session = Session {
            id,
            skill_ref: request.skill_ref,
            mentor_id: skill.mentor_id,
            learner_id: request.learner_id,
            status: SessionStatus::Pending,
            date: request.date,
            time_slot: request.time_slot,
            teaching_mode: request.teaching_mode,
            created_at: Utc::now(),
        };
        self.sessions.put(&session)?;

        tracing::info!(
            session_id = %session.id,
            skill_ref = %session.skill_ref,
            mentor_id = %session.mentor_id,
            learner_id = %session.learner_id,
            "session created"
        );
        Ok(session)
    }

    /// Request a status transition on behalf of a user.
    ///
    /// Checks run in this order, so the caller learns the most specific
    /// reason for a rejection:
    ///
    /// 1. `NotFound`: no such session.
    /// 2. `Forbidden`: the caller is not the session's mentor. Learners
    ///    can never transition a session (accepting or completing asserts
    ///    that teaching was arranged or happened, which only the mentor can
    ///    claim); there is no cancellation path for either side.
    /// 3. `InvalidTransition`: the (current, target) pair is not in the
    ///    table, including everything out of `completed`.
    ///
    /// The write itself is a compare-and-set keyed on the status observed
    /// during validation; of two racing requests, exactly one wins and the
    /// other fails `InvalidTransition`. On a transition to `completed` the
    /// mentor's point credit is applied before this returns.
    pub fn request_transition(
        &self,
        session_id: &str,
        requesting_user_id: &str,
        target: SessionStatus,
    ) -> Result<Session> {
        let session = self
            .sessions
            .get(session_id)?
            .ok_or_else(|| SwapError::not_found("session", session_id))?;

        if !session.is_mentor(requesting_user_id) {
            return Err(SwapError::forbidden(format!(
                "only the mentor may transition session {}",
                session_id
            )));
        }

        if !session.status.can_transition_to(target) {
            return Err(SwapError::invalid_transition(
                session.status.as_str(),
                target.as_str(),
            ));
        }

        let updated = self.sessions.transition(session_id, session.status, target)?;

        tracing::info!(
            session_id,
            from = session.status.as_str(),
            to = updated.status.as_str(),
            "session transitioned"
        );

        if updated.status == SessionStatus::Completed {
            // Synchronous and idempotent: double-crediting is impossible
            // even if a retry reaches this point twice.
            self.points.credit_session_completion(&updated)?;
        }

        Ok(updated)
    }

    /// List a user's sessions, grouped by role, each group ordered by
    /// creation time ascending.
    pub fn list_sessions_for(&self, user_id: &str) -> Result<SessionsByRole> {
        let mut by_role = SessionsByRole::default();
        for session in self.sessions.list()? {
            if session.learner_id == user_id {
                by_role.as_learner.push(session);
            } else if session.mentor_id == user_id {
                by_role.as_mentor.push(session);
            }
        }
        Ok(by_role)
    }

    /// Fetch one session by id.
    pub fn get_session(&self, session_id: &str) -> Result<Session> {
        self.sessions
            .get(session_id)?
            .ok_or_else(|| SwapError::not_found("session", session_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::chat::{can_exchange_messages, ChatGate};
    use crate::directory::MemorySkillDirectory;
    use crate::storage::{MemoryMessageStore, MemorySessionStore};

    struct Fixture {
        ledger: SessionLedger,
        chat: ChatGate,
        points: Arc<PointsLedger>,
    }

    fn fixture() -> Fixture {
        let sessions: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
        let messages = Arc::new(MemoryMessageStore::new());
        let directory = MemorySkillDirectory::new();
        directory.add("skill_guitar", "mentor_m");
        directory.add("skill_chess", "learner_l");
        let points = Arc::new(PointsLedger::new(10));
        points.register_user("mentor_m", "Mona");
        points.register_user("learner_l", "Lee");

        Fixture {
            ledger: SessionLedger::new(
                Arc::clone(&sessions),
                Arc::new(directory),
                Arc::clone(&points),
            ),
            chat: ChatGate::new(sessions, messages),
            points,
        }
    }

    fn request() -> SessionRequest {
        SessionRequest {
            learner_id: "learner_l".to_string(),
            skill_ref: "skill_guitar".to_string(),
            date: "2025-03-01".to_string(),
            time_slot: "10:00-11:00".to_string(),
            teaching_mode: "online".to_string(),
        }
    }

    #[test]
    fn test_create_session_starts_pending() {
        let fix = fixture();
        let session = fix.ledger.create_session(request()).unwrap();

        assert_eq!(session.status, SessionStatus::Pending);
        assert_eq!(session.mentor_id, "mentor_m");
        assert_eq!(session.learner_id, "learner_l");
        assert_eq!(session.date, "2025-03-01");
        assert_eq!(session.time_slot, "10:00-11:00");
        assert_eq!(session.teaching_mode, "online");
        assert!(!can_exchange_messages(&session));
    }

    #[test]
    fn test_create_session_unknown_skill() {
        let fix = fixture();
        let mut req = request();
        req.skill_ref = "skill_unknown".to_string();
        let err = fix.ledger.create_session(req).unwrap_err();
        assert!(matches!(err, SwapError::NotFound { kind: "skill", .. }));
    }

    #[test]
    fn test_create_session_rejects_self_mentoring() {
        let fix = fixture();
        let mut req = request();
        req.skill_ref = "skill_chess".to_string(); // owned by learner_l
        let err = fix.ledger.create_session(req).unwrap_err();
        assert!(matches!(err, SwapError::Validation { .. }));
    }

    #[test]
    fn test_create_session_rejects_missing_fields() {
        let fix = fixture();
        let mut req = request();
        req.date = String::new();
        assert!(matches!(
            fix.ledger.create_session(req).unwrap_err(),
            SwapError::Validation { .. }
        ));
    }

    #[test]
    fn test_mentor_accepts_and_chat_opens() {
        let fix = fixture();
        let session = fix.ledger.create_session(request()).unwrap();

        let updated = fix
            .ledger
            .request_transition(&session.id, "mentor_m", SessionStatus::Accepted)
            .unwrap();
        assert_eq!(updated.status, SessionStatus::Accepted);
        assert!(can_exchange_messages(&updated));

        // Learner can chat now.
        fix.chat
            .append_message(&session.id, "learner_l", "looking forward to it")
            .unwrap();
    }

    #[test]
    fn test_learner_transitions_always_forbidden() {
        let fix = fixture();
        let session = fix.ledger.create_session(request()).unwrap();

        for target in [
            SessionStatus::Pending,
            SessionStatus::Accepted,
            SessionStatus::Rescheduled,
            SessionStatus::Completed,
        ] {
            let err = fix
                .ledger
                .request_transition(&session.id, "learner_l", target)
                .unwrap_err();
            assert!(
                matches!(err, SwapError::Forbidden { .. }),
                "learner should be forbidden for target {target}"
            );
        }
        // Still pending after all that.
        assert_eq!(
            fix.ledger.get_session(&session.id).unwrap().status,
            SessionStatus::Pending
        );
    }

    #[test]
    fn test_stranger_transitions_forbidden() {
        let fix = fixture();
        let session = fix.ledger.create_session(request()).unwrap();
        let err = fix
            .ledger
            .request_transition(&session.id, "stranger", SessionStatus::Accepted)
            .unwrap_err();
        assert!(matches!(err, SwapError::Forbidden { .. }));
    }

    #[test]
    fn test_unknown_session_not_found() {
        let fix = fixture();
        let err = fix
            .ledger
            .request_transition("no-such", "mentor_m", SessionStatus::Accepted)
            .unwrap_err();
        assert!(matches!(err, SwapError::NotFound { .. }));
    }

    #[test]
    fn test_off_table_transitions_rejected() {
        let fix = fixture();
        let session = fix.ledger.create_session(request()).unwrap();

        // pending -> completed skips acceptance.
        let err = fix
            .ledger
            .request_transition(&session.id, "mentor_m", SessionStatus::Completed)
            .unwrap_err();
        assert!(matches!(err, SwapError::InvalidTransition { .. }));
    }

    #[test]
    fn test_reschedule_round_trip() {
        let fix = fixture();
        let session = fix.ledger.create_session(request()).unwrap();

        // pending -> rescheduled -> accepted -> rescheduled -> completed
        for target in [
            SessionStatus::Rescheduled,
            SessionStatus::Accepted,
            SessionStatus::Rescheduled,
            SessionStatus::Completed,
        ] {
            let updated = fix
                .ledger
                .request_transition(&session.id, "mentor_m", target)
                .unwrap();
            assert_eq!(updated.status, target);
            assert!(can_exchange_messages(&updated));
        }
        assert_eq!(fix.points.points_for("mentor_m"), 10);
    }

    #[test]
    fn test_completion_credits_mentor_exactly_once() {
        let fix = fixture();
        let session = fix.ledger.create_session(request()).unwrap();
        fix.ledger
            .request_transition(&session.id, "mentor_m", SessionStatus::Accepted)
            .unwrap();

        let updated = fix
            .ledger
            .request_transition(&session.id, "mentor_m", SessionStatus::Completed)
            .unwrap();
        assert_eq!(updated.status, SessionStatus::Completed);
        assert_eq!(fix.points.points_for("mentor_m"), 10);

        // A second identical call fails InvalidTransition and changes nothing.
        let err = fix
            .ledger
            .request_transition(&session.id, "mentor_m", SessionStatus::Completed)
            .unwrap_err();
        assert!(matches!(err, SwapError::InvalidTransition { .. }));
        assert_eq!(fix.points.points_for("mentor_m"), 10);
    }

    #[test]
    fn test_completed_is_terminal() {
        let fix = fixture();
        let session = fix.ledger.create_session(request()).unwrap();
        fix.ledger
            .request_transition(&session.id, "mentor_m", SessionStatus::Accepted)
            .unwrap();
        fix.ledger
            .request_transition(&session.id, "mentor_m", SessionStatus::Completed)
            .unwrap();

        for target in [
            SessionStatus::Pending,
            SessionStatus::Accepted,
            SessionStatus::Rescheduled,
        ] {
            let err = fix
                .ledger
                .request_transition(&session.id, "mentor_m", target)
                .unwrap_err();
            assert!(matches!(err, SwapError::InvalidTransition { .. }));
        }
        // Chat stays open after completion.
        fix.chat
            .append_message(&session.id, "mentor_m", "good work today")
            .unwrap();
    }

    #[test]
    fn test_list_sessions_for_groups_by_role() {
        let fix = fixture();
        let s1 = fix.ledger.create_session(request()).unwrap();
        let s2 = fix.ledger.create_session(request()).unwrap();

        let for_learner = fix.ledger.list_sessions_for("learner_l").unwrap();
        assert_eq!(for_learner.as_learner.len(), 2);
        assert!(for_learner.as_mentor.is_empty());
        assert_eq!(for_learner.as_learner[0].id, s1.id);
        assert_eq!(for_learner.as_learner[1].id, s2.id);

        let for_mentor = fix.ledger.list_sessions_for("mentor_m").unwrap();
        assert_eq!(for_mentor.as_mentor.len(), 2);
        assert!(for_mentor.as_learner.is_empty());

        let for_stranger = fix.ledger.list_sessions_for("stranger").unwrap();
        assert!(for_stranger.as_learner.is_empty());
        assert!(for_stranger.as_mentor.is_empty());
    }

    #[test]
    fn test_sessions_survive_id_counter_restart() {
        use crate::core::session::reset_session_counter;
        use crate::storage::FileSessionStore;
        use tempfile::TempDir;

        let temp = TempDir::new().unwrap();
        let sessions: Arc<dyn SessionStore> =
            Arc::new(FileSessionStore::with_dir(temp.path().join("sessions")).unwrap());
        let directory = MemorySkillDirectory::new();
        directory.add("skill_guitar", "mentor_m");
        let ledger = SessionLedger::new(
            Arc::clone(&sessions),
            Arc::new(directory),
            Arc::new(PointsLedger::new(10)),
        );

        reset_session_counter();
        let first = ledger.create_session(request()).unwrap();

        // A fresh process invocation restarts the counter from zero. The
        // earlier record must not be replaced.
        reset_session_counter();
        let second = ledger.create_session(request()).unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(sessions.list().unwrap().len(), 2);
        let listed = ledger.list_sessions_for("learner_l").unwrap();
        assert_eq!(listed.as_learner.len(), 2);
    }

    #[test]
    fn test_concurrent_completion_single_credit() {
        use std::thread;

        let fix = fixture();
        let session = fix.ledger.create_session(request()).unwrap();
        fix.ledger
            .request_transition(&session.id, "mentor_m", SessionStatus::Accepted)
            .unwrap();

        let ledger = Arc::new(fix.ledger);
        let mut handles = vec![];
        for _ in 0..2 {
            let ledger = Arc::clone(&ledger);
            let id = session.id.clone();
            handles.push(thread::spawn(move || {
                ledger.request_transition(&id, "mentor_m", SessionStatus::Completed)
            }));
        }

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let wins = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(wins, 1);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, SwapError::InvalidTransition { .. })));
        assert_eq!(fix.points.points_for("mentor_m"), 10);
    }

    #[test]
    fn test_leaderboard_scenario_tie_break() {
        // Two mentors on equal points rank by registration order.
        let sessions: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
        let directory = MemorySkillDirectory::new();
        directory.add("skill_a", "mentor_a");
        directory.add("skill_b", "mentor_b");
        let points = Arc::new(PointsLedger::new(40));
        points.register_user("mentor_a", "Mentor A");
        points.register_user("mentor_b", "Mentor B");
        let ledger = SessionLedger::new(sessions, Arc::new(directory), Arc::clone(&points));

        for skill in ["skill_b", "skill_a"] {
            let session = ledger
                .create_session(SessionRequest {
                    learner_id: "learner_l".to_string(),
                    skill_ref: skill.to_string(),
                    date: "2025-03-01".to_string(),
                    time_slot: "10:00-11:00".to_string(),
                    teaching_mode: "online".to_string(),
                })
                .unwrap();
            let mentor = session.mentor_id.clone();
            ledger
                .request_transition(&session.id, &mentor, SessionStatus::Accepted)
                .unwrap();
            ledger
                .request_transition(&session.id, &mentor, SessionStatus::Completed)
                .unwrap();
        }

        let board = points.leaderboard();
        assert_eq!(board[0].points, 40);
        assert_eq!(board[1].points, 40);
        assert_eq!(board[0].user_id, "mentor_a");
        assert_eq!(board[1].user_id, "mentor_b");
    }
}
