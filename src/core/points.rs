//! Points ledger for SkillSwap.
//!
//! The ledger owns the point-credit side effect of session completion and
//! the derived leaderboard view. A credit is generated exactly once per
//! session: the credited-session set makes the operation idempotent even
//! if the transition serialization above it were ever imperfect.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::core::Session;
use crate::error::{Result, SwapError};

/// Cumulative score for one registered user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserScore {
    /// Display name supplied by the identity provider.
    pub name: String,
    /// Registration sequence number. The leaderboard tie-break: earlier
    /// registration ranks first among equal point totals.
    pub seq: u64,
    /// Cumulative points.
    pub points: u64,
}

/// One row of the leaderboard view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeaderboardEntry {
    pub user_id: String,
    pub name: String,
    pub points: u64,
}

/// Serializable snapshot of the ledger state.
///
/// The CLI persists this as JSON under the SkillSwap home directory and
/// rebuilds the ledger from it on the next invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PointsSnapshot {
    /// Per-user scores keyed by user id.
    pub users: HashMap<String, UserScore>,
    /// Session ids that have already generated their credit.
    pub credited_sessions: HashSet<String>,
    /// Next registration sequence number.
    pub next_seq: u64,
}

#[derive(Debug, Default)]
struct PointsState {
    users: HashMap<String, UserScore>,
    credited_sessions: HashSet<String>,
    next_seq: u64,
}

/// The points ledger.
///
/// Sole writer of point totals. The award per completed session is a
/// fixed policy constant taken from configuration at construction.
#[derive(Debug)]
pub struct PointsLedger {
    completion_award: u64,
    state: RwLock<PointsState>,
}

impl PointsLedger {
    /// Create an empty ledger with the given completion award.
    pub fn new(completion_award: u64) -> Self {
        Self {
            completion_award,
            state: RwLock::new(PointsState::default()),
        }
    }

    /// Rebuild a ledger from a snapshot.
    pub fn from_snapshot(completion_award: u64, snapshot: PointsSnapshot) -> Self {
        Self {
            completion_award,
            state: RwLock::new(PointsState {
                users: snapshot.users,
                credited_sessions: snapshot.credited_sessions,
                next_seq: snapshot.next_seq,
            }),
        }
    }

    /// Load a ledger from a JSON snapshot file.
    ///
    /// A missing file yields an empty ledger.
    pub fn load(completion_award: u64, path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new(completion_award));
        }
        let content = fs::read_to_string(path).map_err(|e| SwapError::storage(path, e))?;
        let snapshot: PointsSnapshot = serde_json::from_str(&content)?;
        Ok(Self::from_snapshot(completion_award, snapshot))
    }

    /// Persist the ledger to a JSON snapshot file (temp file + rename).
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| SwapError::storage(parent, e))?;
            }
        }
        let json = serde_json::to_string_pretty(&self.snapshot())?;
        let temp_path = path.with_extension("json.tmp");
        {
            let mut file =
                fs::File::create(&temp_path).map_err(|e| SwapError::storage(&temp_path, e))?;
            file.write_all(json.as_bytes())
                .map_err(|e| SwapError::storage(&temp_path, e))?;
            file.sync_all()
                .map_err(|e| SwapError::storage(&temp_path, e))?;
        }
        fs::rename(&temp_path, path).map_err(|e| SwapError::storage(path, e))?;
        Ok(())
    }

    /// Take a serializable snapshot of the current state.
    pub fn snapshot(&self) -> PointsSnapshot {
        let state = self.state.read().unwrap();
        PointsSnapshot {
            users: state.users.clone(),
            credited_sessions: state.credited_sessions.clone(),
            next_seq: state.next_seq,
        }
    }

    /// The fixed award per completed session.
    pub fn completion_award(&self) -> u64 {
        self.completion_award
    }

    /// Register a user with the ledger.
    ///
    /// First registration wins and fixes the tie-break sequence number;
    /// later calls for the same id are no-ops.
    pub fn register_user(&self, user_id: impl Into<String>, name: impl Into<String>) {
        let user_id = user_id.into();
        let mut state = self.state.write().unwrap();
        if state.users.contains_key(&user_id) {
            return;
        }
        let seq = state.next_seq;
        state.next_seq += 1;
        state.users.insert(
            user_id,
            UserScore {
                name: name.into(),
                seq,
                points: 0,
            },
        );
    }

    /// Apply the one-shot completion credit for a session.
    ///
    /// Idempotent: returns `Ok(true)` when the credit was newly applied
    /// and `Ok(false)` when this session has already been credited. The
    /// mentor is registered on the fly if the identity provider never
    /// introduced them (name defaults to the id).
    pub fn credit_session_completion(&self, session: &Session) -> Result<bool> {
        let mut state = self.state.write().unwrap();

        if !state.credited_sessions.insert(session.id.clone()) {
            tracing::debug!(
                session_id = %session.id,
                "completion credit already applied, skipping"
            );
            return Ok(false);
        }

        if !state.users.contains_key(&session.mentor_id) {
            tracing::warn!(
                mentor_id = %session.mentor_id,
                "crediting unregistered mentor, registering with id as name"
            );
            let seq = state.next_seq;
            state.next_seq += 1;
            state.users.insert(
                session.mentor_id.clone(),
                UserScore {
                    name: session.mentor_id.clone(),
                    seq,
                    points: 0,
                },
            );
        }

        let award = self.completion_award;
        let score = state
            .users
            .get_mut(&session.mentor_id)
            .expect("mentor registered above");
        score.points += award;

        tracing::info!(
            session_id = %session.id,
            mentor_id = %session.mentor_id,
            award,
            total = score.points,
            "completion credit applied"
        );
        Ok(true)
    }

    /// Cumulative points for a user. Unregistered users have zero.
    pub fn points_for(&self, user_id: &str) -> u64 {
        let state = self.state.read().unwrap();
        state.users.get(user_id).map(|s| s.points).unwrap_or(0)
    }

    /// The leaderboard: every registered user, points descending,
    /// registration order breaking ties.
    pub fn leaderboard(&self) -> Vec<LeaderboardEntry> {
        let state = self.state.read().unwrap();
        let mut rows: Vec<(&String, &UserScore)> = state.users.iter().collect();
        rows.sort_by(|a, b| b.1.points.cmp(&a.1.points).then(a.1.seq.cmp(&b.1.seq)));
        rows.into_iter()
            .map(|(user_id, score)| LeaderboardEntry {
                user_id: user_id.clone(),
                name: score.name.clone(),
                points: score.points,
            })
            .collect()
    }
}
