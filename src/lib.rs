//! SkillSwap - session lifecycle core for a peer-to-peer skill exchange
//!
//! Students list skills they can teach and request sessions against each
//! other's skills. This crate implements the part of that system with real
//! invariants: the session state machine (who may move a session between
//! `pending`, `accepted`, `rescheduled`, and `completed`), the points
//! ledger that credits mentors exactly once per completed session and
//! ranks the leaderboard, and the chat gate that derives message
//! eligibility from session status. Authentication, profile CRUD, and UI
//! are external collaborators.

pub mod cli;
pub mod config;
pub mod core;
pub mod directory;
pub mod error;
pub mod storage;

pub use config::Config;
pub use core::{
    can_exchange_messages, ChatGate, LeaderboardEntry, Message, PointsLedger, PointsSnapshot,
    Session, SessionLedger, SessionRequest, SessionStatus, SessionsByRole,
};
pub use directory::{FileSkillDirectory, MemorySkillDirectory, SkillDirectory, SkillRecord};
pub use error::{Result, SwapError};
pub use storage::{
    FileMessageStore, FileSessionStore, MemoryMessageStore, MemorySessionStore, MessageStore,
    SessionStore,
};
