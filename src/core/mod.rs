//! Core domain logic: the session state machine, the points ledger, and
//! the chat gate.

pub mod chat;
pub mod ledger;
pub mod points;
pub mod session;

pub use chat::{can_exchange_messages, generate_message_id, ChatGate, Message};
pub use ledger::{SessionLedger, SessionsByRole};
pub use points::{LeaderboardEntry, PointsLedger, PointsSnapshot, UserScore};
pub use session::{generate_session_id, Session, SessionRequest, SessionStatus};
