//! Record storage for SkillSwap.
//!
//! This module provides storage for session and message records,
//! supporting file-based and in-memory backends.

pub mod file;
pub mod memory;
pub mod traits;

pub use file::{FileMessageStore, FileSessionStore};
pub use memory::{MemoryMessageStore, MemorySessionStore};
pub use traits::{MessageStore, SessionStore};
