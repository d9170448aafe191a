//! CLI commands for SkillSwap.
//!
//! The binary is a thin request layer over the core: it wires the
//! file-backed stores under the SkillSwap home directory to the ledgers
//! and the chat gate, runs one operation, and persists the points
//! snapshot on the way out.

pub mod chat;
pub mod leaderboard;
pub mod sessions;

use std::sync::Arc;

use crate::config::{messages_dir, points_path, sessions_dir, skills_path, Config};
use crate::core::{ChatGate, PointsLedger, SessionLedger};
use crate::directory::FileSkillDirectory;
use crate::error::{Result, SwapError};
use crate::storage::{FileMessageStore, FileSessionStore};

/// One wired-up instance of the core over file-backed storage.
pub struct App {
    /// Session ledger (create / transition / list).
    pub ledger: SessionLedger,
    /// Chat gate (append / list messages).
    pub chat: ChatGate,
    /// Points ledger, shared with the session ledger.
    pub points: Arc<PointsLedger>,
    /// Skill registry, also used directly by `add-skill`.
    pub skills: Arc<FileSkillDirectory>,
    points_file: std::path::PathBuf,
}

impl App {
    /// Open the app against `$SKILLSWAP_HOME` (or `~/.skillswap`).
    pub fn open(config: &Config) -> Result<Self> {
        let no_home = || SwapError::config("could not resolve skillswap home directory");

        let sessions = Arc::new(FileSessionStore::with_dir(
            sessions_dir().ok_or_else(no_home)?,
        )?);
        let messages = Arc::new(FileMessageStore::with_dir(
            messages_dir().ok_or_else(no_home)?,
        )?);
        let points_file = points_path().ok_or_else(no_home)?;
        let points = Arc::new(PointsLedger::load(
            config.points.completion_award,
            &points_file,
        )?);
        let skills = Arc::new(FileSkillDirectory::new(skills_path().ok_or_else(no_home)?));

        Ok(Self {
            ledger: SessionLedger::new(
                Arc::clone(&sessions) as Arc<dyn crate::storage::SessionStore>,
                Arc::clone(&skills) as Arc<dyn crate::directory::SkillDirectory>,
                Arc::clone(&points),
            ),
            chat: ChatGate::new(sessions, messages),
            points,
            skills,
            points_file,
        })
    }

    /// Persist the points snapshot. Called after every command that can
    /// change point state (transitions, user registration).
    pub fn save_points(&self) -> Result<()> {
        self.points.save(&self.points_file)
    }
}
