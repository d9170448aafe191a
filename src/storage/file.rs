//! File-based record storage.
//!
//! Sessions are stored as one JSON file per session under
//! `~/.skillswap/sessions/`; messages as one JSON file per session
//! (holding the whole transcript) under `~/.skillswap/messages/`.
//! Atomic writes are achieved via temp file + rename. Read-modify-write
//! paths (status transitions, message appends) are serialized by an
//! internal mutex, which is the single-writer-per-key discipline within
//! one process.

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::config::{messages_dir, sessions_dir};
use crate::core::{Message, Session, SessionStatus};
use crate::error::{Result, SwapError};
use crate::storage::{MessageStore, SessionStore};

/// File-based session store.
#[derive(Debug)]
pub struct FileSessionStore {
    sessions_dir: PathBuf,
    /// Serializes read-modify-write transitions.
    write_lock: Mutex<()>,
}

impl FileSessionStore {
    /// Create a store with the default directory
    /// (`~/.skillswap/sessions/` or `$SKILLSWAP_HOME/sessions/`).
    pub fn new() -> Result<Self> {
        let dir = sessions_dir().ok_or_else(|| {
            SwapError::config("Could not determine sessions directory (no home directory)")
        })?;
        Self::with_dir(dir)
    }

    /// Create a store with a custom directory.
    pub fn with_dir(sessions_dir: impl Into<PathBuf>) -> Result<Self> {
        let sessions_dir = sessions_dir.into();
        if !sessions_dir.exists() {
            fs::create_dir_all(&sessions_dir).map_err(|e| SwapError::storage(&sessions_dir, e))?;
        }
        Ok(Self {
            sessions_dir,
            write_lock: Mutex::new(()),
        })
    }

    fn session_path(&self, id: &str) -> PathBuf {
        self.sessions_dir.join(format!("{}.json", id))
    }

    fn temp_path(&self, id: &str) -> PathBuf {
        self.sessions_dir.join(format!(".{}.json.tmp", id))
    }

    /// Write a session atomically using temp file + rename.
    fn atomic_write(&self, session: &Session) -> Result<()> {
        let final_path = self.session_path(&session.id);
        let temp_path = self.temp_path(&session.id);

        let json = serde_json::to_string_pretty(session)?;
        {
            let mut file =
                fs::File::create(&temp_path).map_err(|e| SwapError::storage(&temp_path, e))?;
            file.write_all(json.as_bytes())
                .map_err(|e| SwapError::storage(&temp_path, e))?;
            file.sync_all()
                .map_err(|e| SwapError::storage(&temp_path, e))?;
        }
        // Rename is atomic on POSIX.
        fs::rename(&temp_path, &final_path).map_err(|e| SwapError::storage(&final_path, e))?;
        Ok(())
    }

    fn read_session(&self, id: &str) -> Result<Option<Session>> {
        let path = self.session_path(id);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path).map_err(|e| SwapError::storage(&path, e))?;
        let session: Session = serde_json::from_str(&content)?;
        Ok(Some(session))
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, id: &str) -> Result<Option<Session>> {
        self.read_session(id)
    }

    fn put(&self, session: &Session) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap();
        self.atomic_write(session)
    }

    fn list(&self) -> Result<Vec<Session>> {
        if !self.sessions_dir.exists() {
            return Ok(Vec::new());
        }

        let mut sessions: Vec<Session> = Vec::new();
        let entries = fs::read_dir(&self.sessions_dir)
            .map_err(|e| SwapError::storage(&self.sessions_dir, e))?;

        for entry in entries {
            let entry = entry.map_err(|e| SwapError::storage(&self.sessions_dir, e))?;
            let path = entry.path();

            // Skip non-JSON files and temp files.
            if path.extension().map(|e| e != "json").unwrap_or(true) {
                continue;
            }
            if path
                .file_name()
                .map(|n| n.to_string_lossy().starts_with('.'))
                .unwrap_or(true)
            {
                continue;
            }

            match fs::read_to_string(&path) {
                Ok(content) => match serde_json::from_str::<Session>(&content) {
                    Ok(session) => sessions.push(session),
                    Err(e) => {
                        tracing::warn!("skipping unparseable session file {:?}: {}", path, e)
                    }
                },
                Err(e) => tracing::warn!("skipping unreadable session file {:?}: {}", path, e),
            }
        }

        sessions.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(sessions)
    }

    fn transition(
        &self,
        id: &str,
        expected: SessionStatus,
        target: SessionStatus,
    ) -> Result<Session> {
        let _guard = self.write_lock.lock().unwrap();

        let mut session = self
            .read_session(id)?
            .ok_or_else(|| SwapError::not_found("session", id))?;
        if session.status != expected {
            return Err(SwapError::invalid_transition(
                session.status.as_str(),
                target.as_str(),
            ));
        }
        session.status = target;
        self.atomic_write(&session)?;
        Ok(session)
    }
}

/// File-based message store.
///
/// One JSON file per session holds that session's full transcript in
/// append order.
#[derive(Debug)]
pub struct FileMessageStore {
    messages_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl FileMessageStore {
    /// Create a store with the default directory
    /// (`~/.skillswap/messages/` or `$SKILLSWAP_HOME/messages/`).
    pub fn new() -> Result<Self> {
        let dir = messages_dir().ok_or_else(|| {
            SwapError::config("Could not determine messages directory (no home directory)")
        })?;
        Self::with_dir(dir)
    }

    /// Create a store with a custom directory.
    pub fn with_dir(messages_dir: impl Into<PathBuf>) -> Result<Self> {
        let messages_dir = messages_dir.into();
        if !messages_dir.exists() {
            fs::create_dir_all(&messages_dir).map_err(|e| SwapError::storage(&messages_dir, e))?;
        }
        Ok(Self {
            messages_dir,
            write_lock: Mutex::new(()),
        })
    }

    fn transcript_path(&self, session_id: &str) -> PathBuf {
        self.messages_dir.join(format!("{}.json", session_id))
    }

    fn read_transcript(&self, session_id: &str) -> Result<Vec<Message>> {
        let path = self.transcript_path(session_id);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&path).map_err(|e| SwapError::storage(&path, e))?;
        let messages: Vec<Message> = serde_json::from_str(&content)?;
        Ok(messages)
    }

    fn write_transcript(&self, session_id: &str, messages: &[Message]) -> Result<()> {
        let final_path = self.transcript_path(session_id);
        let temp_path = self
            .messages_dir
            .join(format!(".{}.json.tmp", session_id));

        let json = serde_json::to_string_pretty(messages)?;
        {
            let mut file =
                fs::File::create(&temp_path).map_err(|e| SwapError::storage(&temp_path, e))?;
            file.write_all(json.as_bytes())
                .map_err(|e| SwapError::storage(&temp_path, e))?;
            file.sync_all()
                .map_err(|e| SwapError::storage(&temp_path, e))?;
        }
        fs::rename(&temp_path, &final_path).map_err(|e| SwapError::storage(&final_path, e))?;
        Ok(())
    }
}

impl MessageStore for FileMessageStore {
    fn append(&self, message: &Message) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap();
        let mut messages = self.read_transcript(&message.session_ref)?;
        messages.push(message.clone());
        self.write_transcript(&message.session_ref, &messages)
    }

    fn list_for_session(&self, session_id: &str) -> Result<Vec<Message>> {
        let mut messages = self.read_transcript(session_id)?;
        messages.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(messages)
    }
}
