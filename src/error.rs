//! Unified error types for SkillSwap.
//!
//! Every failure in the core is synchronous and scoped to the single
//! requested operation. Callers distinguish the kind programmatically
//! (wrong actor vs. wrong state vs. missing record) and decide for
//! themselves whether to retry; nothing here is retried automatically.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for SkillSwap operations.
#[derive(Error, Debug)]
pub enum SwapError {
    /// A referenced session, skill, or user does not exist.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// The actor is not authorized for the requested operation.
    #[error("forbidden: {message}")]
    Forbidden { message: String },

    /// The state machine rejects the requested status change.
    #[error("invalid transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    /// Message operation attempted on a session whose status does not permit it.
    #[error("chat not eligible while session is {status}")]
    ChatNotEligible { status: String },

    /// Malformed input (missing or empty required fields, self-mentoring).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// I/O errors from record file operations.
    #[error("storage error at {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// JSON parsing/serialization errors.
    #[error("serialization error: {message}")]
    Serde { message: String },

    /// Configuration loading errors.
    #[error("config error: {message}")]
    Config { message: String },
}

/// A specialized Result type for SkillSwap operations.
pub type Result<T> = std::result::Result<T, SwapError>;

impl SwapError {
    /// Create a not-found error for a record kind ("session", "skill", "user").
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Create a forbidden error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Create an invalid transition error.
    pub fn invalid_transition(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::InvalidTransition {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Create a chat-not-eligible error.
    pub fn chat_not_eligible(status: impl Into<String>) -> Self {
        Self::ChatNotEligible {
            status: status.into(),
        }
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a storage error from an I/O error.
    pub fn storage(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    /// Create a serialization error.
    pub fn serde(message: impl Into<String>) -> Self {
        Self::Serde {
            message: message.into(),
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Check whether this error was caused by the caller (bad actor, bad
    /// state, bad input) rather than by infrastructure.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. }
                | Self::Forbidden { .. }
                | Self::InvalidTransition { .. }
                | Self::ChatNotEligible { .. }
                | Self::Validation { .. }
        )
    }
}

impl From<io::Error> for SwapError {
    fn from(err: io::Error) -> Self {
        Self::Storage {
            path: PathBuf::new(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for SwapError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde {
            message: err.to_string(),
        }
    }
}
