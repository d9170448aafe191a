//! Session commands: request, transition, list.

use serde::{Deserialize, Serialize};

use crate::cli::App;
use crate::core::{Session, SessionRequest, SessionStatus, SessionsByRole};
use crate::error::Result;

/// Options for the request command.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub learner_id: String,
    pub skill_ref: String,
    pub date: String,
    pub time_slot: String,
    pub teaching_mode: String,
    /// Output as JSON.
    pub json: bool,
}

/// Run the request command: create a pending session for a learner.
pub fn run_request(app: &App, options: &RequestOptions) -> Result<String> {
    let session = app.ledger.create_session(SessionRequest {
        learner_id: options.learner_id.clone(),
        skill_ref: options.skill_ref.clone(),
        date: options.date.clone(),
        time_slot: options.time_slot.clone(),
        teaching_mode: options.teaching_mode.clone(),
    })?;

    if options.json {
        Ok(serde_json::to_string_pretty(&session)?)
    } else {
        Ok(format!(
            "Requested session {} for skill {} with mentor {} ({} {} {}, status {}).",
            session.id,
            session.skill_ref,
            session.mentor_id,
            session.date,
            session.time_slot,
            session.teaching_mode,
            session.status
        ))
    }
}

/// Options for the transition command.
#[derive(Debug, Clone)]
pub struct TransitionOptions {
    pub session_id: String,
    /// The authenticated caller. Only the session's mentor succeeds.
    pub user_id: String,
    /// Wire-format target status (accepted, rescheduled, completed).
    pub target: String,
    pub json: bool,
}

/// Run the transition command.
pub fn run_transition(app: &App, options: &TransitionOptions) -> Result<String> {
    let target = SessionStatus::parse(&options.target)?;
    let session = app
        .ledger
        .request_transition(&options.session_id, &options.user_id, target)?;
    // A completion credits the mentor; make sure it lands on disk.
    app.save_points()?;

    if options.json {
        Ok(serde_json::to_string_pretty(&session)?)
    } else {
        Ok(format!(
            "Session {} is now {}.",
            session.id, session.status
        ))
    }
}

/// Options for the sessions command.
#[derive(Debug, Clone)]
pub struct SessionsOptions {
    pub user_id: String,
    pub json: bool,
}

/// Output of the sessions command.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionsOutput {
    pub user_id: String,
    pub as_learner: Vec<Session>,
    pub as_mentor: Vec<Session>,
}

/// Run the sessions command: a user's sessions, grouped by role.
pub fn run_sessions(app: &App, options: &SessionsOptions) -> Result<String> {
    let SessionsByRole {
        as_learner,
        as_mentor,
    } = app.ledger.list_sessions_for(&options.user_id)?;

    if options.json {
        let output = SessionsOutput {
            user_id: options.user_id.clone(),
            as_learner,
            as_mentor,
        };
        return Ok(serde_json::to_string_pretty(&output)?);
    }

    if as_learner.is_empty() && as_mentor.is_empty() {
        return Ok(format!("No sessions for {}.", options.user_id));
    }

    let mut lines = Vec::new();
    if !as_learner.is_empty() {
        lines.push("As learner:".to_string());
        for s in &as_learner {
            lines.push(format_session_line(s));
        }
    }
    if !as_mentor.is_empty() {
        lines.push("As mentor:".to_string());
        for s in &as_mentor {
            lines.push(format_session_line(s));
        }
    }
    Ok(lines.join("\n"))
}

fn format_session_line(session: &Session) -> String {
    format!(
        "  {} [{}] {} on {} at {} ({})",
        session.id,
        session.status,
        session.skill_ref,
        session.date,
        session.time_slot,
        session.teaching_mode
    )
}
