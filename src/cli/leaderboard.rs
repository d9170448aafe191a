//! Leaderboard and registry commands.

use crate::cli::App;
use crate::error::Result;

/// Options for the leaderboard command.
#[derive(Debug, Clone, Default)]
pub struct LeaderboardOptions {
    /// Maximum number of rows.
    pub limit: Option<usize>,
    pub json: bool,
}

/// Run the leaderboard command.
///
/// Rows are ordered by points descending; equal totals rank by
/// registration order, so the ordering is stable across queries.
pub fn run_leaderboard(app: &App, options: &LeaderboardOptions) -> Result<String> {
    let mut board = app.points.leaderboard();
    if let Some(limit) = options.limit {
        board.truncate(limit);
    }

    if options.json {
        return Ok(serde_json::to_string_pretty(&board)?);
    }
    if board.is_empty() {
        return Ok("No users registered yet.".to_string());
    }

    let mut lines = Vec::new();
    for (rank, entry) in board.iter().enumerate() {
        lines.push(format!(
            "{:>3}. {} ({}): {} points",
            rank + 1,
            entry.name,
            entry.user_id,
            entry.points
        ));
    }
    Ok(lines.join("\n"))
}

/// Run the register-user command: introduce an identity to the points
/// ledger. First registration fixes the leaderboard tie-break position.
pub fn run_register_user(app: &App, user_id: &str, name: &str) -> Result<String> {
    app.points.register_user(user_id, name);
    app.save_points()?;
    Ok(format!("Registered {} as {}.", user_id, name))
}

/// Run the add-skill command: register a skill with its owning mentor.
pub fn run_add_skill(app: &App, skill_id: &str, mentor_id: &str) -> Result<String> {
    app.skills.add(skill_id, mentor_id)?;
    Ok(format!("Skill {} is offered by {}.", skill_id, mentor_id))
}
