//! SkillSwap - session lifecycle core for a peer-to-peer skill exchange
//!
//! CLI entry point.

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use skillswap::cli::{chat, leaderboard, sessions, App};
use skillswap::config::Config;
use skillswap::error::Result;

/// SkillSwap - session lifecycle core for a peer-to-peer skill exchange
#[derive(Parser)]
#[command(name = "skillswap")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Request a session against a skill (learner action)
    Request {
        /// The requesting learner's user id
        #[arg(long)]
        learner: String,
        /// The skill to learn
        #[arg(long)]
        skill: String,
        /// Proposed date, e.g. 2025-03-01
        #[arg(long)]
        date: String,
        /// Proposed time slot, e.g. 10:00-11:00
        #[arg(long)]
        slot: String,
        /// Proposed teaching mode, e.g. online
        #[arg(long)]
        mode: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Move a session to a new status (mentor action)
    Transition {
        /// The session to transition
        session: String,
        /// Target status: accepted, rescheduled, or completed
        status: String,
        /// The authenticated caller's user id
        #[arg(long)]
        user: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List a user's sessions, grouped by role
    Sessions {
        /// The user to list sessions for
        user: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Chat within a session
    Chat {
        #[command(subcommand)]
        command: ChatCommands,
    },

    /// Show the leaderboard (points descending, earliest registration wins ties)
    Leaderboard {
        /// Maximum number of rows
        #[arg(long)]
        limit: Option<usize>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Introduce a user to the points ledger
    RegisterUser {
        /// User id
        user: String,
        /// Display name
        name: String,
    },

    /// Register a skill with its owning mentor
    AddSkill {
        /// Skill id
        skill: String,
        /// The mentor offering the skill
        mentor: String,
    },
}

#[derive(Subcommand)]
enum ChatCommands {
    /// Send a message to a session's chat
    Send {
        /// The session to message
        session: String,
        /// The sending participant's user id
        #[arg(long)]
        user: String,
        /// Message text
        body: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a session's transcript in creation order
    Log {
        /// The session to read
        session: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn run(cli: Cli) -> Result<String> {
    let config = Config::load()?;
    let app = App::open(&config)?;

    match cli.command {
        Commands::Request {
            learner,
            skill,
            date,
            slot,
            mode,
            json,
        } => sessions::run_request(
            &app,
            &sessions::RequestOptions {
                learner_id: learner,
                skill_ref: skill,
                date,
                time_slot: slot,
                teaching_mode: mode,
                json,
            },
        ),
        Commands::Transition {
            session,
            status,
            user,
            json,
        } => sessions::run_transition(
            &app,
            &sessions::TransitionOptions {
                session_id: session,
                user_id: user,
                target: status,
                json,
            },
        ),
        Commands::Sessions { user, json } => sessions::run_sessions(
            &app,
            &sessions::SessionsOptions { user_id: user, json },
        ),
        Commands::Chat { command } => match command {
            ChatCommands::Send {
                session,
                user,
                body,
                json,
            } => chat::run_send(
                &app,
                &chat::SendOptions {
                    session_id: session,
                    sender_id: user,
                    body,
                    json,
                },
            ),
            ChatCommands::Log { session, json } => chat::run_log(
                &app,
                &chat::LogOptions {
                    session_id: session,
                    json,
                },
            ),
        },
        Commands::Leaderboard { limit, json } => {
            leaderboard::run_leaderboard(&app, &leaderboard::LeaderboardOptions { limit, json })
        }
        Commands::RegisterUser { user, name } => {
            leaderboard::run_register_user(&app, &user, &name)
        }
        Commands::AddSkill { skill, mentor } => {
            leaderboard::run_add_skill(&app, &skill, &mentor)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}
