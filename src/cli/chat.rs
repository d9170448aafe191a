//! Chat commands: send a message, read a transcript.

use crate::cli::App;
use crate::core::Message;
use crate::error::Result;

/// Options for the chat send command.
#[derive(Debug, Clone)]
pub struct SendOptions {
    pub session_id: String,
    pub sender_id: String,
    pub body: String,
    pub json: bool,
}

/// Run the chat send command.
pub fn run_send(app: &App, options: &SendOptions) -> Result<String> {
    let message = app
        .chat
        .append_message(&options.session_id, &options.sender_id, &options.body)?;

    if options.json {
        Ok(serde_json::to_string_pretty(&message)?)
    } else {
        Ok(format!("Sent {} to session {}.", message.id, message.session_ref))
    }
}

/// Options for the chat log command.
#[derive(Debug, Clone)]
pub struct LogOptions {
    pub session_id: String,
    pub json: bool,
}

/// Run the chat log command: the session's transcript in creation order.
pub fn run_log(app: &App, options: &LogOptions) -> Result<String> {
    let messages = app.chat.list_messages(&options.session_id)?;

    if options.json {
        return Ok(serde_json::to_string_pretty(&messages)?);
    }
    if messages.is_empty() {
        return Ok(format!("No messages in session {}.", options.session_id));
    }
    Ok(messages.iter().map(format_message_line).collect::<Vec<_>>().join("\n"))
}

fn format_message_line(message: &Message) -> String {
    format!(
        "[{}] {}: {}",
        message.created_at.format("%Y-%m-%d %H:%M:%S"),
        message.sender_id,
        message.body
    )
}
