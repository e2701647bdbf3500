//! Module `commands`
//!
//! Defines the chat command set, the result of executing one, and the parser
//! that classifies an inbound line.

use crate::protocol::responses::{CHANGEUSER_USAGE, DM_USAGE};

/// One inbound line, classified.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    /// Plain text to broadcast to everyone else.
    Chat(String),
    /// `/exit`
    Exit,
    /// `/help`
    Help,
    /// `/userlist`
    ListUsers,
    /// `/clear`
    ClearScreen,
    /// `/changeuser <name>`
    Rename(String),
    /// `/dm <recipient> <text>`
    DirectMessage { recipient: String, text: String },
    /// A known command used with the wrong arguments; carries the usage line.
    Unknown(String),
    /// Empty or whitespace-only line; ignored.
    Blank,
}

/// Represents the outcome status of executing a command.
#[derive(Debug, PartialEq, Eq)]
pub enum CommandStatus {
    Success,
    Failure(String),
    CloseConnection,
}

/// Struct encapsulating the full result of a command execution.
///
/// `message`, if any, is sent back to the issuing session only.
#[derive(Debug)]
pub struct CommandResult {
    pub status: CommandStatus,
    pub message: Option<String>,
}

impl CommandResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: CommandStatus::Success,
            message: Some(message.into()),
        }
    }

    pub fn silent() -> Self {
        Self {
            status: CommandStatus::Success,
            message: None,
        }
    }

    pub fn failure(reason: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: CommandStatus::Failure(reason.into()),
            message: Some(message.into()),
        }
    }

    pub fn close() -> Self {
        Self {
            status: CommandStatus::CloseConnection,
            message: None,
        }
    }

    /// Ends the session after sending `message`.
    pub fn close_with(message: impl Into<String>) -> Self {
        Self {
            status: CommandStatus::CloseConnection,
            message: Some(message.into()),
        }
    }
}

/// Parses one inbound line into a `Command`.
///
/// Commands are case-sensitive and matched after trailing whitespace is
/// dropped. Slash words that are not commands (e.g. `/shrug`) are chat.
pub fn parse_command(raw: &str) -> Command {
    let line = raw.trim_end();
    if line.trim_start().is_empty() {
        return Command::Blank;
    }

    match line {
        "/exit" => return Command::Exit,
        "/help" => return Command::Help,
        "/userlist" => return Command::ListUsers,
        "/clear" => return Command::ClearScreen,
        _ => {}
    }

    if let Some(args) = command_args(line, "/changeuser") {
        let mut parts = args.split_whitespace();
        return match (parts.next(), parts.next()) {
            (Some(name), None) => Command::Rename(name.to_string()),
            _ => Command::Unknown(CHANGEUSER_USAGE.to_string()),
        };
    }

    if let Some(args) = command_args(line, "/dm") {
        let args = args.trim_start();
        let (recipient, text) = args.split_once(char::is_whitespace).unwrap_or((args, ""));
        let text = text.trim();
        if recipient.is_empty() || text.is_empty() {
            return Command::Unknown(DM_USAGE.to_string());
        }
        return Command::DirectMessage {
            recipient: recipient.to_string(),
            text: text.to_string(),
        };
    }

    Command::Chat(line.to_string())
}

/// Returns the text after `name` if `line` invokes that command.
fn command_args<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(name)?;
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        Some(rest)
    } else {
        None
    }
}
