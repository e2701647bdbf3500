//! Chat responses
//!
//! Text of every frame the server sends, kept in one place.

use chrono::Local;

use crate::error::RegistryError;

pub const NAME_PROMPT: &str = "Enter username: ";
pub const NAME_ACCEPTED: &str = "Username set successfully.";
pub const NAME_TAKEN: &str = "This username is already taken. Please enter another.";
pub const NAME_EMPTY: &str = "Username cannot be empty. Please enter another.";
pub const SERVER_FULL: &str = "Server is full. Try again later.";
pub const TOO_MANY_ATTEMPTS: &str = "Too many failed attempts. Disconnecting.";
pub const FRAME_TOO_LONG: &str = "Message too long. Disconnecting.";
pub const INVALID_UTF8: &str = "Messages must be valid UTF-8. Disconnecting.";
pub const NOT_REGISTERED: &str = "Session has no username. Disconnecting.";

/// Sent to the client, which clears its own screen on receipt.
pub const CLEAR_TOKEN: &str = "/clear";

pub const CHANGEUSER_USAGE: &str = "Usage: /changeuser <new_username>";
pub const DM_USAGE: &str = "Usage: /dm <user> <message>";

pub const HELP_BANNER: &str = "Help menu:\n\
    \t/help                           -> Show this help menu.\n\
    \t/exit                           -> Leave the chat.\n\
    \t/clear                          -> Clear the chat screen.\n\
    \t/userlist                       -> List connected users.\n\
    \t/dm <user> <message>            -> Send a direct message.\n\
    \t/changeuser <new_username>      -> Change your username.";

/// Reply for a rejected name claim or rename.
pub fn registry_error_reply(err: &RegistryError) -> String {
    match err {
        RegistryError::EmptyName => NAME_EMPTY.to_string(),
        RegistryError::NameTaken(_) => NAME_TAKEN.to_string(),
        RegistryError::InvalidName(_) => {
            "Usernames cannot contain spaces and must not be too long. Please enter another."
                .to_string()
        }
        RegistryError::NotRegistered(_) => NOT_REGISTERED.to_string(),
        RegistryError::Full(_) => SERVER_FULL.to_string(),
    }
}

pub fn name_changed(new_name: &str) -> String {
    format!("Username changed to {}.", new_name)
}

/// Numbered list of users, 1-indexed.
pub fn user_list(names: &[String]) -> String {
    let mut out = String::from("Connected users:");
    for (i, name) in names.iter().enumerate() {
        out.push_str(&format!("\n\t{}) {}", i + 1, name));
    }
    out
}

pub fn broadcast_line(sender: &str, text: &str) -> String {
    let now = Local::now().format("%Y-%m-%d %H:%M:%S");
    format!("[{}] {}: {}", now, sender, text)
}

pub fn dm_from(sender: &str, text: &str) -> String {
    format!("[DM from {}] {}", sender, text)
}

pub fn dm_to(recipient: &str, text: &str) -> String {
    format!("[DM to {}] {}", recipient, text)
}

pub fn user_not_found(name: &str) -> String {
    format!("User {} not found.", name)
}
