//! Command handlers module for the chat server.
//!
//! Each handler acts on the shared registry and returns the reply for the
//! issuing session. Deliveries to other peers go through registry lookups or
//! snapshots, so the registry lock is never held during a send.

use log::{debug, info};

use crate::client::{ClientRegistry, Session};
use crate::protocol::responses;
use crate::protocol::{Command, CommandResult};

/// Dispatches a parsed command for an `Active` session.
///
/// # Arguments
///
/// * `session` - The issuing session; its name is updated on a successful rename.
/// * `command` - The parsed command.
/// * `registry` - The shared client registry.
///
/// # Returns
///
/// * `CommandResult` - Status plus the optional reply for the issuing session.
pub async fn handle_command(
    session: &mut Session,
    command: &Command,
    registry: &ClientRegistry,
) -> CommandResult {
    let Some(sender) = session.username().map(str::to_owned) else {
        return CommandResult::close_with(responses::NOT_REGISTERED);
    };

    match command {
        Command::Exit => handle_cmd_exit(&sender),
        Command::Help => CommandResult::success(responses::HELP_BANNER),
        Command::ListUsers => handle_cmd_userlist(registry).await,
        Command::ClearScreen => CommandResult::success(responses::CLEAR_TOKEN),
        Command::Rename(new_name) => handle_cmd_rename(session, &sender, new_name, registry).await,
        Command::DirectMessage { recipient, text } => {
            handle_cmd_dm(&sender, recipient, text, registry).await
        }
        Command::Chat(text) => handle_cmd_chat(session, &sender, text, registry).await,
        Command::Unknown(usage) => CommandResult::failure("Malformed command", usage.as_str()),
        Command::Blank => CommandResult::silent(),
    }
}

fn handle_cmd_exit(sender: &str) -> CommandResult {
    info!("{} requested to leave", sender);
    CommandResult::close()
}

async fn handle_cmd_userlist(registry: &ClientRegistry) -> CommandResult {
    let names = registry.names().await;
    CommandResult::success(responses::user_list(&names))
}

/// Handles `/changeuser`: the old name stays registered unless the rename succeeds.
async fn handle_cmd_rename(
    session: &mut Session,
    sender: &str,
    new_name: &str,
    registry: &ClientRegistry,
) -> CommandResult {
    match registry.rename(sender, new_name).await {
        Ok(()) => {
            session.set_username(Some(new_name.to_string()));
            info!("{} is now known as {}", sender, new_name);
            CommandResult::success(responses::name_changed(new_name))
        }
        Err(e) => {
            debug!("Rename {} -> {} refused: {}", sender, new_name, e);
            CommandResult::failure(e.to_string(), responses::registry_error_reply(&e))
        }
    }
}

async fn handle_cmd_dm(
    sender: &str,
    recipient: &str,
    text: &str,
    registry: &ClientRegistry,
) -> CommandResult {
    // A recipient that is mid-teardown has a closed sink; report it as absent.
    let delivered = match registry.lookup(recipient).await {
        Some(sink) => sink.send(responses::dm_from(sender, text)),
        None => false,
    };

    if delivered {
        debug!("DM {} -> {}", sender, recipient);
        CommandResult::success(responses::dm_to(recipient, text))
    } else {
        CommandResult::failure(
            format!("No such user: {}", recipient),
            responses::user_not_found(recipient),
        )
    }
}

/// Broadcasts chat text to every registered peer except the sender.
async fn handle_cmd_chat(
    session: &Session,
    sender: &str,
    text: &str,
    registry: &ClientRegistry,
) -> CommandResult {
    let line = responses::broadcast_line(sender, text);
    let peers = registry.snapshot().await;

    let mut delivered = 0usize;
    for (_, sink) in peers.iter().filter(|(_, sink)| !sink.same_peer(session.sink())) {
        if sink.send(line.as_str()) {
            delivered += 1;
        }
    }

    debug!("{} broadcast to {} peers: {}", sender, delivered, text);
    CommandResult::silent()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ClientSink, SessionState};
    use crate::protocol::CommandStatus;
    use tokio::sync::mpsc::Receiver;

    async fn joined(
        registry: &ClientRegistry,
        name: &str,
    ) -> (Session, Receiver<String>) {
        let (sink, rx) = ClientSink::channel(16);
        registry.try_claim(name, sink.clone()).await.unwrap();
        let mut session = Session::new(format!("{}-addr", name), sink);
        session.set_username(Some(name.to_string()));
        session.set_state(SessionState::Active);
        (session, rx)
    }

    fn drain(rx: &mut Receiver<String>) -> Vec<String> {
        let mut out = Vec::new();
        while let Ok(frame) = rx.try_recv() {
            out.push(frame);
        }
        out
    }

    #[tokio::test]
    async fn test_chat_reaches_everyone_but_sender() {
        let registry = ClientRegistry::new();
        let (mut alice, mut alice_rx) = joined(&registry, "alice").await;
        let (_bob, mut bob_rx) = joined(&registry, "bob").await;
        let (_dave, mut dave_rx) = joined(&registry, "dave").await;

        let result = handle_command(&mut alice, &Command::Chat("hi all".into()), &registry).await;

        assert_eq!(result.status, CommandStatus::Success);
        assert!(result.message.is_none());
        assert!(drain(&mut alice_rx).is_empty());
        for rx in [&mut bob_rx, &mut dave_rx] {
            let frames = drain(rx);
            assert_eq!(frames.len(), 1);
            assert!(frames[0].ends_with("alice: hi all"));
        }
    }

    #[tokio::test]
    async fn test_chat_skips_departed_peers() {
        let registry = ClientRegistry::new();
        let (mut alice, _alice_rx) = joined(&registry, "alice").await;
        let (_bob, bob_rx) = joined(&registry, "bob").await;
        drop(bob_rx);

        let result = handle_command(&mut alice, &Command::Chat("anyone?".into()), &registry).await;
        assert_eq!(result.status, CommandStatus::Success);
    }

    #[tokio::test]
    async fn test_direct_message_delivery() {
        let registry = ClientRegistry::new();
        let (mut alice, mut alice_rx) = joined(&registry, "alice").await;
        let (_bob, mut bob_rx) = joined(&registry, "bob").await;
        let (_dave, mut dave_rx) = joined(&registry, "dave").await;

        let command = Command::DirectMessage {
            recipient: "bob".into(),
            text: "secret".into(),
        };
        let result = handle_command(&mut alice, &command, &registry).await;

        assert_eq!(result.message.as_deref(), Some("[DM to bob] secret"));
        assert_eq!(drain(&mut bob_rx), vec!["[DM from alice] secret"]);
        assert!(drain(&mut dave_rx).is_empty());
        assert!(drain(&mut alice_rx).is_empty());
    }

    #[tokio::test]
    async fn test_direct_message_to_missing_user() {
        let registry = ClientRegistry::new();
        let (mut alice, _alice_rx) = joined(&registry, "alice").await;

        let command = Command::DirectMessage {
            recipient: "ghost".into(),
            text: "boo".into(),
        };
        let result = handle_command(&mut alice, &command, &registry).await;

        assert!(matches!(result.status, CommandStatus::Failure(_)));
        assert_eq!(result.message.as_deref(), Some("User ghost not found."));
        assert_eq!(registry.names().await, vec!["alice"]);
    }

    #[tokio::test]
    async fn test_rename_updates_session_and_registry() {
        let registry = ClientRegistry::new();
        let (mut alice, _alice_rx) = joined(&registry, "alice").await;
        let (_bob, mut bob_rx) = joined(&registry, "bob").await;

        let result = handle_command(&mut alice, &Command::Rename("carol".into()), &registry).await;
        assert_eq!(result.message.as_deref(), Some("Username changed to carol."));
        assert_eq!(alice.username(), Some("carol"));
        assert!(registry.lookup("alice").await.is_none());

        handle_command(&mut alice, &Command::Chat("hello".into()), &registry).await;
        let frames = drain(&mut bob_rx);
        assert!(frames[0].ends_with("carol: hello"));
    }

    #[tokio::test]
    async fn test_rename_to_taken_name_keeps_old() {
        let registry = ClientRegistry::new();
        let (mut alice, _alice_rx) = joined(&registry, "alice").await;
        let (_bob, _bob_rx) = joined(&registry, "bob").await;

        let result = handle_command(&mut alice, &Command::Rename("bob".into()), &registry).await;

        assert!(matches!(result.status, CommandStatus::Failure(_)));
        assert_eq!(result.message.as_deref(), Some(responses::NAME_TAKEN));
        assert_eq!(alice.username(), Some("alice"));
        assert!(registry.lookup("alice").await.unwrap().same_peer(alice.sink()));
    }

    #[tokio::test]
    async fn test_userlist_and_simple_replies() {
        let registry = ClientRegistry::new();
        let (mut alice, _a) = joined(&registry, "alice").await;
        let (_bob, _b) = joined(&registry, "bob").await;

        let list = handle_command(&mut alice, &Command::ListUsers, &registry).await;
        assert_eq!(
            list.message.as_deref(),
            Some("Connected users:\n\t1) alice\n\t2) bob")
        );

        let clear = handle_command(&mut alice, &Command::ClearScreen, &registry).await;
        assert_eq!(clear.message.as_deref(), Some("/clear"));

        let help = handle_command(&mut alice, &Command::Help, &registry).await;
        assert_eq!(help.message.as_deref(), Some(responses::HELP_BANNER));

        let usage = Command::Unknown(responses::DM_USAGE.into());
        let malformed = handle_command(&mut alice, &usage, &registry).await;
        assert_eq!(malformed.message.as_deref(), Some(responses::DM_USAGE));

        let exit = handle_command(&mut alice, &Command::Exit, &registry).await;
        assert_eq!(exit.status, CommandStatus::CloseConnection);
        assert!(exit.message.is_none());
    }

    #[tokio::test]
    async fn test_unnamed_session_is_closed() {
        let registry = ClientRegistry::new();
        let (sink, _rx) = ClientSink::channel(16);
        let mut session = Session::new("127.0.0.1:1", sink);

        let result = handle_command(&mut session, &Command::Help, &registry).await;
        assert_eq!(result.status, CommandStatus::CloseConnection);
        assert_eq!(result.message.as_deref(), Some(responses::NOT_REGISTERED));
    }
}
