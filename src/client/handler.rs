use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use tokio::io::{AsyncRead, AsyncWrite, ReadHalf, WriteHalf};
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec, LinesCodecError};

use crate::client::{ClientRegistry, ClientSink, Session, SessionState};
use crate::error::{RegistryError, SessionError};
use crate::protocol::{CommandStatus, handle_command, parse_command, responses};
use crate::server::ServerConfig;

type LineReader<S> = FramedRead<ReadHalf<S>, LinesCodec>;

/// Runs one client connection from accept to close.
///
/// - Splits the stream; a writer task drains the session's sink to the socket.
/// - Negotiates a unique name through `registry`, then reads lines and
///   dispatches them with `handle_command`.
/// - On exit for any reason, removes the session's registry entry and closes
///   the connection. Errors never escape this function.
pub async fn handle_client<S>(
    stream: S,
    peer: String,
    registry: ClientRegistry,
    config: Arc<ServerConfig>,
) where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let (read_half, write_half) = tokio::io::split(stream);
    let mut reader = FramedRead::new(
        read_half,
        LinesCodec::new_with_max_length(config.max_frame_length),
    );

    let (sink, rx) = ClientSink::channel(config.max_queued_frames);
    let writer_peer = peer.clone();
    let writer = tokio::spawn(async move {
        if let Err(e) = write_frames(write_half, rx).await {
            debug!("Writer for {} stopped: {}", writer_peer, e);
        }
    });

    let mut session = Session::new(peer, sink);
    session.set_state(SessionState::Naming);

    let outcome = match negotiate_name(&mut session, &mut reader, &registry, &config).await {
        Ok(true) => run_active(&mut session, &mut reader, &registry).await,
        Ok(false) => Ok(()),
        Err(e) => Err(e),
    };

    if let Err(e) = outcome {
        if e.is_frame_too_long() {
            session.send(responses::FRAME_TOO_LONG);
        } else if e.is_invalid_utf8() {
            session.send(responses::INVALID_UTF8);
        }
        warn!("Session {} ended with error: {}", session.label(), e);
    }

    session.set_state(SessionState::Closing);
    if let Some(name) = session.username() {
        registry.remove(name).await;
        info!("{} left the chat ({})", name, session.peer());
    } else {
        info!("Connection closed by {} before naming", session.peer());
    }

    let stalled = session.sink().is_overflowed();
    session.set_state(SessionState::Closed);
    drop(session);
    drop(reader);

    // A stalled peer's writer may be stuck mid-write; otherwise it finishes
    // once every queued frame is flushed and the last sink clone is gone.
    if stalled {
        writer.abort();
    }
    if let Err(e) = writer.await {
        if e.is_panic() {
            error!("Writer task panicked: {}", e);
        }
    }
}

/// Next inbound line, or `SendQueueFull` as soon as the peer's queue overflows.
async fn next_frame<S>(
    reader: &mut LineReader<S>,
    sink: &ClientSink,
) -> Result<Option<String>, SessionError>
where
    S: AsyncRead,
{
    tokio::select! {
        frame = reader.next() => Ok(frame.transpose()?),
        _ = sink.overflowed() => Err(SessionError::SendQueueFull),
    }
}

/// Prompts until the peer claims a free name.
///
/// Returns `Ok(false)` if the peer disconnected before naming.
async fn negotiate_name<S>(
    session: &mut Session,
    reader: &mut LineReader<S>,
    registry: &ClientRegistry,
    config: &ServerConfig,
) -> Result<bool, SessionError>
where
    S: AsyncRead,
{
    let mut failures = 0usize;

    loop {
        session.send(responses::NAME_PROMPT);

        let sink = session.sink().clone();
        let Some(frame) = next_frame(reader, &sink).await? else {
            return Ok(false);
        };
        let candidate = frame.trim().to_string();

        match registry.try_claim(&candidate, session.sink().clone()).await {
            Ok(()) => {
                info!("{} joined as {}", session.peer(), candidate);
                session.set_username(Some(candidate));
                session.send(responses::NAME_ACCEPTED);
                session.send(responses::HELP_BANNER);
                session.set_state(SessionState::Active);
                return Ok(true);
            }
            Err(e @ RegistryError::Full(_)) => {
                warn!("Turning away {}: {}", session.peer(), e);
                session.send(responses::SERVER_FULL);
                return Err(e.into());
            }
            Err(e) => {
                debug!("Name claim from {} refused: {}", session.peer(), e);
                session.send(responses::registry_error_reply(&e));

                failures += 1;
                if config.name_attempts_limited() && failures >= config.max_name_attempts {
                    session.send(responses::TOO_MANY_ATTEMPTS);
                    return Err(SessionError::TooManyNameAttempts(failures));
                }
            }
        }
    }
}

/// Reads and dispatches lines until end of stream, `/exit`, or a send-queue overflow.
async fn run_active<S>(
    session: &mut Session,
    reader: &mut LineReader<S>,
    registry: &ClientRegistry,
) -> Result<(), SessionError>
where
    S: AsyncRead,
{
    let sink = session.sink().clone();
    while let Some(frame) = next_frame(reader, &sink).await? {
        let command = parse_command(&frame);
        let result = handle_command(session, &command, registry).await;

        if let Some(msg) = result.message {
            session.send(msg);
        }

        match result.status {
            CommandStatus::CloseConnection => break,
            CommandStatus::Failure(reason) => {
                debug!("Command from {} failed: {}", session.label(), reason);
            }
            CommandStatus::Success => {}
        }
    }

    Ok(())
}

/// Writes every queued frame as one line until all sink handles are dropped.
async fn write_frames<S>(
    write_half: WriteHalf<S>,
    mut rx: mpsc::Receiver<String>,
) -> Result<(), LinesCodecError>
where
    S: AsyncWrite,
{
    let mut writer = FramedWrite::new(write_half, LinesCodec::new());
    while let Some(frame) = rx.recv().await {
        writer.send(frame).await?;
    }
    SinkExt::<String>::close(&mut writer).await
}
