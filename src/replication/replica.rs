//! The replica side of the link: handshake, snapshot load, then applying the
//! primary's command stream.

use std::sync::{Arc, LazyLock};

use anyhow::Context;
use bytes::Bytes;
use regex::Regex;
use thiserror::Error;
use tokio::{
    io::{AsyncRead, AsyncWrite, AsyncWriteExt},
    net::TcpStream,
    sync::mpsc,
};
use tracing::{debug, info, warn};

use crate::{
    client::{ClientKind, ClientSession},
    commands::{CommandHandler, dispatch},
    connection::spawn_writer,
    input::{CommandReadError, FrameReader},
    rdb::RdbParser,
    resp::RespValue,
    server::ReplicaOf,
    state::ServerState,
};

static REPLICATION_ID: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9]{40}$").ok());

#[derive(Error, Debug)]
pub enum HandshakeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("reading from primary: {0}")]
    Read(#[from] CommandReadError),
    #[error("primary closed the connection during the handshake")]
    Closed,
    #[error("unexpected reply to {step}: {reply:?}")]
    UnexpectedReply { step: &'static str, reply: RespValue },
    #[error("invalid FULLRESYNC line: {0}")]
    InvalidFullResync(String),
}

fn is_valid_repl_id(repl_id: &str) -> bool {
    REPLICATION_ID
        .as_ref()
        .is_some_and(|regex| regex.is_match(repl_id))
}

/// Parses `FULLRESYNC <replid> <offset>` into the offset the stream starts at.
fn parse_full_resync(line: &str) -> Result<u64, HandshakeError> {
    let invalid = || HandshakeError::InvalidFullResync(line.to_string());
    let parts = line.split_whitespace().collect::<Vec<&str>>();

    let ["FULLRESYNC", repl_id, offset] = parts.as_slice() else {
        return Err(invalid());
    };

    if !is_valid_repl_id(repl_id) {
        return Err(invalid());
    }

    offset.parse::<u64>().map_err(|_| invalid())
}

async fn send_and_expect<R, W>(
    reader: &mut FrameReader<R>,
    writer: &mut W,
    step: &'static str,
    command: RespValue,
    expected: &str,
) -> Result<(), HandshakeError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    writer.write_all(command.encode().as_bytes()).await?;
    writer.flush().await?;

    let Some((reply, _)) = reader.read_frame().await? else {
        return Err(HandshakeError::Closed);
    };

    if reply != RespValue::SimpleString(expected.to_string()) {
        return Err(HandshakeError::UnexpectedReply { step, reply });
    }

    Ok(())
}

/// Runs PING, REPLCONF listening-port, REPLCONF capa and PSYNC against the primary.
///
/// # Returns
///
/// * `Ok(offset)` - The replication offset the primary's stream starts at; the snapshot
///   payload is the next thing on the wire
/// * `Err(HandshakeError)` - The primary answered a step with something unexpected
pub async fn handshake<R, W>(
    reader: &mut FrameReader<R>,
    writer: &mut W,
    listening_port: u16,
) -> Result<u64, HandshakeError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    send_and_expect(reader, writer, "PING", RespValue::command(&["PING"]), "PONG").await?;

    send_and_expect(
        reader,
        writer,
        "REPLCONF listening-port",
        RespValue::command(&["REPLCONF", "listening-port", &listening_port.to_string()]),
        "OK",
    )
    .await?;

    send_and_expect(
        reader,
        writer,
        "REPLCONF capa",
        RespValue::command(&["REPLCONF", "capa", "psync2"]),
        "OK",
    )
    .await?;

    writer
        .write_all(RespValue::command(&["PSYNC", "?", "-1"]).encode().as_bytes())
        .await?;
    writer.flush().await?;

    match reader.read_frame().await? {
        Some((RespValue::SimpleString(line), _)) => parse_full_resync(&line),
        Some((reply, _)) => Err(HandshakeError::UnexpectedReply {
            step: "PSYNC",
            reply,
        }),
        None => Err(HandshakeError::Closed),
    }
}

/// Connects to the primary and applies its stream until the link drops.
pub async fn run(state: Arc<ServerState>, primary: ReplicaOf) -> anyhow::Result<()> {
    let stream = TcpStream::connect((primary.host.as_str(), primary.port))
        .await
        .with_context(|| format!("connecting to primary {}:{}", primary.host, primary.port))?;
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = FrameReader::new(read_half);

    let start_offset = handshake(&mut reader, &mut write_half, state.config.port).await?;
    let snapshot = reader.read_snapshot().await?;

    let mut parser = RdbParser::new();
    parser.parse(&snapshot).context("loading snapshot from primary")?;
    let loaded = parser.key_value_store.len();
    state.db.lock().await.store.extend(parser.key_value_store);
    info!(offset = start_offset, keys = loaded, "full resync complete");

    let (outbound, receiver) = mpsc::unbounded_channel::<Bytes>();
    let writer = spawn_writer(write_half, receiver);
    let mut session = ClientSession::new(ClientKind::MasterLink, true, outbound);
    session.replication_offset = start_offset;

    apply_stream(&state, &mut session, &mut reader).await?;

    drop(session);
    let _ = writer.await;
    info!("primary closed the replication link");

    Ok(())
}

/// Applies commands from the primary silently. Only `REPLCONF GETACK` is answered, and
/// its own bytes count towards the offset after the reply goes out.
pub async fn apply_stream<R>(
    state: &Arc<ServerState>,
    session: &mut ClientSession,
    reader: &mut FrameReader<R>,
) -> Result<(), CommandReadError>
where
    R: AsyncRead + Unpin,
{
    loop {
        let (frame, length) = match reader.read_frame().await {
            Ok(Some(decoded)) => decoded,
            Ok(None) => return Ok(()),
            Err(CommandReadError::SkippedFrame { error, length }) => {
                warn!("ignoring unreadable frame from primary: {error}");
                session.replication_offset += length as u64;
                continue;
            }
            Err(e) => return Err(e),
        };

        match CommandHandler::new(frame) {
            Ok(handler) => {
                debug!(command = %handler.name, offset = session.replication_offset, "applying");
                let reply = dispatch(state, session, handler.clone()).await;

                if handler.name == "REPLCONF" {
                    if let Some(reply) = reply {
                        session.send(&reply);
                    }
                }
            }
            Err(e) => warn!("ignoring malformed frame from primary: {e}"),
        }

        session.replication_offset += length as u64;
    }
}
