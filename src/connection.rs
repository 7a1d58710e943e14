//! One client connection: a read loop that dispatches commands in arrival order, and a
//! writer task that drains the connection's outbound queue onto the socket.

use std::sync::Arc;

use bytes::Bytes;
use tokio::{
    io::{AsyncRead, AsyncWrite, AsyncWriteExt},
    net::TcpStream,
    sync::mpsc,
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::{
    client::{ClientKind, ClientSession},
    commands::{CommandHandler, dispatch},
    input::{CommandReadError, FrameReader},
    resp::RespValue,
    state::ServerState,
};

/// Spawns the task that owns the write half of a socket.
///
/// Replies, pub/sub messages and replication traffic are all queued as encoded bytes
/// and written here in queue order. The task ends once every sender is gone or the
/// peer stops accepting writes.
pub fn spawn_writer<W>(mut writer: W, mut receiver: mpsc::UnboundedReceiver<Bytes>) -> JoinHandle<()>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        while let Some(bytes) = receiver.recv().await {
            if let Err(e) = writer.write_all(&bytes).await {
                debug!("stopping writer: {e}");
                break;
            }
        }

        let _ = writer.shutdown().await;
    })
}

pub async fn handle_client(stream: TcpStream, state: Arc<ServerState>) -> anyhow::Result<()> {
    let peer = stream.peer_addr()?;
    let (read_half, write_half) = stream.into_split();

    let (outbound, receiver) = mpsc::unbounded_channel::<Bytes>();
    let writer = spawn_writer(write_half, receiver);

    let authenticated = state.users.lock().await.default_user_nopass();
    let mut session = ClientSession::new(ClientKind::Normal, authenticated, outbound);
    let mut reader = FrameReader::new(read_half);
    let client = session.id;

    info!(client, %peer, "client connected");

    let result = serve(&state, &mut session, &mut reader).await;
    release_client(&state, &session).await;

    drop(session);
    let _ = writer.await;

    match &result {
        Ok(()) => info!(client, %peer, "client disconnected"),
        Err(e) => warn!(client, %peer, "client dropped: {e}"),
    }

    result.map_err(anyhow::Error::from)
}

/// Reads and runs commands until the client quits or goes away.
async fn serve<R>(
    state: &Arc<ServerState>,
    session: &mut ClientSession,
    reader: &mut FrameReader<R>,
) -> Result<(), CommandReadError>
where
    R: AsyncRead + Unpin,
{
    loop {
        let frame = match reader.read_frame().await {
            Ok(Some((frame, _))) => frame,
            Ok(None) => return Ok(()),
            Err(CommandReadError::SkippedFrame { error, .. }) => {
                debug!(client = session.id, "skipped frame: {error}");
                session.send_bytes(Bytes::from(error.as_string()));
                continue;
            }
            Err(CommandReadError::RespParseError(e)) => {
                session.send_bytes(Bytes::from(e.as_string()));
                return Err(CommandReadError::RespParseError(e));
            }
            Err(e) => return Err(e),
        };

        if matches!(&frame, RespValue::Array(elements) if elements.is_empty()) {
            continue;
        }

        let handler = match CommandHandler::new(frame) {
            Ok(handler) => handler,
            Err(e) => {
                session.send(&e.to_resp());
                continue;
            }
        };

        let quit = handler.name == "QUIT";

        let reply = if handler.may_block() {
            match run_until_disconnect(state, session, reader, handler).await {
                Some(reply) => reply,
                None => {
                    debug!(client = session.id, "client left while blocked");
                    return Ok(());
                }
            }
        } else {
            dispatch(state, session, handler).await
        };

        if let Some(reply) = reply {
            session.send(&reply);
        }

        if quit {
            return Ok(());
        }
    }
}

/// Runs a command that may wait on other clients while watching the socket. The outer
/// `None` means the peer hung up first and the command was abandoned.
///
/// Bytes that arrive meanwhile stay buffered for the next read; they are pipelined
/// commands.
async fn run_until_disconnect<R>(
    state: &Arc<ServerState>,
    session: &mut ClientSession,
    reader: &mut FrameReader<R>,
    handler: CommandHandler,
) -> Option<Option<RespValue>>
where
    R: AsyncRead + Unpin,
{
    let command = dispatch(state, session, handler);
    tokio::pin!(command);

    loop {
        tokio::select! {
            reply = &mut command => return Some(reply),
            read = reader.fill() => match read {
                Ok(0) | Err(_) => return None,
                Ok(_) => {}
            },
        }
    }
}

/// Forgets everything the server holds on the client's behalf.
async fn release_client(state: &ServerState, session: &ClientSession) {
    {
        let mut db = state.db.lock().await;
        for key in db.blocking.abandon_client(session.id) {
            db.wake_list_waiters(&key);
        }
    }

    state.pub_sub.lock().await.remove_client(session.id);

    let mut replication = state.replication.lock().await;
    if replication.is_replica(session.id) {
        info!(client = session.id, "replica disconnected");
        replication.remove(session.id);
    }
}
