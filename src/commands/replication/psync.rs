use bytes::Bytes;
use tracing::info;

use crate::{
    client::ClientSession,
    commands::{CommandError, CommandResult},
    rdb::encode_snapshot,
    resp::RespValue,
    state::ServerState,
};

pub struct PsyncArguments;

impl PsyncArguments {
    /// Partial resynchronisation is not offered, so the requested ID and offset are
    /// only checked for presence.
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        if arguments.len() != 2 {
            return Err(CommandError::WrongNumberOfArguments("psync".into()));
        }

        Ok(Self)
    }
}

/// Handles PSYNC with a full resynchronisation.
///
/// Replies `+FULLRESYNC <replid> <offset>`, sends a snapshot of the string keys as
/// `$<len>\r\n<bytes>` with no trailing CRLF, then registers the connection as a
/// replica. The keyspace lock is held throughout, so no write can fall between the
/// snapshot and the first forwarded command.
pub async fn psync(
    state: &ServerState,
    session: &ClientSession,
    arguments: Vec<String>,
) -> Result<CommandResult, CommandError> {
    PsyncArguments::parse(arguments)?;

    let db = state.db.lock().await;
    let snapshot = encode_snapshot(&db.store.string_entries());
    let mut replication = state.replication.lock().await;

    session.send(&RespValue::SimpleString(format!(
        "FULLRESYNC {} {}",
        replication.replication_id(),
        replication.offset()
    )));

    let mut payload = format!("${}\r\n", snapshot.len()).into_bytes();
    payload.extend_from_slice(&snapshot);
    session.send_bytes(Bytes::from(payload));

    replication.register(session.id, session.outbound());
    info!(
        client = session.id,
        offset = replication.offset(),
        snapshot_bytes = snapshot.len(),
        "replica registered"
    );

    Ok(CommandResult::NoResponse)
}
