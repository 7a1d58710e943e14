use tracing::debug;

use crate::{
    client::ClientSession,
    commands::{CommandError, CommandResult, parse_integer},
    resp::RespValue,
    state::ServerState,
};

#[derive(Debug, PartialEq)]
pub enum ReplconfArguments {
    /// `listening-port` and `capa` sent during the handshake.
    Handshake,
    /// `ACK <offset>` from a replica.
    Ack(u64),
    /// `GETACK *` from the primary.
    GetAck,
}

impl ReplconfArguments {
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        let Some((option, values)) = arguments.split_first() else {
            return Err(CommandError::WrongNumberOfArguments("replconf".into()));
        };

        match (option.to_lowercase().as_str(), values) {
            ("listening-port", [port]) => {
                parse_integer::<u16>(port)?;
                Ok(Self::Handshake)
            }
            ("capa", [_, ..]) => Ok(Self::Handshake),
            ("ack", [offset]) => Ok(Self::Ack(parse_integer(offset)?)),
            ("getack", [_]) => Ok(Self::GetAck),
            _ => Err(CommandError::Syntax),
        }
    }
}

/// Handles REPLCONF on both ends of a replication link.
///
/// An `ACK` records the replica's offset and wakes any WAIT in progress; it is never
/// answered. A `GETACK` is answered with the bytes of the primary's stream this link
/// has applied so far.
pub async fn replconf(
    state: &ServerState,
    session: &ClientSession,
    arguments: Vec<String>,
) -> Result<CommandResult, CommandError> {
    match ReplconfArguments::parse(arguments)? {
        ReplconfArguments::Handshake => Ok(CommandResult::Response(RespValue::ok())),
        ReplconfArguments::Ack(offset) => {
            if state.replication.lock().await.record_ack(session.id, offset) {
                debug!(client = session.id, offset, "replica acknowledged");
                state.replication_acks.notify_waiters();
            }

            Ok(CommandResult::NoResponse)
        }
        ReplconfArguments::GetAck => Ok(CommandResult::Response(RespValue::array_of_bulk_strings([
            "REPLCONF".to_string(),
            "ACK".to_string(),
            session.replication_offset.to_string(),
        ]))),
    }
}
