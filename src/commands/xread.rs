use std::time::Duration;

use tokio::{
    sync::MutexGuard,
    time::{Instant, timeout_at},
};
use tracing::debug;

use crate::{
    blocking::WaitKind,
    client::ClientSession,
    commands::{
        command_error::CommandError, command_handler::CommandResult, parse_integer,
        stream_utils::stream_entries_to_resp,
    },
    resp::RespValue,
    state::{Database, ServerState},
    types::stream::StreamId,
};

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum ReadStart {
    After(StreamId),
    /// `$`: whatever the stream's last ID is when the command runs.
    Latest,
}

#[derive(Debug, PartialEq)]
pub struct XreadArguments {
    pub count: Option<usize>,
    /// Milliseconds to block, `Some(0)` blocks forever.
    pub block: Option<u64>,
    pub streams: Vec<(String, ReadStart)>,
}

impl XreadArguments {
    /// Parses `[COUNT n] [BLOCK ms] STREAMS key [key ...] id [id ...]`.
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        let mut count = None;
        let mut block = None;
        let mut index = 0;

        loop {
            let Some(option) = arguments.get(index) else {
                return Err(CommandError::WrongNumberOfArguments("xread".into()));
            };

            match option.to_uppercase().as_str() {
                "COUNT" => {
                    let value = arguments.get(index + 1).ok_or(CommandError::Syntax)?;
                    count = Some(parse_integer::<usize>(value)?);
                }
                "BLOCK" => {
                    let value = arguments.get(index + 1).ok_or(CommandError::Syntax)?;
                    let milliseconds = parse_integer::<i64>(value)?;
                    if milliseconds < 0 {
                        return Err(CommandError::NegativeTimeout);
                    }
                    block = Some(milliseconds as u64);
                }
                "STREAMS" => break,
                _ => return Err(CommandError::Syntax),
            }

            index += 2;
        }

        let rest = &arguments[index + 1..];
        if rest.is_empty() {
            return Err(CommandError::WrongNumberOfArguments("xread".into()));
        }
        if rest.len() % 2 != 0 {
            return Err(CommandError::UnbalancedXread);
        }

        let (keys, ids) = rest.split_at(rest.len() / 2);
        let streams = keys
            .iter()
            .zip(ids)
            .map(|(key, id)| {
                let start = match id.as_str() {
                    "$" => ReadStart::Latest,
                    id => ReadStart::After(StreamId::parse(id, 0)?),
                };
                Ok((key.clone(), start))
            })
            .collect::<Result<Vec<(String, ReadStart)>, CommandError>>()?;

        Ok(Self {
            count,
            block,
            streams,
        })
    }
}

/// Entries newer than each key's start, as `[[key, entries], ...]`. Streams with
/// nothing new are left out; `None` when no stream had anything.
fn read_streams(
    db: &mut MutexGuard<'_, Database>,
    streams: &[(String, StreamId)],
    count: Option<usize>,
) -> Result<Option<RespValue>, CommandError> {
    let mut results = Vec::new();

    for (key, after) in streams {
        let Some(stream) = db.store.stream_mut(key)? else {
            continue;
        };

        let entries = stream.read_after(*after, count);
        if entries.is_empty() {
            continue;
        }

        results.push(RespValue::Array(vec![
            RespValue::BulkString(key.clone()),
            stream_entries_to_resp(entries),
        ]));
    }

    Ok((!results.is_empty()).then_some(RespValue::Array(results)))
}

/// Handles the Redis XREAD command.
///
/// Without BLOCK the reply is immediate: the new entries, or a null array. With BLOCK
/// the client waits on every key until an append produces something newer than its
/// start or the timeout passes. `$` is resolved once, when the command starts, so only
/// entries added after that point are returned. Inside EXEC the command never waits.
pub async fn xread(
    state: &ServerState,
    session: &ClientSession,
    arguments: Vec<String>,
    in_transaction: bool,
) -> Result<CommandResult, CommandError> {
    let xread_arguments = XreadArguments::parse(arguments)?;
    let deadline = match xread_arguments.block {
        Some(0) | None => None,
        Some(milliseconds) => Instant::now().checked_add(Duration::from_millis(milliseconds)),
    };

    let (streams, mut ticket) = {
        let mut db = state.db.lock().await;

        let mut streams = Vec::with_capacity(xread_arguments.streams.len());
        for (key, start) in &xread_arguments.streams {
            let after = match start {
                ReadStart::After(id) => *id,
                ReadStart::Latest => db
                    .store
                    .stream_mut(key)?
                    .map_or(StreamId::MIN, |stream| stream.last_id()),
            };
            streams.push((key.clone(), after));
        }

        if let Some(reply) = read_streams(&mut db, &streams, xread_arguments.count)? {
            return Ok(CommandResult::Response(reply));
        }

        if xread_arguments.block.is_none() || in_transaction {
            return Ok(CommandResult::Response(RespValue::NullArray));
        }

        let keys = streams
            .iter()
            .map(|(key, _)| key.clone())
            .collect::<Vec<String>>();
        let ticket = db.blocking.register(session.id, WaitKind::StreamRead, &keys);

        (streams, ticket)
    };

    debug!(client = session.id, streams = streams.len(), "blocked on XREAD");

    loop {
        let signal = match deadline {
            Some(deadline) => timeout_at(deadline, ticket.receiver.recv()).await.ok(),
            None => Some(ticket.receiver.recv().await),
        };

        let mut db = state.db.lock().await;

        if !matches!(signal, Some(Some(()))) {
            db.blocking.unregister(ticket.id);
            return Ok(CommandResult::Response(RespValue::NullArray));
        }

        match read_streams(&mut db, &streams, xread_arguments.count) {
            Ok(Some(reply)) => {
                db.blocking.unregister(ticket.id);
                return Ok(CommandResult::Response(reply));
            }
            Ok(None) => {}
            Err(error) => {
                db.blocking.unregister(ticket.id);
                return Err(error);
            }
        }
    }
}
