use std::time::Duration;

use tokio::{
    sync::MutexGuard,
    time::{Instant, timeout_at},
};
use tracing::debug;

use crate::{
    blocking::WaitKind,
    client::ClientSession,
    commands::{command_error::CommandError, command_handler::CommandResult},
    resp::RespValue,
    state::{Database, ServerState},
};

#[derive(Debug, PartialEq)]
pub struct BlpopArguments {
    pub keys: Vec<String>,
    /// `None` waits forever.
    pub timeout: Option<Duration>,
}

impl BlpopArguments {
    /// Parses `key [key ...] timeout`, the timeout being fractional seconds.
    pub fn parse(mut arguments: Vec<String>) -> Result<Self, CommandError> {
        if arguments.len() < 2 {
            return Err(CommandError::WrongNumberOfArguments("blpop".into()));
        }

        let timeout = arguments
            .pop()
            .unwrap_or_default()
            .parse::<f64>()
            .map_err(|_| CommandError::InvalidTimeout)?;

        if timeout.is_nan() || timeout.is_infinite() {
            return Err(CommandError::InvalidTimeout);
        }

        if timeout < 0.0 {
            return Err(CommandError::NegativeTimeout);
        }

        let timeout = if timeout > 0.0 {
            let duration =
                Duration::try_from_secs_f64(timeout).map_err(|_| CommandError::InvalidTimeout)?;
            Some(duration)
        } else {
            None
        };

        Ok(Self {
            keys: arguments,
            timeout,
        })
    }
}

/// Pops the head of the first non-empty list among `keys`.
///
/// The pop is replicated as `LPOP key`, and any of the keys that still has elements is
/// handed on to its next waiter. A blocked BLPOP can be dropped at any await when its
/// client goes away, so the replication lock is taken before the list is touched and
/// the pop and its forwarding happen without yielding in between.
async fn try_pop(
    state: &ServerState,
    db: &mut MutexGuard<'_, Database>,
    keys: &[String],
) -> Result<Option<RespValue>, CommandError> {
    for key in keys {
        let has_elements = db.store.list_mut(key)?.is_some_and(|list| !list.is_empty());
        if !has_elements {
            continue;
        }

        let mut replication = state.replication.lock().await;

        let Some(value) = db.store.list_mut(key)?.and_then(|list| list.pop_front()) else {
            continue;
        };

        db.store.remove_if_empty(key);
        replication.forward(&RespValue::command(&["LPOP", key]));
        drop(replication);

        for key in keys {
            db.wake_list_waiters(key);
        }

        return Ok(Some(RespValue::array_of_bulk_strings([key.clone(), value])));
    }

    Ok(None)
}

/// Handles the Redis BLPOP command.
///
/// Pops from the first non-empty list right away when it can. Otherwise the client
/// joins the wait queue of every key and sleeps until a push hands it a key or the
/// timeout passes. Waiters on a key are served in the order they blocked; a woken
/// waiter that finds the list already drained keeps its place at the head of the
/// queue. A timeout replies with a null array.
///
/// Inside EXEC the command never waits.
pub async fn blpop(
    state: &ServerState,
    session: &ClientSession,
    arguments: Vec<String>,
    in_transaction: bool,
) -> Result<CommandResult, CommandError> {
    let blpop_arguments = BlpopArguments::parse(arguments)?;
    // A deadline past what the clock can represent waits forever.
    let deadline = blpop_arguments
        .timeout
        .and_then(|timeout| Instant::now().checked_add(timeout));

    let mut ticket = {
        let mut db = state.db.lock().await;

        if let Some(reply) = try_pop(state, &mut db, &blpop_arguments.keys).await? {
            return Ok(CommandResult::Response(reply));
        }

        if in_transaction {
            return Ok(CommandResult::Response(RespValue::NullArray));
        }

        db.blocking
            .register(session.id, WaitKind::ListPop, &blpop_arguments.keys)
    };

    debug!(client = session.id, keys = ?blpop_arguments.keys, "blocked on BLPOP");

    loop {
        let signal = match deadline {
            Some(deadline) => timeout_at(deadline, ticket.receiver.recv()).await.ok(),
            None => Some(ticket.receiver.recv().await),
        };

        let mut db = state.db.lock().await;

        match signal {
            Some(Some(())) => {}
            Some(None) => {
                db.blocking.unregister(ticket.id);
                return Ok(CommandResult::Response(RespValue::NullArray));
            }
            None => {
                // A push may have picked this waiter just as the timer fired.
                db.blocking.unregister(ticket.id);
                if ticket.receiver.try_recv().is_ok() {
                    if let Some(reply) = try_pop(state, &mut db, &blpop_arguments.keys).await? {
                        return Ok(CommandResult::Response(reply));
                    }
                }
                return Ok(CommandResult::Response(RespValue::NullArray));
            }
        }

        match try_pop(state, &mut db, &blpop_arguments.keys).await {
            Ok(Some(reply)) => {
                db.blocking.unregister(ticket.id);
                return Ok(CommandResult::Response(reply));
            }
            Ok(None) => db.blocking.requeue_front(ticket.id),
            Err(error) => {
                db.blocking.unregister(ticket.id);
                return Err(error);
            }
        }
    }
}
