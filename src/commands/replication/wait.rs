use std::time::Duration;

use tokio::time::{Instant, timeout_at};

use crate::{
    commands::{CommandError, CommandResult, parse_integer},
    resp::RespValue,
    state::ServerState,
};

pub struct WaitArguments {
    pub replicas: usize,
    /// `None` waits forever.
    pub timeout: Option<Duration>,
}

impl WaitArguments {
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        let [replicas, timeout] = <[String; 2]>::try_from(arguments)
            .map_err(|_| CommandError::WrongNumberOfArguments("wait".into()))?;

        let timeout = parse_integer::<i64>(&timeout)?;
        if timeout < 0 {
            return Err(CommandError::NegativeTimeout);
        }

        Ok(Self {
            replicas: parse_integer(&replicas)?,
            timeout: (timeout > 0).then(|| Duration::from_millis(timeout as u64)),
        })
    }
}

/// Handles the Redis WAIT command.
///
/// With nothing written yet, or when no replicas are asked for, the reply is just the
/// number of connected replicas. Otherwise the current offset becomes the target, every
/// replica is asked for a fresh ACK, and the command returns as soon as enough replicas
/// have acknowledged the target or when the timeout passes, replying with the count
/// reached.
pub async fn wait(state: &ServerState, arguments: Vec<String>) -> Result<CommandResult, CommandError> {
    let wait_arguments = WaitArguments::parse(arguments)?;

    if state.is_replica() {
        return Err(CommandError::WaitOnReplica);
    }

    let deadline = wait_arguments
        .timeout
        .and_then(|timeout| Instant::now().checked_add(timeout));

    let target = {
        let mut replication = state.replication.lock().await;
        replication.prune_closed();

        let target = replication.offset();
        if target == 0 || wait_arguments.replicas == 0 {
            return Ok(CommandResult::Response(RespValue::Integer(
                replication.connected_replicas() as i64,
            )));
        }

        replication.forward(&RespValue::command(&["REPLCONF", "GETACK", "*"]));
        target
    };

    loop {
        let notified = state.replication_acks.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();

        let acked = {
            let mut replication = state.replication.lock().await;
            replication.prune_closed();
            replication.replicas_acked(target)
        };

        if acked >= wait_arguments.replicas {
            return Ok(CommandResult::Response(RespValue::Integer(acked as i64)));
        }

        match deadline {
            Some(deadline) => {
                if timeout_at(deadline, notified).await.is_err() {
                    let mut replication = state.replication.lock().await;
                    replication.prune_closed();
                    let acked = replication.replicas_acked(target);
                    return Ok(CommandResult::Response(RespValue::Integer(acked as i64)));
                }
            }
            None => notified.await,
        }
    }
}
