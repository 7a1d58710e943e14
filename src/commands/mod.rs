mod acl;
mod auth;
mod blpop;
mod command_error;
mod command_handler;
mod config_get;
mod echo;
mod geo;
mod get;
mod incr;
mod info;
mod keys;
mod llen;
mod lpop;
mod lrange;
mod ping;
mod pub_sub;
mod replication;
mod rpush_and_lpush;
mod set;
mod stream_utils;
mod transactions;
mod type_command;
mod xadd;
mod xrange;
mod xread;
mod zset;

pub use command_error::CommandError;
pub use command_handler::{CommandHandler, CommandResult, dispatch};

use crate::resp::RespValue;

/// The frame a write is forwarded to replicas as: `name` followed by `arguments`.
fn replicated(name: &str, arguments: &[String]) -> RespValue {
    RespValue::Array(
        std::iter::once(name.to_string())
            .chain(arguments.iter().cloned())
            .map(RespValue::BulkString)
            .collect(),
    )
}

fn parse_integer<T: std::str::FromStr>(input: &str) -> Result<T, CommandError> {
    input.parse::<T>().map_err(|_| CommandError::NotAnInteger)
}
