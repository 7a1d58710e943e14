use thiserror::Error;

use crate::{key_value_store::KeyspaceError, resp::RespValue, types::stream::StreamError};

/// Every way a command can fail. `Display` is the exact error line sent to the client.
#[derive(Error, Debug, PartialEq)]
pub enum CommandError {
    #[error("ERR Protocol error: expected an array of bulk strings")]
    InvalidCommand,
    #[error("ERR unknown command '{0}'")]
    UnknownCommand(String),
    #[error("ERR wrong number of arguments for '{0}' command")]
    WrongNumberOfArguments(String),
    #[error("ERR syntax error")]
    Syntax,
    #[error("ERR value is not an integer or out of range")]
    NotAnInteger,
    #[error("ERR value is not a valid float")]
    NotAFloat,
    #[error("ERR increment or decrement would overflow")]
    Overflow,
    #[error("ERR invalid expire time in '{0}' command")]
    InvalidExpireTime(String),
    #[error("ERR timeout is not a float or out of range")]
    InvalidTimeout,
    #[error("ERR timeout is negative")]
    NegativeTimeout,
    #[error("WRONGTYPE Operation against a key holding the wrong kind of value")]
    WrongType,
    #[error("{0}")]
    Stream(#[from] StreamError),
    #[error(
        "ERR Unbalanced 'xread' list of streams: for each stream key an ID or '$' must be specified."
    )]
    UnbalancedXread,
    #[error("ERR invalid longitude,latitude pair {0:.6},{1:.6}")]
    InvalidCoordinates(f64, f64),
    #[error("ERR unsupported unit provided. please use M, KM, FT, MI")]
    UnsupportedUnit,
    #[error("ERR could not decode requested zset member")]
    UnknownGeoMember,
    #[error("NOAUTH Authentication required.")]
    NoAuth,
    #[error("WRONGPASS invalid username-password pair or user is disabled.")]
    WrongPass,
    #[error("ERR unknown subcommand '{0}'. Try ACL HELP.")]
    UnknownAclSubcommand(String),
    #[error("ERR Error in ACL SETUSER modifier '{0}': Syntax error")]
    InvalidAclRule(String),
    #[error(
        "ERR Can't execute '{0}': only (P|S)SUBSCRIBE / (P|S)UNSUBSCRIBE / PING / QUIT / RESET are allowed in this context"
    )]
    NotAllowedWhileSubscribed(String),
    #[error("ERR MULTI calls can not be nested")]
    NestedMulti,
    #[error("ERR EXEC without MULTI")]
    ExecWithoutMulti,
    #[error("ERR DISCARD without MULTI")]
    DiscardWithoutMulti,
    #[error("READONLY You can't write against a read only replica.")]
    ReadOnlyReplica,
    #[error("ERR WAIT cannot be used with replica instances")]
    WaitOnReplica,
}

impl From<KeyspaceError> for CommandError {
    fn from(error: KeyspaceError) -> Self {
        match error {
            KeyspaceError::WrongType => CommandError::WrongType,
        }
    }
}

impl CommandError {
    pub fn to_resp(&self) -> RespValue {
        RespValue::Error(self.to_string())
    }

    pub fn as_string(&self) -> String {
        self.to_resp().encode()
    }
}
