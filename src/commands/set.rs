use crate::{
    commands::{
        command_error::CommandError, command_handler::CommandResult, parse_integer, replicated,
    },
    key_value_store::{DataType, Value, now_ms},
    resp::RespValue,
    state::ServerState,
};

/// Represents the parsed arguments for the SET command
#[derive(Debug, PartialEq)]
pub struct SetArguments {
    /// The key name to store the value under
    pub key: String,
    /// The value to be stored under the given key
    pub value: String,
    /// Time to live in milliseconds, from either `PX` or `EX`
    pub ttl_ms: Option<u64>,
}

impl SetArguments {
    /// Parses `key value [PX milliseconds | EX seconds]`.
    ///
    /// The expiry option is case-insensitive and must be a positive integer. The
    /// deadline itself is computed when the command runs, not when it is parsed, so
    /// a SET queued inside MULTI gets its full time to live from EXEC onwards.
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        if arguments.len() < 2 {
            return Err(CommandError::WrongNumberOfArguments("set".into()));
        }

        let ttl_ms = match &arguments[2..] {
            [] => None,
            [option, amount] => {
                let amount = parse_integer::<i64>(amount)?;
                if amount <= 0 {
                    return Err(CommandError::InvalidExpireTime("set".into()));
                }

                match option.to_lowercase().as_str() {
                    "px" => Some(amount as u64),
                    "ex" => Some((amount as u64).saturating_mul(1000)),
                    _ => return Err(CommandError::Syntax),
                }
            }
            _ => return Err(CommandError::Syntax),
        };

        Ok(Self {
            key: arguments[0].clone(),
            value: arguments[1].clone(),
            ttl_ms,
        })
    }
}

/// Handles the Redis SET command.
///
/// Stores a string under a key, replacing whatever the key held before regardless
/// of its type. Replicas receive the command as the client sent it.
pub async fn set(state: &ServerState, arguments: Vec<String>) -> Result<CommandResult, CommandError> {
    let set_arguments = SetArguments::parse(arguments.clone())?;

    let expires_at = set_arguments
        .ttl_ms
        .map_or(0, |ttl| now_ms().saturating_add(ttl));

    let mut db = state.db.lock().await;
    db.store.insert(
        set_arguments.key,
        Value::with_expiry(DataType::String(set_arguments.value), expires_at),
    );
    state.propagate(&db, &replicated("SET", &arguments)).await;

    Ok(CommandResult::Response(RespValue::ok()))
}
