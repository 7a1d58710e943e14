use crate::{
    commands::{command_error::CommandError, command_handler::CommandResult},
    key_value_store::DataType,
    resp::RespValue,
    state::ServerState,
};

pub struct GetArguments {
    pub key: String,
}

impl GetArguments {
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        let [key] = <[String; 1]>::try_from(arguments)
            .map_err(|_| CommandError::WrongNumberOfArguments("get".into()))?;

        Ok(Self { key })
    }
}

/// Handles the Redis GET command.
///
/// Retrieves the string stored at a key. An expired key is removed on the way and
/// reported as missing.
///
/// # Returns
///
/// * `Ok(CommandResult::Response)` with either:
///   - a bulk string holding the value
///   - a null bulk string when the key does not exist or has expired
/// * `Err(CommandError::WrongType)` - if the key holds a list, sorted set or stream
/// * `Err(CommandError::WrongNumberOfArguments)` - if not called with exactly one key
///
/// # Examples
///
/// ```ignore
/// // GET mykey
/// let result = get(&state, vec!["mykey".to_string()]).await;
/// // Returns: Response(BulkString("hello")) or Response(Null)
/// ```
pub async fn get(state: &ServerState, arguments: Vec<String>) -> Result<CommandResult, CommandError> {
    let get_arguments = GetArguments::parse(arguments)?;

    let mut db = state.db.lock().await;

    let reply = match db.store.get(&get_arguments.key).map(|value| &value.data) {
        None => RespValue::Null,
        Some(DataType::String(s)) => RespValue::BulkString(s.clone()),
        Some(_) => return Err(CommandError::WrongType),
    };

    Ok(CommandResult::Response(reply))
}
