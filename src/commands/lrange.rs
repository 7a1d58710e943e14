use crate::{
    commands::{command_error::CommandError, command_handler::CommandResult, parse_integer},
    resp::RespValue,
    state::ServerState,
    types::list,
};

/// Represents the parsed arguments for the LRANGE command.
pub struct LrangeArguments {
    /// The key holding the list
    pub key: String,
    /// The starting index for the range (can be negative to count from the end)
    pub start_index: i64,
    /// The inclusive ending index for the range (can be negative to count from the end)
    pub end_index: i64,
}

impl LrangeArguments {
    /// Parses `key start stop`. Both indices must be signed integers.
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        let [key, start, stop] = <[String; 3]>::try_from(arguments)
            .map_err(|_| CommandError::WrongNumberOfArguments("lrange".into()))?;

        Ok(Self {
            key,
            start_index: parse_integer(&start)?,
            end_index: parse_integer(&stop)?,
        })
    }
}

/// Handles the Redis LRANGE command.
///
/// Negative indices count from the tail (`-1` is the last element), an end index past
/// the tail is clamped and an empty or inverted range yields an empty array, as does a
/// missing key.
pub async fn lrange(state: &ServerState, arguments: Vec<String>) -> Result<CommandResult, CommandError> {
    let lrange_arguments = LrangeArguments::parse(arguments)?;

    let mut db = state.db.lock().await;
    let values = match db.store.list_mut(&lrange_arguments.key)? {
        Some(values) => list::range(
            values,
            lrange_arguments.start_index,
            lrange_arguments.end_index,
        ),
        None => Vec::new(),
    };

    Ok(CommandResult::Response(RespValue::array_of_bulk_strings(
        values,
    )))
}
