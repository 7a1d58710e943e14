use crate::{
    commands::{CommandError, CommandResult, ping::PingArguments},
    resp::RespValue,
};

/// PING while subscribed replies in the push shape: `["pong", message]`.
pub fn subscribed_ping(arguments: Vec<String>) -> Result<CommandResult, CommandError> {
    let ping_arguments = PingArguments::parse(arguments)?;

    Ok(CommandResult::Response(RespValue::array_of_bulk_strings([
        "pong".to_string(),
        ping_arguments.message.unwrap_or_default(),
    ])))
}
