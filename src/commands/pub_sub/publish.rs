use crate::{
    commands::{CommandError, CommandResult},
    resp::RespValue,
    state::ServerState,
};

pub struct PublishArguments {
    pub channel: String,
    pub message: String,
}

impl PublishArguments {
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        let [channel, message] = <[String; 2]>::try_from(arguments)
            .map_err(|_| CommandError::WrongNumberOfArguments("publish".into()))?;

        Ok(Self { channel, message })
    }
}

/// Hands `["message", channel, message]` to every current subscriber and replies with
/// how many there were.
pub async fn publish(state: &ServerState, arguments: Vec<String>) -> Result<CommandResult, CommandError> {
    let publish_arguments = PublishArguments::parse(arguments)?;

    let delivered = state
        .pub_sub
        .lock()
        .await
        .publish(&publish_arguments.channel, &publish_arguments.message);

    Ok(CommandResult::Response(RespValue::Integer(delivered as i64)))
}
