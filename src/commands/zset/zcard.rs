use crate::{
    commands::{command_error::CommandError, command_handler::CommandResult},
    resp::RespValue,
    state::ServerState,
};

pub struct ZcardArguments {
    pub key: String,
}

impl ZcardArguments {
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        let [key] = <[String; 1]>::try_from(arguments)
            .map_err(|_| CommandError::WrongNumberOfArguments("zcard".into()))?;

        Ok(Self { key })
    }
}

pub async fn zcard(state: &ServerState, arguments: Vec<String>) -> Result<CommandResult, CommandError> {
    let zcard_arguments = ZcardArguments::parse(arguments)?;

    let mut db = state.db.lock().await;
    let cardinality = db
        .store
        .zset_mut(&zcard_arguments.key)?
        .map_or(0, |zset| zset.len());

    Ok(CommandResult::Response(RespValue::Integer(
        cardinality as i64,
    )))
}
