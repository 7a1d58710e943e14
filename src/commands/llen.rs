use crate::{
    commands::{command_error::CommandError, command_handler::CommandResult},
    resp::RespValue,
    state::ServerState,
};

pub struct LlenArguments {
    pub key: String,
}

impl LlenArguments {
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        let [key] = <[String; 1]>::try_from(arguments)
            .map_err(|_| CommandError::WrongNumberOfArguments("llen".into()))?;

        Ok(Self { key })
    }
}

pub async fn llen(state: &ServerState, arguments: Vec<String>) -> Result<CommandResult, CommandError> {
    let llen_arguments = LlenArguments::parse(arguments)?;

    let mut db = state.db.lock().await;
    let length = db
        .store
        .list_mut(&llen_arguments.key)?
        .map_or(0, |list| list.len());

    Ok(CommandResult::Response(RespValue::Integer(length as i64)))
}
