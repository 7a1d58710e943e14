use crate::{
    commands::{CommandError, CommandResult},
    resp::RespValue,
    state::ServerState,
};

pub struct KeysArguments {
    pub pattern: String,
}

impl KeysArguments {
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        let [pattern] = <[String; 1]>::try_from(arguments)
            .map_err(|_| CommandError::WrongNumberOfArguments("keys".into()))?;

        Ok(Self { pattern })
    }
}

pub async fn keys(state: &ServerState, arguments: Vec<String>) -> Result<CommandResult, CommandError> {
    let keys_arguments = KeysArguments::parse(arguments)?;

    let mut db = state.db.lock().await;
    let keys = db.store.keys(&keys_arguments.pattern);

    Ok(CommandResult::Response(RespValue::array_of_bulk_strings(
        keys,
    )))
}
