use crate::{
    commands::{command_error::CommandError, command_handler::CommandResult},
    resp::RespValue,
    state::ServerState,
};

pub struct TypeArguments {
    pub key: String,
}

impl TypeArguments {
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        let [key] = <[String; 1]>::try_from(arguments)
            .map_err(|_| CommandError::WrongNumberOfArguments("type".into()))?;

        Ok(Self { key })
    }
}

/// Replies with `string`, `list`, `zset`, `stream` or `none`.
pub async fn type_command(
    state: &ServerState,
    arguments: Vec<String>,
) -> Result<CommandResult, CommandError> {
    let type_arguments = TypeArguments::parse(arguments)?;

    let mut db = state.db.lock().await;
    let kind = db
        .store
        .kind_of(&type_arguments.key)
        .map_or("none", |kind| kind.as_str());

    Ok(CommandResult::Response(RespValue::SimpleString(
        kind.to_string(),
    )))
}
