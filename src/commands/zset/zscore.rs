use crate::{
    commands::{command_error::CommandError, command_handler::CommandResult},
    resp::RespValue,
    state::ServerState,
    types::zset::format_score,
};

pub struct ZscoreArguments {
    pub key: String,
    pub member: String,
}

impl ZscoreArguments {
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        let [key, member] = <[String; 2]>::try_from(arguments)
            .map_err(|_| CommandError::WrongNumberOfArguments("zscore".into()))?;

        Ok(Self { key, member })
    }
}

pub async fn zscore(state: &ServerState, arguments: Vec<String>) -> Result<CommandResult, CommandError> {
    let zscore_arguments = ZscoreArguments::parse(arguments)?;

    let mut db = state.db.lock().await;
    let score = db
        .store
        .zset_mut(&zscore_arguments.key)?
        .and_then(|zset| zset.score(&zscore_arguments.member));

    let reply = match score {
        Some(score) => RespValue::BulkString(format_score(score)),
        None => RespValue::Null,
    };

    Ok(CommandResult::Response(reply))
}
