use crate::{
    commands::{command_error::CommandError, command_handler::CommandResult},
    resp::RespValue,
    state::ServerState,
};

pub struct ZrankArguments {
    pub key: String,
    pub member: String,
}

impl ZrankArguments {
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        let [key, member] = <[String; 2]>::try_from(arguments)
            .map_err(|_| CommandError::WrongNumberOfArguments("zrank".into()))?;

        Ok(Self { key, member })
    }
}

/// Zero-based rank by ascending score, ties broken by member. Null when the member or
/// the key is missing.
pub async fn zrank(state: &ServerState, arguments: Vec<String>) -> Result<CommandResult, CommandError> {
    let zrank_arguments = ZrankArguments::parse(arguments)?;

    let mut db = state.db.lock().await;
    let rank = db
        .store
        .zset_mut(&zrank_arguments.key)?
        .and_then(|zset| zset.rank(&zrank_arguments.member));

    let reply = match rank {
        Some(rank) => RespValue::Integer(rank as i64),
        None => RespValue::Null,
    };

    Ok(CommandResult::Response(reply))
}
