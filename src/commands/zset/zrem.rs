use crate::{
    commands::{command_error::CommandError, command_handler::CommandResult, replicated},
    resp::RespValue,
    state::ServerState,
};

pub struct ZremArguments {
    pub key: String,
    pub members: Vec<String>,
}

impl ZremArguments {
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        let Some((key, members)) = arguments.split_first() else {
            return Err(CommandError::WrongNumberOfArguments("zrem".into()));
        };

        if members.is_empty() {
            return Err(CommandError::WrongNumberOfArguments("zrem".into()));
        }

        Ok(Self {
            key: key.clone(),
            members: members.to_vec(),
        })
    }
}

/// Removes members, dropping the key once the set is empty. Replies with the number
/// of members removed.
pub async fn zrem(state: &ServerState, arguments: Vec<String>) -> Result<CommandResult, CommandError> {
    let zrem_arguments = ZremArguments::parse(arguments.clone())?;

    let mut db = state.db.lock().await;
    let Some(zset) = db.store.zset_mut(&zrem_arguments.key)? else {
        return Ok(CommandResult::Response(RespValue::Integer(0)));
    };

    let removed = zrem_arguments
        .members
        .iter()
        .filter(|member| zset.remove(member))
        .count();

    db.store.remove_if_empty(&zrem_arguments.key);

    if removed > 0 {
        state.propagate(&db, &replicated("ZREM", &arguments)).await;
    }

    Ok(CommandResult::Response(RespValue::Integer(removed as i64)))
}
