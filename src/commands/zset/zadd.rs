use crate::{
    commands::{command_error::CommandError, command_handler::CommandResult, replicated},
    resp::RespValue,
    state::ServerState,
    types::zset::parse_score,
};

#[derive(Debug, PartialEq)]
pub struct ZaddArguments {
    pub key: String,
    pub members: Vec<(f64, String)>,
}

impl ZaddArguments {
    /// Parses `key score member [score member ...]`. Every score is validated before
    /// anything is written.
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        if arguments.len() < 3 {
            return Err(CommandError::WrongNumberOfArguments("zadd".into()));
        }

        if arguments.len() % 2 == 0 {
            return Err(CommandError::Syntax);
        }

        let members = arguments[1..]
            .chunks_exact(2)
            .map(|pair| {
                parse_score(&pair[0])
                    .map(|score| (score, pair[1].clone()))
                    .ok_or(CommandError::NotAFloat)
            })
            .collect::<Result<Vec<(f64, String)>, CommandError>>()?;

        Ok(Self {
            key: arguments[0].clone(),
            members,
        })
    }
}

/// Adds or rescores members. Replies with the number of members that were new.
pub async fn zadd(state: &ServerState, arguments: Vec<String>) -> Result<CommandResult, CommandError> {
    let zadd_arguments = ZaddArguments::parse(arguments.clone())?;

    let mut db = state.db.lock().await;
    let zset = db.store.zset_or_create(&zadd_arguments.key)?;

    let added = zadd_arguments
        .members
        .iter()
        .filter(|(score, member)| zset.add(*score, member))
        .count();

    state.propagate(&db, &replicated("ZADD", &arguments)).await;

    Ok(CommandResult::Response(RespValue::Integer(added as i64)))
}
