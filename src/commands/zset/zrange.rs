use crate::{
    commands::{command_error::CommandError, command_handler::CommandResult, parse_integer},
    resp::RespValue,
    state::ServerState,
    types::zset::format_score,
};

pub struct ZrangeArguments {
    pub key: String,
    pub start: i64,
    pub stop: i64,
    pub with_scores: bool,
}

impl ZrangeArguments {
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        if arguments.len() < 3 {
            return Err(CommandError::WrongNumberOfArguments("zrange".into()));
        }

        let with_scores = match &arguments[3..] {
            [] => false,
            [option] if option.eq_ignore_ascii_case("withscores") => true,
            _ => return Err(CommandError::Syntax),
        };

        Ok(Self {
            key: arguments[0].clone(),
            start: parse_integer(&arguments[1])?,
            stop: parse_integer(&arguments[2])?,
            with_scores,
        })
    }
}

/// Members between two ranks, inclusive, with the same negative index rules as LRANGE.
pub async fn zrange(state: &ServerState, arguments: Vec<String>) -> Result<CommandResult, CommandError> {
    let zrange_arguments = ZrangeArguments::parse(arguments)?;

    let mut db = state.db.lock().await;
    let Some(zset) = db.store.zset_mut(&zrange_arguments.key)? else {
        return Ok(CommandResult::Response(RespValue::Array(Vec::new())));
    };

    let mut reply = Vec::new();
    for (member, score) in zset.range(zrange_arguments.start, zrange_arguments.stop) {
        reply.push(RespValue::bulk(member));
        if zrange_arguments.with_scores {
            reply.push(RespValue::BulkString(format_score(score)));
        }
    }

    Ok(CommandResult::Response(RespValue::Array(reply)))
}
