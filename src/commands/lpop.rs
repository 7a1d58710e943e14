use crate::{
    commands::{
        command_error::CommandError, command_handler::CommandResult, parse_integer, replicated,
    },
    resp::RespValue,
    state::ServerState,
    types::list,
};

pub struct LpopArguments {
    pub key: String,
    /// `None` for the single-element form, which replies with a bulk string.
    pub count: Option<usize>,
}

impl LpopArguments {
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        match arguments.as_slice() {
            [key] => Ok(Self {
                key: key.clone(),
                count: None,
            }),
            [key, count] => Ok(Self {
                key: key.clone(),
                count: Some(parse_integer::<usize>(count)?),
            }),
            _ => Err(CommandError::WrongNumberOfArguments("lpop".into())),
        }
    }
}

pub async fn lpop(state: &ServerState, arguments: Vec<String>) -> Result<CommandResult, CommandError> {
    let lpop_arguments = LpopArguments::parse(arguments.clone())?;

    let mut db = state.db.lock().await;

    let popped = match db.store.list_mut(&lpop_arguments.key)? {
        Some(values) => list::pop_front(values, lpop_arguments.count.unwrap_or(1)),
        None => {
            let reply = match lpop_arguments.count {
                Some(_) => RespValue::NullArray,
                None => RespValue::Null,
            };
            return Ok(CommandResult::Response(reply));
        }
    };

    db.store.remove_if_empty(&lpop_arguments.key);

    if !popped.is_empty() {
        state.propagate(&db, &replicated("LPOP", &arguments)).await;
    }

    let reply = match lpop_arguments.count {
        Some(_) => RespValue::array_of_bulk_strings(popped),
        None => popped
            .into_iter()
            .next()
            .map_or(RespValue::Null, RespValue::BulkString),
    };

    Ok(CommandResult::Response(reply))
}
