use crate::{
    commands::{command_error::CommandError, command_handler::CommandResult, replicated},
    resp::RespValue,
    state::ServerState,
    types::list,
};

pub struct PushArguments {
    pub key: String,
    pub values: Vec<String>,
}

impl PushArguments {
    pub fn parse(arguments: Vec<String>, command: &str) -> Result<Self, CommandError> {
        if arguments.len() < 2 {
            return Err(CommandError::WrongNumberOfArguments(command.to_lowercase()));
        }

        let mut arguments = arguments.into_iter();
        let key = arguments.next().unwrap_or_default();

        Ok(Self {
            key,
            values: arguments.collect(),
        })
    }
}

/// Shared body of RPUSH and LPUSH: push, replicate, then hand the key to the oldest
/// blocked BLPOP if there is one.
async fn push(
    state: &ServerState,
    arguments: Vec<String>,
    command: &str,
    push_values: fn(&mut std::collections::VecDeque<String>, &[String]) -> usize,
) -> Result<CommandResult, CommandError> {
    let push_arguments = PushArguments::parse(arguments.clone(), command)?;

    let mut db = state.db.lock().await;
    let list = db.store.list_or_create(&push_arguments.key)?;
    let length = push_values(list, &push_arguments.values);

    state.propagate(&db, &replicated(command, &arguments)).await;
    db.wake_list_waiters(&push_arguments.key);

    Ok(CommandResult::Response(RespValue::Integer(length as i64)))
}

/// Appends values to the tail of a list, creating it if needed. Returns the new length.
pub async fn rpush(state: &ServerState, arguments: Vec<String>) -> Result<CommandResult, CommandError> {
    push(state, arguments, "RPUSH", list::push_back).await
}

/// Prepends values one at a time, so `LPUSH k a b c` leaves `c b a`.
pub async fn lpush(state: &ServerState, arguments: Vec<String>) -> Result<CommandResult, CommandError> {
    push(state, arguments, "LPUSH", list::push_front).await
}
