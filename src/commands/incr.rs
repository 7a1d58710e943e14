use crate::{
    commands::{command_error::CommandError, command_handler::CommandResult, replicated},
    key_value_store::{DataType, Value},
    resp::RespValue,
    state::ServerState,
};

pub struct IncrArguments {
    pub key: String,
}

impl IncrArguments {
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        let [key] = <[String; 1]>::try_from(arguments)
            .map_err(|_| CommandError::WrongNumberOfArguments("incr".into()))?;

        Ok(Self { key })
    }
}

/// Increments the integer stored at a key, starting from 0 when the key is missing.
/// An existing expiry is kept.
pub async fn incr(state: &ServerState, arguments: Vec<String>) -> Result<CommandResult, CommandError> {
    let incr_arguments = IncrArguments::parse(arguments)?;

    let mut db = state.db.lock().await;

    let number = match db.store.get(&incr_arguments.key).map(|value| &value.data) {
        None => 0,
        Some(DataType::String(s)) => s.parse::<i64>().map_err(|_| CommandError::NotAnInteger)?,
        Some(_) => return Err(CommandError::WrongType),
    };

    let incremented = number.checked_add(1).ok_or(CommandError::Overflow)?;

    match db.store.get_mut(&incr_arguments.key) {
        Some(value) => value.data = DataType::String(incremented.to_string()),
        None => db.store.insert(
            incr_arguments.key.clone(),
            Value::new(DataType::String(incremented.to_string())),
        ),
    }

    state
        .propagate(&db, &replicated("INCR", &[incr_arguments.key]))
        .await;

    Ok(CommandResult::Response(RespValue::Integer(incremented)))
}
