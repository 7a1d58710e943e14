use crate::{
    commands::{command_error::CommandError, command_handler::CommandResult, geo::format_distance},
    resp::RespValue,
    state::ServerState,
    types::geo::{coordinates_of, distance, unit_to_meters},
};

pub struct GeodistArguments {
    pub key: String,
    pub from: String,
    pub to: String,
    pub unit_in_meters: f64,
}

impl GeodistArguments {
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        let (key, from, to, unit) = match arguments.as_slice() {
            [key, from, to] => (key, from, to, "m"),
            [key, from, to, unit] => (key, from, to, unit.as_str()),
            _ => return Err(CommandError::WrongNumberOfArguments("geodist".into())),
        };

        Ok(Self {
            key: key.clone(),
            from: from.clone(),
            to: to.clone(),
            unit_in_meters: unit_to_meters(unit).ok_or(CommandError::UnsupportedUnit)?,
        })
    }
}

/// Distance between two members, or null when either is missing.
pub async fn geodist(state: &ServerState, arguments: Vec<String>) -> Result<CommandResult, CommandError> {
    let geodist_arguments = GeodistArguments::parse(arguments)?;

    let mut db = state.db.lock().await;
    let Some(zset) = db.store.zset_mut(&geodist_arguments.key)? else {
        return Ok(CommandResult::Response(RespValue::Null));
    };

    let from = zset.score(&geodist_arguments.from).and_then(coordinates_of);
    let to = zset.score(&geodist_arguments.to).and_then(coordinates_of);

    let reply = match (from, to) {
        (Some(from), Some(to)) => RespValue::BulkString(format_distance(
            distance(from, to),
            geodist_arguments.unit_in_meters,
        )),
        _ => RespValue::Null,
    };

    Ok(CommandResult::Response(reply))
}
