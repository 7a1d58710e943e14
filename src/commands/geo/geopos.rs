use crate::{
    commands::{command_error::CommandError, command_handler::CommandResult},
    resp::RespValue,
    state::ServerState,
    types::geo::coordinates_of,
};

pub struct GeoposArguments {
    pub key: String,
    pub members: Vec<String>,
}

impl GeoposArguments {
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        let Some((key, members)) = arguments.split_first() else {
            return Err(CommandError::WrongNumberOfArguments("geopos".into()));
        };

        Ok(Self {
            key: key.clone(),
            members: members.to_vec(),
        })
    }
}

/// Replies with `[longitude, latitude]` per member, or a null array for a member that
/// is not in the set.
pub async fn geopos(state: &ServerState, arguments: Vec<String>) -> Result<CommandResult, CommandError> {
    let geopos_arguments = GeoposArguments::parse(arguments)?;

    let mut db = state.db.lock().await;
    let zset = db.store.zset_mut(&geopos_arguments.key)?;

    let positions = geopos_arguments
        .members
        .iter()
        .map(|member| {
            match zset
                .as_ref()
                .and_then(|zset| zset.score(member))
                .and_then(coordinates_of)
            {
                Some(coordinates) => RespValue::array_of_bulk_strings([
                    coordinates.longitude.to_string(),
                    coordinates.latitude.to_string(),
                ]),
                None => RespValue::NullArray,
            }
        })
        .collect();

    Ok(CommandResult::Response(RespValue::Array(positions)))
}
