use crate::{
    commands::{
        command_error::CommandError, command_handler::CommandResult, geo::parse_float, replicated,
    },
    resp::RespValue,
    state::ServerState,
    types::geo::{Coordinates, score_of},
};

#[derive(Debug, PartialEq)]
pub struct GeoaddArguments {
    pub key: String,
    pub locations: Vec<(Coordinates, String)>,
}

impl GeoaddArguments {
    /// Parses `key longitude latitude member [longitude latitude member ...]`, rejecting
    /// the whole command if any pair is outside the representable range.
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        if arguments.len() < 4 || (arguments.len() - 1) % 3 != 0 {
            return Err(CommandError::WrongNumberOfArguments("geoadd".into()));
        }

        let locations = arguments[1..]
            .chunks_exact(3)
            .map(|triple| {
                let longitude = parse_float(&triple[0])?;
                let latitude = parse_float(&triple[1])?;

                Coordinates::new(longitude, latitude)
                    .map(|coordinates| (coordinates, triple[2].clone()))
                    .ok_or(CommandError::InvalidCoordinates(longitude, latitude))
            })
            .collect::<Result<Vec<(Coordinates, String)>, CommandError>>()?;

        Ok(Self {
            key: arguments[0].clone(),
            locations,
        })
    }
}

pub async fn geoadd(state: &ServerState, arguments: Vec<String>) -> Result<CommandResult, CommandError> {
    let geoadd_arguments = GeoaddArguments::parse(arguments.clone())?;

    let mut db = state.db.lock().await;
    let zset = db.store.zset_or_create(&geoadd_arguments.key)?;

    let added = geoadd_arguments
        .locations
        .iter()
        .filter(|(coordinates, member)| zset.add(score_of(*coordinates), member))
        .count();

    state.propagate(&db, &replicated("GEOADD", &arguments)).await;

    Ok(CommandResult::Response(RespValue::Integer(added as i64)))
}
