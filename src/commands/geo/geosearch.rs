use crate::{
    commands::{
        command_error::CommandError,
        command_handler::CommandResult,
        geo::{format_distance, parse_float},
        parse_integer,
    },
    resp::RespValue,
    state::ServerState,
    types::geo::{Coordinates, coordinates_of, distance, unit_to_meters},
};

#[derive(Debug, PartialEq)]
pub enum SearchOrigin {
    LonLat(Coordinates),
    Member(String),
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum SortOrder {
    Ascending,
    Descending,
}

#[derive(Debug, PartialEq)]
pub struct GeosearchArguments {
    pub key: String,
    pub origin: SearchOrigin,
    pub radius_in_meters: f64,
    pub unit_in_meters: f64,
    pub order: Option<SortOrder>,
    pub count: Option<usize>,
    pub any: bool,
    pub with_coord: bool,
    pub with_dist: bool,
    pub with_hash: bool,
}

impl GeosearchArguments {
    /// Parses
    /// `key FROMLONLAT lon lat | FROMMEMBER member BYRADIUS radius unit
    /// [ASC|DESC] [COUNT n [ANY]] [WITHCOORD] [WITHDIST] [WITHHASH]`.
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        let Some((key, options)) = arguments.split_first() else {
            return Err(CommandError::WrongNumberOfArguments("geosearch".into()));
        };

        let mut origin = None;
        let mut radius = None;
        let mut order = None;
        let mut count = None;
        let mut any = false;
        let mut with_coord = false;
        let mut with_dist = false;
        let mut with_hash = false;

        let mut options = options.iter();
        while let Some(option) = options.next() {
            match option.to_uppercase().as_str() {
                "FROMLONLAT" => {
                    let longitude = parse_float(options.next().ok_or(CommandError::Syntax)?)?;
                    let latitude = parse_float(options.next().ok_or(CommandError::Syntax)?)?;
                    let coordinates = Coordinates::new(longitude, latitude)
                        .ok_or(CommandError::InvalidCoordinates(longitude, latitude))?;
                    origin = Some(SearchOrigin::LonLat(coordinates));
                }
                "FROMMEMBER" => {
                    let member = options.next().ok_or(CommandError::Syntax)?;
                    origin = Some(SearchOrigin::Member(member.clone()));
                }
                "BYRADIUS" => {
                    let amount = parse_float(options.next().ok_or(CommandError::Syntax)?)?;
                    let unit = unit_to_meters(options.next().ok_or(CommandError::Syntax)?)
                        .ok_or(CommandError::UnsupportedUnit)?;
                    if amount < 0.0 {
                        return Err(CommandError::Syntax);
                    }
                    radius = Some((amount * unit, unit));
                }
                "ASC" => order = Some(SortOrder::Ascending),
                "DESC" => order = Some(SortOrder::Descending),
                "COUNT" => {
                    let n = parse_integer::<usize>(options.next().ok_or(CommandError::Syntax)?)?;
                    if n == 0 {
                        return Err(CommandError::Syntax);
                    }
                    count = Some(n);
                }
                "ANY" => any = true,
                "WITHCOORD" => with_coord = true,
                "WITHDIST" => with_dist = true,
                "WITHHASH" => with_hash = true,
                _ => return Err(CommandError::Syntax),
            }
        }

        let (Some(origin), Some((radius_in_meters, unit_in_meters))) = (origin, radius) else {
            return Err(CommandError::Syntax);
        };

        if any && count.is_none() {
            return Err(CommandError::Syntax);
        }

        Ok(Self {
            key: key.clone(),
            origin,
            radius_in_meters,
            unit_in_meters,
            order,
            count,
            any,
            with_coord,
            with_dist,
            with_hash,
        })
    }
}

struct Match {
    member: String,
    meters: f64,
    score: f64,
    coordinates: Coordinates,
}

/// Members within a radius of a point or of another member.
///
/// Results come in sorted-set order unless ASC or DESC is given. A COUNT without ANY
/// sorts nearest first before truncating, COUNT ANY stops at the first `n` matches.
pub async fn geosearch(
    state: &ServerState,
    arguments: Vec<String>,
) -> Result<CommandResult, CommandError> {
    let search = GeosearchArguments::parse(arguments)?;

    let mut db = state.db.lock().await;
    let Some(zset) = db.store.zset_mut(&search.key)? else {
        return Ok(CommandResult::Response(RespValue::Array(Vec::new())));
    };

    let center = match &search.origin {
        SearchOrigin::LonLat(coordinates) => *coordinates,
        SearchOrigin::Member(member) => zset
            .score(member)
            .and_then(coordinates_of)
            .ok_or(CommandError::UnknownGeoMember)?,
    };

    let limit = match (search.count, search.any) {
        (Some(n), true) => n,
        _ => usize::MAX,
    };

    let mut matches = zset
        .iter()
        .filter_map(|(member, score)| {
            let coordinates = coordinates_of(score)?;
            let meters = distance(center, coordinates);

            (meters <= search.radius_in_meters).then(|| Match {
                member: member.to_string(),
                meters,
                score,
                coordinates,
            })
        })
        .take(limit)
        .collect::<Vec<Match>>();

    let order = match (search.order, search.count, search.any) {
        (Some(order), _, _) => Some(order),
        (None, Some(_), false) => Some(SortOrder::Ascending),
        _ => None,
    };

    match order {
        Some(SortOrder::Ascending) => matches.sort_by(|a, b| a.meters.total_cmp(&b.meters)),
        Some(SortOrder::Descending) => matches.sort_by(|a, b| b.meters.total_cmp(&a.meters)),
        None => {}
    }

    if let Some(count) = search.count {
        matches.truncate(count);
    }

    let plain = !(search.with_coord || search.with_dist || search.with_hash);

    let reply = matches
        .into_iter()
        .map(|found| {
            if plain {
                return RespValue::BulkString(found.member);
            }

            let mut item = vec![RespValue::BulkString(found.member)];
            if search.with_dist {
                item.push(RespValue::BulkString(format_distance(
                    found.meters,
                    search.unit_in_meters,
                )));
            }
            if search.with_hash {
                item.push(RespValue::Integer(found.score as i64));
            }
            if search.with_coord {
                item.push(RespValue::array_of_bulk_strings([
                    found.coordinates.longitude.to_string(),
                    found.coordinates.latitude.to_string(),
                ]));
            }
            RespValue::Array(item)
        })
        .collect();

    Ok(CommandResult::Response(RespValue::Array(reply)))
}
