//! GEO commands. Locations live in an ordinary sorted set whose scores are geohashes,
//! so ZRANGE, ZREM and friends work on the same key.

mod geoadd;
mod geodist;
mod geopos;
mod geosearch;

pub use geoadd::{GeoaddArguments, geoadd};
pub use geodist::{GeodistArguments, geodist};
pub use geopos::{GeoposArguments, geopos};
pub use geosearch::{GeosearchArguments, geosearch};

use crate::commands::CommandError;

fn parse_float(input: &str) -> Result<f64, CommandError> {
    input
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or(CommandError::NotAFloat)
}

/// Distances are always reported with four decimals in the requested unit.
fn format_distance(meters: f64, unit_in_meters: f64) -> String {
    format!("{:.4}", meters / unit_in_meters)
}
