//! Geohash encoding of (longitude, latitude) into sorted-set scores.
//!
//! Both axes are quantized into 26-bit cells and interleaved (latitude in the even
//! bits, longitude in the odd bits) into a 52-bit integer that fits an `f64` exactly,
//! so nearby points get nearby scores.

pub const LONGITUDE_MIN: f64 = -180.0;
pub const LONGITUDE_MAX: f64 = 180.0;
pub const LATITUDE_MIN: f64 = -85.05112878;
pub const LATITUDE_MAX: f64 = 85.05112878;

const STEP: u32 = 26;
const EARTH_RADIUS_IN_METERS: f64 = 6372797.560856;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub longitude: f64,
    pub latitude: f64,
}

impl Coordinates {
    pub fn new(longitude: f64, latitude: f64) -> Option<Self> {
        let in_range = (LONGITUDE_MIN..=LONGITUDE_MAX).contains(&longitude)
            && (LATITUDE_MIN..=LATITUDE_MAX).contains(&latitude);

        in_range.then_some(Self {
            longitude,
            latitude,
        })
    }
}

/// Spreads the low 32 bits of `value` into the even bit positions.
fn spread(value: u32) -> u64 {
    let mut x = u64::from(value);
    x = (x | (x << 16)) & 0x0000_FFFF_0000_FFFF;
    x = (x | (x << 8)) & 0x00FF_00FF_00FF_00FF;
    x = (x | (x << 4)) & 0x0F0F_0F0F_0F0F_0F0F;
    x = (x | (x << 2)) & 0x3333_3333_3333_3333;
    (x | (x << 1)) & 0x5555_5555_5555_5555
}

/// Inverse of [`spread`]: collects the even bits back into a `u32`.
fn squash(value: u64) -> u32 {
    let mut x = value & 0x5555_5555_5555_5555;
    x = (x | (x >> 1)) & 0x3333_3333_3333_3333;
    x = (x | (x >> 2)) & 0x0F0F_0F0F_0F0F_0F0F;
    x = (x | (x >> 4)) & 0x00FF_00FF_00FF_00FF;
    x = (x | (x >> 8)) & 0x0000_FFFF_0000_FFFF;
    x = (x | (x >> 16)) & 0x0000_0000_FFFF_FFFF;
    x as u32
}

fn cell_offset(value: f64, min: f64, max: f64) -> u32 {
    let scale = (1u64 << STEP) as f64;
    let offset = ((value - min) / (max - min) * scale) as u64;
    offset.min((1u64 << STEP) - 1) as u32
}

fn cell_center(offset: u32, min: f64, max: f64) -> f64 {
    let scale = (1u64 << STEP) as f64;
    let low = min + (f64::from(offset) / scale) * (max - min);
    let high = min + ((f64::from(offset) + 1.0) / scale) * (max - min);
    ((low + high) / 2.0).clamp(min, max)
}

pub fn encode(coordinates: Coordinates) -> u64 {
    let lat_offset = cell_offset(coordinates.latitude, LATITUDE_MIN, LATITUDE_MAX);
    let lon_offset = cell_offset(coordinates.longitude, LONGITUDE_MIN, LONGITUDE_MAX);

    spread(lat_offset) | (spread(lon_offset) << 1)
}

/// Returns the center of the cell `hash` names.
pub fn decode(hash: u64) -> Coordinates {
    let lat_offset = squash(hash);
    let lon_offset = squash(hash >> 1);

    Coordinates {
        longitude: cell_center(lon_offset, LONGITUDE_MIN, LONGITUDE_MAX),
        latitude: cell_center(lat_offset, LATITUDE_MIN, LATITUDE_MAX),
    }
}

pub fn score_of(coordinates: Coordinates) -> f64 {
    encode(coordinates) as f64
}

pub fn coordinates_of(score: f64) -> Option<Coordinates> {
    if !score.is_finite() || score < 0.0 {
        return None;
    }

    Some(decode(score as u64))
}

/// Great-circle distance in meters (haversine).
pub fn distance(from: Coordinates, to: Coordinates) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let u = ((lat2 - lat1) / 2.0).sin();
    let v = ((to.longitude.to_radians() - from.longitude.to_radians()) / 2.0).sin();
    let a = (u * u + lat1.cos() * lat2.cos() * v * v).clamp(0.0, 1.0);

    2.0 * EARTH_RADIUS_IN_METERS * a.sqrt().asin()
}

/// Meters per unit for `m`, `km`, `mi` and `ft`.
pub fn unit_to_meters(unit: &str) -> Option<f64> {
    match unit.to_ascii_lowercase().as_str() {
        "m" => Some(1.0),
        "km" => Some(1000.0),
        "mi" => Some(1609.34),
        "ft" => Some(0.3048),
        _ => None,
    }
}
