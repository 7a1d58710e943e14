//! Data-structure engines.
//!
//! Each engine operates on one keyspace entry at a time and takes no locks of its own;
//! callers hold the keyspace lock for the whole read-modify-write.

pub mod geo;
pub mod list;
pub mod stream;
pub mod zset;

/// Normalizes a `start..=stop` pair of possibly negative indices against a sequence of
/// `len` elements.
///
/// Negative indices count from the end. `start` is clamped to 0 and `stop` to `len - 1`.
/// Returns `None` when the normalized range selects nothing.
pub fn normalize_range(len: usize, start: i64, stop: i64) -> Option<(usize, usize)> {
    if len == 0 {
        return None;
    }

    let len = len as i64;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };

    if start > stop || start >= len {
        return None;
    }

    Some((start as usize, stop as usize))
}
