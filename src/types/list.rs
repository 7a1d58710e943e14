//! List engine over a `VecDeque`.
//!
//! An empty list is never left in the keyspace: after [`pop_front`] the caller runs
//! `KeyValueStore::remove_if_empty`.

use std::collections::VecDeque;

use super::normalize_range;

/// Pushes every value onto the back, in argument order. Returns the new length.
pub fn push_back(list: &mut VecDeque<String>, values: &[String]) -> usize {
    list.extend(values.iter().cloned());
    list.len()
}

/// Pushes every value onto the front one at a time, so `a b c` ends up as `c b a`.
pub fn push_front(list: &mut VecDeque<String>, values: &[String]) -> usize {
    for value in values {
        list.push_front(value.clone());
    }
    list.len()
}

/// Removes up to `count` elements from the front.
pub fn pop_front(list: &mut VecDeque<String>, count: usize) -> Vec<String> {
    let count = count.min(list.len());
    list.drain(..count).collect()
}

pub fn range(list: &VecDeque<String>, start: i64, stop: i64) -> Vec<String> {
    let Some((start, stop)) = normalize_range(list.len(), start, stop) else {
        return Vec::new();
    };

    list.range(start..=stop).cloned().collect()
}
