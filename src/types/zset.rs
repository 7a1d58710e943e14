//! Sorted set engine.
//!
//! Two indices over the same facts: `scores` answers member lookups, `ordered` keeps
//! `(score, member)` pairs sorted by score and then by member bytes. Every mutation
//! updates both before returning, and callers hold the keyspace lock throughout, so no
//! reader can observe one index without the other.

use std::collections::{BTreeSet, HashMap};

use ordered_float::OrderedFloat;

use super::normalize_range;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SortedSet {
    scores: HashMap<String, f64>,
    ordered: BTreeSet<(OrderedFloat<f64>, String)>,
}

impl SortedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or rescores `member`.
    ///
    /// # Returns
    ///
    /// * `true` - The member was not present before
    /// * `false` - The member existed, its score was updated or left unchanged
    pub fn add(&mut self, score: f64, member: &str) -> bool {
        match self.scores.get_mut(member) {
            Some(current) if *current == score => false,
            Some(current) => {
                self.ordered
                    .remove(&(OrderedFloat(*current), member.to_string()));
                self.ordered.insert((OrderedFloat(score), member.to_string()));
                *current = score;
                false
            }
            None => {
                self.scores.insert(member.to_string(), score);
                self.ordered.insert((OrderedFloat(score), member.to_string()));
                true
            }
        }
    }

    pub fn remove(&mut self, member: &str) -> bool {
        let Some(score) = self.scores.remove(member) else {
            return false;
        };

        self.ordered.remove(&(OrderedFloat(score), member.to_string()));
        true
    }

    pub fn score(&self, member: &str) -> Option<f64> {
        self.scores.get(member).copied()
    }

    /// Zero-based position of `member` in score order.
    pub fn rank(&self, member: &str) -> Option<usize> {
        let score = self.scores.get(member)?;
        let target = (OrderedFloat(*score), member.to_string());

        Some(self.ordered.range(..&target).count())
    }

    pub fn range(&self, start: i64, stop: i64) -> Vec<(&str, f64)> {
        let Some((start, stop)) = normalize_range(self.ordered.len(), start, stop) else {
            return Vec::new();
        };

        self.ordered
            .iter()
            .skip(start)
            .take(stop - start + 1)
            .map(|(score, member)| (member.as_str(), score.0))
            .collect()
    }

    /// Members in score order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.ordered
            .iter()
            .map(|(score, member)| (member.as_str(), score.0))
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

/// Formats a score so that parsing the text back yields the identical `f64`.
///
/// Scores print in plain decimal while their exponent is in `-4..17`, the range where
/// `%.17g` does too. Outside it they use 17 significant digits in exponent form, as in
/// `1.0000000000000001e+300`.
pub fn format_score(score: f64) -> String {
    if score.is_infinite() {
        return if score > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let scientific = format!("{:.16e}", score);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return score.to_string();
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return score.to_string();
    };

    if (-4..17).contains(&exponent) {
        return score.to_string();
    }

    let mantissa = mantissa.trim_end_matches('0').trim_end_matches('.');
    let sign = if exponent < 0 { '-' } else { '+' };

    format!("{}e{}{:02}", mantissa, sign, exponent.abs())
}

/// Parses a client supplied score, accepting `inf`/`+inf`/`-inf` and rejecting NaN.
pub fn parse_score(input: &str) -> Option<f64> {
    let score = match input.to_ascii_lowercase().as_str() {
        "inf" | "+inf" => f64::INFINITY,
        "-inf" => f64::NEG_INFINITY,
        other => other.parse::<f64>().ok()?,
    };

    (!score.is_nan()).then_some(score)
}
