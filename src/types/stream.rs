//! Append-only stream engine.

use std::{collections::BTreeMap, fmt, ops::Bound};

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum StreamError {
    #[error("ERR Invalid stream ID specified as stream command argument")]
    InvalidId,
    #[error("ERR The ID specified in XADD must be greater than 0-0")]
    ZeroId,
    #[error("ERR The ID specified in XADD is equal or smaller than the target stream top item")]
    NotGreaterThanTop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct StreamId {
    pub ms: u64,
    pub seq: u64,
}

impl StreamId {
    pub const MIN: StreamId = StreamId { ms: 0, seq: 0 };
    pub const MAX: StreamId = StreamId {
        ms: u64::MAX,
        seq: u64::MAX,
    };

    pub fn new(ms: u64, seq: u64) -> Self {
        Self { ms, seq }
    }

    /// Parses `ms-seq`, or a bare `ms` with `default_seq` filled in.
    pub fn parse(input: &str, default_seq: u64) -> Result<Self, StreamError> {
        let (ms, seq) = match input.split_once('-') {
            Some((ms, seq)) => (
                ms.parse::<u64>().map_err(|_| StreamError::InvalidId)?,
                seq.parse::<u64>().map_err(|_| StreamError::InvalidId)?,
            ),
            None => (
                input.parse::<u64>().map_err(|_| StreamError::InvalidId)?,
                default_seq,
            ),
        };

        Ok(Self { ms, seq })
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.ms, self.seq)
    }
}

/// How XADD wants its ID chosen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RequestedId {
    Explicit(StreamId),
    /// `<ms>-*`
    AutoSequence(u64),
    /// `*`
    Auto,
}

impl RequestedId {
    pub fn parse(input: &str) -> Result<Self, StreamError> {
        if input == "*" {
            return Ok(RequestedId::Auto);
        }

        if let Some(ms) = input.strip_suffix("-*") {
            let ms = ms.parse::<u64>().map_err(|_| StreamError::InvalidId)?;
            return Ok(RequestedId::AutoSequence(ms));
        }

        StreamId::parse(input, 0).map(RequestedId::Explicit)
    }
}

pub type StreamFields = Vec<(String, String)>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stream {
    entries: BTreeMap<StreamId, StreamFields>,
    last_id: StreamId,
}

impl Stream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_id(&self) -> StreamId {
        self.last_id
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Picks the concrete ID `requested` resolves to, without appending.
    pub fn resolve_id(&self, requested: RequestedId, now_ms: u64) -> Result<StreamId, StreamError> {
        let last = self.last_id;

        let id = match requested {
            RequestedId::Explicit(id) => {
                if id == StreamId::MIN {
                    return Err(StreamError::ZeroId);
                }
                id
            }
            RequestedId::AutoSequence(ms) => {
                if ms < last.ms {
                    return Err(StreamError::NotGreaterThanTop);
                }
                if ms == last.ms {
                    let seq = last
                        .seq
                        .checked_add(1)
                        .ok_or(StreamError::NotGreaterThanTop)?;
                    StreamId::new(ms, seq)
                } else {
                    StreamId::new(ms, 0)
                }
            }
            RequestedId::Auto => {
                let ms = now_ms.max(last.ms);
                if ms == last.ms {
                    match last.seq.checked_add(1) {
                        Some(seq) => StreamId::new(ms, seq),
                        None => StreamId::new(
                            ms.checked_add(1).ok_or(StreamError::NotGreaterThanTop)?,
                            0,
                        ),
                    }
                } else {
                    StreamId::new(ms, 0)
                }
            }
        };

        if id <= last {
            return Err(StreamError::NotGreaterThanTop);
        }

        Ok(id)
    }

    /// Appends an entry. A rejected ID leaves the stream untouched.
    pub fn append(
        &mut self,
        requested: RequestedId,
        fields: StreamFields,
        now_ms: u64,
    ) -> Result<StreamId, StreamError> {
        let id = self.resolve_id(requested, now_ms)?;

        self.entries.insert(id, fields);
        self.last_id = id;

        Ok(id)
    }

    /// Entries with `start <= id <= end`, oldest first.
    pub fn range(
        &self,
        start: StreamId,
        end: StreamId,
        count: Option<usize>,
    ) -> Vec<(StreamId, &StreamFields)> {
        if start > end {
            return Vec::new();
        }

        self.entries
            .range(start..=end)
            .take(count.unwrap_or(usize::MAX))
            .map(|(id, fields)| (*id, fields))
            .collect()
    }

    /// Entries with an ID strictly greater than `after`.
    pub fn read_after(&self, after: StreamId, count: Option<usize>) -> Vec<(StreamId, &StreamFields)> {
        self.entries
            .range((Bound::Excluded(after), Bound::Unbounded))
            .take(count.unwrap_or(usize::MAX))
            .map(|(id, fields)| (*id, fields))
            .collect()
    }
}

/// Parses an XRANGE bound: `-`, `+`, `ms` or `ms-seq`.
pub fn parse_range_bound(input: &str, is_start: bool) -> Result<StreamId, StreamError> {
    match input {
        "-" => Ok(StreamId::MIN),
        "+" => Ok(StreamId::MAX),
        _ if is_start => StreamId::parse(input, 0),
        _ => StreamId::parse(input, u64::MAX),
    }
}
