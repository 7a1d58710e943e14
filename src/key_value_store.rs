//! The typed keyspace.
//!
//! Every key owns exactly one [`Value`]. Expiry is lazy: every read or write path
//! goes through [`KeyValueStore::get`] / [`KeyValueStore::get_mut`] and friends,
//! which delete an expired entry before reporting the key as absent. Nothing
//! sweeps the map in the background.

use std::collections::{HashMap, VecDeque};

use regex::Regex;
use thiserror::Error;

use crate::types::{stream::Stream, zset::SortedSet};

/// Milliseconds since the Unix epoch.
pub fn now_ms() -> u64 {
    jiff::Timestamp::now().as_millisecond().max(0) as u64
}

#[derive(Error, Debug, PartialEq)]
pub enum KeyspaceError {
    #[error("WRONGTYPE Operation against a key holding the wrong kind of value")]
    WrongType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKind {
    String,
    List,
    ZSet,
    Stream,
}

impl DataKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataKind::String => "string",
            DataKind::List => "list",
            DataKind::ZSet => "zset",
            DataKind::Stream => "stream",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DataType {
    String(String),
    List(VecDeque<String>),
    ZSet(SortedSet),
    Stream(Stream),
}

impl DataType {
    pub fn empty(kind: DataKind) -> Self {
        match kind {
            DataKind::String => DataType::String(String::new()),
            DataKind::List => DataType::List(VecDeque::new()),
            DataKind::ZSet => DataType::ZSet(SortedSet::new()),
            DataKind::Stream => DataType::Stream(Stream::new()),
        }
    }

    pub fn kind(&self) -> DataKind {
        match self {
            DataType::String(_) => DataKind::String,
            DataType::List(_) => DataKind::List,
            DataType::ZSet(_) => DataKind::ZSet,
            DataType::Stream(_) => DataKind::Stream,
        }
    }

    /// Lists and sorted sets do not survive being emptied. Streams and strings do.
    fn is_logically_empty(&self) -> bool {
        match self {
            DataType::List(list) => list.is_empty(),
            DataType::ZSet(zset) => zset.is_empty(),
            DataType::String(_) | DataType::Stream(_) => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    pub data: DataType,
    /// Absolute deadline in epoch milliseconds, `0` means never.
    pub expires_at: u64,
}

impl Value {
    pub fn new(data: DataType) -> Self {
        Self {
            data,
            expires_at: 0,
        }
    }

    pub fn with_expiry(data: DataType, expires_at: u64) -> Self {
        Self { data, expires_at }
    }

    pub fn is_expired(&self, now: u64) -> bool {
        self.expires_at != 0 && now > self.expires_at
    }
}

/// Generates typed mutable accessors so each engine only ever sees its own payload.
macro_rules! typed_accessor {
    ($name:ident, $or_create:ident, $variant:ident, $kind:expr, $ty:ty) => {
        pub fn $name(&mut self, key: &str) -> Result<Option<&mut $ty>, KeyspaceError> {
            match self.get_mut(key) {
                None => Ok(None),
                Some(Value {
                    data: DataType::$variant(inner),
                    ..
                }) => Ok(Some(inner)),
                Some(_) => Err(KeyspaceError::WrongType),
            }
        }

        pub fn $or_create(&mut self, key: &str) -> Result<&mut $ty, KeyspaceError> {
            match &mut self.get_or_create(key, $kind)?.data {
                DataType::$variant(inner) => Ok(inner),
                _ => Err(KeyspaceError::WrongType),
            }
        }
    };
}

#[derive(Debug, Default)]
pub struct KeyValueStore {
    entries: HashMap<String, Value>,
}

impl KeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn evict_if_expired(&mut self, key: &str) {
        let now = now_ms();

        if self
            .entries
            .get(key)
            .is_some_and(|value| value.is_expired(now))
        {
            self.entries.remove(key);
        }
    }

    pub fn get(&mut self, key: &str) -> Option<&Value> {
        self.evict_if_expired(key);
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.evict_if_expired(key);
        self.entries.get_mut(key)
    }

    /// Returns the live entry for `key`, creating an empty one of `kind` if absent.
    pub fn get_or_create(&mut self, key: &str, kind: DataKind) -> Result<&mut Value, KeyspaceError> {
        self.evict_if_expired(key);

        let value = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| Value::new(DataType::empty(kind)));

        if value.data.kind() != kind {
            return Err(KeyspaceError::WrongType);
        }

        Ok(value)
    }

    pub fn insert(&mut self, key: String, value: Value) {
        self.entries.insert(key, value);
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    /// Drops `key` if it holds a list or sorted set with no elements left.
    pub fn remove_if_empty(&mut self, key: &str) -> bool {
        if self
            .entries
            .get(key)
            .is_some_and(|value| value.data.is_logically_empty())
        {
            self.entries.remove(key);
            return true;
        }

        false
    }

    pub fn kind_of(&mut self, key: &str) -> Option<DataKind> {
        self.get(key).map(|value| value.data.kind())
    }

    /// Live keys matching a glob pattern. Expired keys found on the way are deleted.
    pub fn keys(&mut self, pattern: &str) -> Vec<String> {
        let now = now_ms();
        self.entries.retain(|_, value| !value.is_expired(now));

        let Some(matcher) = glob_to_regex(pattern) else {
            return Vec::new();
        };

        let mut keys = self
            .entries
            .keys()
            .filter(|key| matcher.is_match(key))
            .cloned()
            .collect::<Vec<String>>();
        keys.sort();
        keys
    }

    /// Live string entries, used to build the replication snapshot.
    pub fn string_entries(&self) -> Vec<(&str, &str, u64)> {
        let now = now_ms();

        self.entries
            .iter()
            .filter(|(_, value)| !value.is_expired(now))
            .filter_map(|(key, value)| match &value.data {
                DataType::String(s) => Some((key.as_str(), s.as_str(), value.expires_at)),
                _ => None,
            })
            .collect()
    }

    pub fn extend(&mut self, entries: impl IntoIterator<Item = (String, Value)>) {
        self.entries.extend(entries);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    typed_accessor!(list_mut, list_or_create, List, DataKind::List, VecDeque<String>);
    typed_accessor!(zset_mut, zset_or_create, ZSet, DataKind::ZSet, SortedSet);
    typed_accessor!(stream_mut, stream_or_create, Stream, DataKind::Stream, Stream);
}

/// Translates a Redis glob (`*`, `?`, `[...]`, `\x`) into an anchored regex.
pub fn glob_to_regex(pattern: &str) -> Option<Regex> {
    // `(?s)` lets `*` and `?` match newlines inside keys.
    let mut regex = String::from("(?s)^");
    let mut chars = pattern.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '*' => regex.push_str(".*"),
            '?' => regex.push('.'),
            '[' => {
                regex.push('[');
                if chars.peek() == Some(&'^') {
                    chars.next();
                    regex.push('^');
                }
                for class_char in chars.by_ref() {
                    if class_char == ']' {
                        break;
                    }
                    if class_char == '\\' || class_char == '[' {
                        regex.push('\\');
                    }
                    regex.push(class_char);
                }
                regex.push(']');
            }
            '\\' => {
                if let Some(escaped) = chars.next() {
                    regex.push_str(&regex::escape(&escaped.to_string()));
                }
            }
            other => regex.push_str(&regex::escape(&other.to_string())),
        }
    }

    regex.push('$');
    Regex::new(&regex).ok()
}
