use std::collections::HashMap;

use tracing::debug;

use crate::{
    key_value_store::{DataType, Value, now_ms},
    rdb::{
        RdbError,
        opcode::{OpCodeResponse, parse_magic_string, parse_opcode},
    },
};

#[derive(Debug, Default)]
pub struct RdbParser {
    cursor: usize,
    pub redis_version: Option<String>,
    pub metadata: HashMap<String, String>,
    pub db_number: Option<usize>,
    pub key_value_store: HashMap<String, Value>,
    /// Keys of types the keyspace does not load from snapshots.
    pub skipped_keys: usize,
}

impl RdbParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a complete snapshot. String keys that are already expired are dropped.
    pub fn parse(&mut self, buffer: &[u8]) -> Result<(), RdbError> {
        let magic_string_response = parse_magic_string(buffer)?;
        self.cursor = magic_string_response.number_of_read_bytes;
        self.redis_version = Some(magic_string_response.redis_version);

        let now = now_ms();

        while self.cursor < buffer.len() {
            let (result, read) = parse_opcode(buffer, self.cursor)?;
            self.cursor += read;

            match result {
                OpCodeResponse::Metadata { key, value } => {
                    self.metadata.insert(key, value);
                }
                OpCodeResponse::ResizeDb {
                    db_hash_table_size,
                    expiry_hash_table_size,
                } => {
                    debug!(db_hash_table_size, expiry_hash_table_size, "snapshot resize hint");
                    self.key_value_store.reserve(db_hash_table_size);
                }
                OpCodeResponse::Database { database_number } => {
                    self.db_number = Some(database_number);
                }
                OpCodeResponse::Entry {
                    key,
                    value: Some(value),
                    expires_at,
                } => {
                    let value = Value::with_expiry(DataType::String(value), expires_at);

                    if value.is_expired(now) {
                        continue;
                    }

                    self.key_value_store.insert(key, value);
                }
                OpCodeResponse::Entry { key, value: None, .. } => {
                    debug!(key = %key, "skipping non-string snapshot value");
                    self.skipped_keys += 1;
                }
                OpCodeResponse::EndOfFile => break,
            }
        }

        Ok(())
    }
}
