use crate::rdb::{
    RdbError,
    encoding::{parse_bytes, parse_length, parse_string},
    get_slice::{get_array, get_buffer_slice},
};

const METADATA_OPCODE: u8 = 0xFA;
const RESIZE_DB_OPCODE: u8 = 0xFB;
const DATABASE_OPCODE: u8 = 0xFE;
const EXPIRATION_SECONDS_OPCODE: u8 = 0xFD;
const EXPIRATION_MILLISECONDS_OPCODE: u8 = 0xFC;
const END_OF_FILE_OPCODE: u8 = 0xFF;

pub const STRING_VALUE_TYPE: u8 = 0;
const LIST_VALUE_TYPE: u8 = 1;
const SET_VALUE_TYPE: u8 = 2;
const SORTED_SET_VALUE_TYPE: u8 = 3;
const HASH_VALUE_TYPE: u8 = 4;
const SORTED_SET_2_VALUE_TYPE: u8 = 5;
const ZIPMAP_VALUE_TYPE: u8 = 9;
const ZIPLIST_VALUE_TYPE: u8 = 10;
const INTSET_VALUE_TYPE: u8 = 11;
const SORTED_SET_ZIPLIST_VALUE_TYPE: u8 = 12;
const HASH_ZIPLIST_VALUE_TYPE: u8 = 13;
const LIST_QUICKLIST_VALUE_TYPE: u8 = 14;
const HASH_LISTPACK_VALUE_TYPE: u8 = 16;
const SORTED_SET_LISTPACK_VALUE_TYPE: u8 = 17;
const LIST_QUICKLIST_2_VALUE_TYPE: u8 = 18;
const SET_LISTPACK_VALUE_TYPE: u8 = 20;

#[derive(Debug, PartialEq)]
pub enum OpCodeResponse {
    Metadata {
        key: String,
        value: String,
    },
    ResizeDb {
        db_hash_table_size: usize,
        expiry_hash_table_size: usize,
    },
    Database {
        database_number: usize,
    },
    /// A key of any type. `value` is only filled in for plain strings.
    Entry {
        key: String,
        value: Option<String>,
        expires_at: u64,
    },
    EndOfFile,
}

pub fn parse_opcode(bytes: &[u8], cursor: usize) -> Result<(OpCodeResponse, usize), RdbError> {
    let mut temp_cursor = cursor;
    let [opcode] = get_array::<1>(bytes, temp_cursor)?;
    temp_cursor += 1;

    let response = match opcode {
        METADATA_OPCODE => {
            let (key, read) = parse_string(bytes, temp_cursor)?;
            temp_cursor += read;
            let (value, read) = parse_string(bytes, temp_cursor)?;
            temp_cursor += read;

            OpCodeResponse::Metadata { key, value }
        }
        RESIZE_DB_OPCODE => {
            let (db_hash_table_size, read) = parse_length(bytes, temp_cursor)?;
            temp_cursor += read;
            let (expiry_hash_table_size, read) = parse_length(bytes, temp_cursor)?;
            temp_cursor += read;

            OpCodeResponse::ResizeDb {
                db_hash_table_size,
                expiry_hash_table_size,
            }
        }
        DATABASE_OPCODE => {
            let (database_number, read) = parse_length(bytes, temp_cursor)?;
            temp_cursor += read;

            OpCodeResponse::Database { database_number }
        }
        EXPIRATION_SECONDS_OPCODE => {
            let seconds = u32::from_le_bytes(get_array::<4>(bytes, temp_cursor)?);
            temp_cursor += 4;

            let (response, read) = parse_entry(bytes, temp_cursor, u64::from(seconds) * 1000)?;
            temp_cursor += read;
            response
        }
        EXPIRATION_MILLISECONDS_OPCODE => {
            let milliseconds = u64::from_le_bytes(get_array::<8>(bytes, temp_cursor)?);
            temp_cursor += 8;

            let (response, read) = parse_entry(bytes, temp_cursor, milliseconds)?;
            temp_cursor += read;
            response
        }
        END_OF_FILE_OPCODE => OpCodeResponse::EndOfFile,
        _ => {
            let (response, read) = parse_entry(bytes, cursor, 0)?;
            temp_cursor = cursor + read;
            response
        }
    };

    Ok((response, temp_cursor - cursor))
}

/// Parses `<value-type> <key> <value>` starting at the value type byte.
fn parse_entry(
    bytes: &[u8],
    cursor: usize,
    expires_at: u64,
) -> Result<(OpCodeResponse, usize), RdbError> {
    let mut temp_cursor = cursor;
    let [value_type] = get_array::<1>(bytes, temp_cursor)?;
    temp_cursor += 1;

    let (key, read) = parse_string(bytes, temp_cursor)?;
    temp_cursor += read;

    let value = if value_type == STRING_VALUE_TYPE {
        let (value, read) = parse_string(bytes, temp_cursor)?;
        temp_cursor += read;
        Some(value)
    } else {
        temp_cursor += skip_value(bytes, temp_cursor, value_type)?;
        None
    };

    Ok((
        OpCodeResponse::Entry {
            key,
            value,
            expires_at,
        },
        temp_cursor - cursor,
    ))
}

/// Walks over the payload of a non-string value without materializing it.
fn skip_value(bytes: &[u8], cursor: usize, value_type: u8) -> Result<usize, RdbError> {
    let mut temp_cursor = cursor;

    let skip_strings = |temp_cursor: &mut usize, count: usize| -> Result<(), RdbError> {
        for _ in 0..count {
            let (_, read) = parse_bytes(bytes, *temp_cursor)?;
            *temp_cursor += read;
        }
        Ok(())
    };

    match value_type {
        LIST_VALUE_TYPE | SET_VALUE_TYPE | LIST_QUICKLIST_VALUE_TYPE => {
            let (count, read) = parse_length(bytes, temp_cursor)?;
            temp_cursor += read;
            skip_strings(&mut temp_cursor, count)?;
        }
        HASH_VALUE_TYPE => {
            let (count, read) = parse_length(bytes, temp_cursor)?;
            temp_cursor += read;
            skip_strings(&mut temp_cursor, count.saturating_mul(2))?;
        }
        SORTED_SET_VALUE_TYPE => {
            let (count, read) = parse_length(bytes, temp_cursor)?;
            temp_cursor += read;
            for _ in 0..count {
                skip_strings(&mut temp_cursor, 1)?;
                // Scores are a one byte length followed by ASCII, 253..=255 are nan/inf/-inf.
                let [length] = get_array::<1>(bytes, temp_cursor)?;
                temp_cursor += 1;
                if length < 253 {
                    get_buffer_slice(bytes, temp_cursor, length as usize)?;
                    temp_cursor += length as usize;
                }
            }
        }
        SORTED_SET_2_VALUE_TYPE => {
            let (count, read) = parse_length(bytes, temp_cursor)?;
            temp_cursor += read;
            for _ in 0..count {
                skip_strings(&mut temp_cursor, 1)?;
                get_buffer_slice(bytes, temp_cursor, 8)?;
                temp_cursor += 8;
            }
        }
        ZIPMAP_VALUE_TYPE
        | ZIPLIST_VALUE_TYPE
        | INTSET_VALUE_TYPE
        | SORTED_SET_ZIPLIST_VALUE_TYPE
        | HASH_ZIPLIST_VALUE_TYPE
        | HASH_LISTPACK_VALUE_TYPE
        | SORTED_SET_LISTPACK_VALUE_TYPE
        | SET_LISTPACK_VALUE_TYPE => skip_strings(&mut temp_cursor, 1)?,
        LIST_QUICKLIST_2_VALUE_TYPE => {
            let (count, read) = parse_length(bytes, temp_cursor)?;
            temp_cursor += read;
            for _ in 0..count {
                let (_container, read) = parse_length(bytes, temp_cursor)?;
                temp_cursor += read;
                skip_strings(&mut temp_cursor, 1)?;
            }
        }
        other => return Err(RdbError::UnsupportedValueType(other)),
    }

    Ok(temp_cursor - cursor)
}

pub struct MagicStringResponse {
    pub number_of_read_bytes: usize,
    pub redis_version: String,
}

pub fn parse_magic_string(bytes: &[u8]) -> Result<MagicStringResponse, RdbError> {
    if get_buffer_slice(bytes, 0, 5)? != b"REDIS" {
        return Err(RdbError::InvalidMagicString);
    }

    let redis_version = String::from_utf8_lossy(get_buffer_slice(bytes, 5, 4)?).into_owned();

    match redis_version.parse::<u32>() {
        Ok(1..=12) => Ok(MagicStringResponse {
            number_of_read_bytes: 9,
            redis_version,
        }),
        _ => Err(RdbError::UnsupportedVersion(redis_version)),
    }
}
