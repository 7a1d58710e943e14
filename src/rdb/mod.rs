//! Snapshot (RDB) loading and encoding.

mod encoding;
mod get_slice;
mod opcode;
mod rdb_file_operations;
mod rdb_parser;
mod writer;

use thiserror::Error;

pub use rdb_file_operations::load_rdb_file;
pub use rdb_parser::RdbParser;
pub use writer::encode_snapshot;

#[derive(Error, Debug)]
pub enum RdbError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unexpected end of snapshot at byte {0}")]
    UnexpectedEof(usize),
    #[error("invalid magic string")]
    InvalidMagicString,
    #[error("unsupported snapshot version {0}")]
    UnsupportedVersion(String),
    #[error("invalid length encoding 0x{0:02X}")]
    InvalidLengthEncoding(u8),
    #[error("unsupported value type {0}")]
    UnsupportedValueType(u8),
    #[error("corrupt LZF compressed string")]
    InvalidLzf,
}
