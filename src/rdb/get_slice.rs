use crate::rdb::RdbError;

pub fn get_buffer_slice(buffer: &[u8], cursor: usize, len: usize) -> Result<&[u8], RdbError> {
    cursor
        .checked_add(len)
        .and_then(|end| buffer.get(cursor..end))
        .ok_or(RdbError::UnexpectedEof(cursor))
}

pub fn get_array<const N: usize>(buffer: &[u8], cursor: usize) -> Result<[u8; N], RdbError> {
    get_buffer_slice(buffer, cursor, N)?
        .try_into()
        .map_err(|_| RdbError::UnexpectedEof(cursor))
}
