use crate::rdb::{
    RdbError,
    get_slice::{get_array, get_buffer_slice},
};

#[derive(Debug, PartialEq)]
enum ValueEncoding {
    Length(usize),
    Int8,
    Int16,
    Int32,
    LzfCompressedString,
}

fn parse_length_encoding(bytes: &[u8], cursor: usize) -> Result<(ValueEncoding, usize), RdbError> {
    let mut temp_cursor = cursor;
    let [byte] = get_array::<1>(bytes, temp_cursor)?;
    temp_cursor += 1;

    // The top two bits select the encoding, the remaining six carry data.
    let value_encoding = match byte >> 6 {
        0b00 => ValueEncoding::Length((byte & 0b0011_1111) as usize),
        0b01 => {
            let [low] = get_array::<1>(bytes, temp_cursor)?;
            temp_cursor += 1;

            let high = ((byte & 0b0011_1111) as usize) << 8;
            ValueEncoding::Length(high | low as usize)
        }
        0b10 => match byte {
            0x80 => {
                let length = u32::from_be_bytes(get_array::<4>(bytes, temp_cursor)?);
                temp_cursor += 4;
                ValueEncoding::Length(length as usize)
            }
            0x81 => {
                let length = u64::from_be_bytes(get_array::<8>(bytes, temp_cursor)?);
                temp_cursor += 8;
                ValueEncoding::Length(length as usize)
            }
            other => return Err(RdbError::InvalidLengthEncoding(other)),
        },
        _ => match byte & 0b0011_1111 {
            0 => ValueEncoding::Int8,
            1 => ValueEncoding::Int16,
            2 => ValueEncoding::Int32,
            3 => ValueEncoding::LzfCompressedString,
            _ => return Err(RdbError::InvalidLengthEncoding(byte)),
        },
    };

    Ok((value_encoding, temp_cursor - cursor))
}

/// Reads a plain length (used by select-db, resize-db and collection sizes).
pub fn parse_length(bytes: &[u8], cursor: usize) -> Result<(usize, usize), RdbError> {
    match parse_length_encoding(bytes, cursor)? {
        (ValueEncoding::Length(length), read) => Ok((length, read)),
        _ => Err(RdbError::InvalidLengthEncoding(bytes[cursor])),
    }
}

/// Reads a string, expanding integer and LZF encodings into their byte form.
pub fn parse_bytes(bytes: &[u8], cursor: usize) -> Result<(Vec<u8>, usize), RdbError> {
    let mut temp_cursor = cursor;
    let (value_encoding, length_read) = parse_length_encoding(bytes, temp_cursor)?;
    temp_cursor += length_read;

    let value = match value_encoding {
        ValueEncoding::Length(length) => {
            let value = get_buffer_slice(bytes, temp_cursor, length)?.to_vec();
            temp_cursor += length;
            value
        }
        ValueEncoding::Int8 => {
            let value = i8::from_le_bytes(get_array::<1>(bytes, temp_cursor)?);
            temp_cursor += 1;
            value.to_string().into_bytes()
        }
        ValueEncoding::Int16 => {
            let value = i16::from_le_bytes(get_array::<2>(bytes, temp_cursor)?);
            temp_cursor += 2;
            value.to_string().into_bytes()
        }
        ValueEncoding::Int32 => {
            let value = i32::from_le_bytes(get_array::<4>(bytes, temp_cursor)?);
            temp_cursor += 4;
            value.to_string().into_bytes()
        }
        ValueEncoding::LzfCompressedString => {
            let (compressed_length, read) = parse_length(bytes, temp_cursor)?;
            temp_cursor += read;
            let (length, read) = parse_length(bytes, temp_cursor)?;
            temp_cursor += read;

            let compressed = get_buffer_slice(bytes, temp_cursor, compressed_length)?;
            temp_cursor += compressed_length;
            lzf_decompress(compressed, length)?
        }
    };

    Ok((value, temp_cursor - cursor))
}

pub fn parse_string(bytes: &[u8], cursor: usize) -> Result<(String, usize), RdbError> {
    let (value, read) = parse_bytes(bytes, cursor)?;
    Ok((String::from_utf8_lossy(&value).into_owned(), read))
}

fn lzf_decompress(input: &[u8], expected_length: usize) -> Result<Vec<u8>, RdbError> {
    let mut output = Vec::with_capacity(expected_length);
    let mut position = 0;

    while position < input.len() {
        let control = input[position] as usize;
        position += 1;

        if control < 32 {
            let run = control + 1;
            let literal = input
                .get(position..position + run)
                .ok_or(RdbError::InvalidLzf)?;
            output.extend_from_slice(literal);
            position += run;
            continue;
        }

        let mut length = control >> 5;
        if length == 7 {
            length += *input.get(position).ok_or(RdbError::InvalidLzf)? as usize;
            position += 1;
        }

        let low = *input.get(position).ok_or(RdbError::InvalidLzf)? as usize;
        position += 1;

        let back = ((control & 0x1f) << 8) + low + 1;
        let start = output.len().checked_sub(back).ok_or(RdbError::InvalidLzf)?;

        // Back references may overlap the bytes they produce.
        for offset in 0..length + 2 {
            let byte = output[start + offset];
            output.push(byte);
        }
    }

    if output.len() != expected_length {
        return Err(RdbError::InvalidLzf);
    }

    Ok(output)
}

pub fn encode_length(length: usize, out: &mut Vec<u8>) {
    if length < 1 << 6 {
        out.push(length as u8);
    } else if length < 1 << 14 {
        out.push(0b0100_0000 | (length >> 8) as u8);
        out.push(length as u8);
    } else if length <= u32::MAX as usize {
        out.push(0x80);
        out.extend_from_slice(&(length as u32).to_be_bytes());
    } else {
        out.push(0x81);
        out.extend_from_slice(&(length as u64).to_be_bytes());
    }
}

pub fn encode_string(value: &str, out: &mut Vec<u8>) {
    encode_length(value.len(), out);
    out.extend_from_slice(value.as_bytes());
}
