//! Redis Serialization Protocol (RESP2) values and framing.
//!
//! Requests arrive as arrays of bulk strings (or as inline commands typed by hand),
//! replies are any of the five RESP2 kinds. Decoding is incremental: a partial
//! frame yields `Ok(None)` so the caller can wait for more bytes, while a frame
//! that can never become valid yields a [`RespError`].

use thiserror::Error;

/// Largest bulk string or array length accepted from a peer.
pub const MAX_BULK_LENGTH: usize = 512 * 1024 * 1024;

/// Deepest array nesting accepted from a peer. Requests are flat and replies nest
/// a few levels at most.
pub const MAX_NESTING_DEPTH: usize = 32;

#[derive(Error, Debug, PartialEq)]
pub enum RespError {
    #[error("invalid type marker {0:#04x}")]
    InvalidTypeMarker(u8),
    #[error("invalid length header")]
    InvalidLength,
    #[error("invalid integer")]
    InvalidInteger,
    #[error("invalid UTF-8 in frame")]
    InvalidUtf8 { frame_len: usize },
    #[error("bulk string is not terminated by CRLF")]
    MissingTerminator,
    #[error("frame length exceeds limit")]
    TooLarge,
    #[error("too many nested arrays")]
    TooDeep,
}

impl RespError {
    pub fn as_string(&self) -> String {
        RespValue::Error(format!("ERR Protocol error: {}", self)).encode()
    }

    /// Bytes to drop to step over a well-framed frame that still cannot be used.
    /// `None` means the stream is out of sync for good.
    pub fn skippable_len(&self) -> Option<usize> {
        match self {
            RespError::InvalidUtf8 { frame_len } => Some(*frame_len),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RespValue {
    SimpleString(String),
    Error(String),
    Integer(i64),
    BulkString(String),
    /// `$-1\r\n`
    Null,
    Array(Vec<RespValue>),
    /// `*-1\r\n`
    NullArray,
}

impl RespValue {
    pub fn encode(&self) -> String {
        let mut out = String::new();
        self.encode_into(&mut out);
        out
    }

    fn encode_into(&self, out: &mut String) {
        match self {
            RespValue::SimpleString(s) => {
                out.push('+');
                out.push_str(s);
                out.push_str("\r\n");
            }
            RespValue::Error(s) => {
                out.push('-');
                out.push_str(s);
                out.push_str("\r\n");
            }
            RespValue::Integer(i) => {
                out.push(':');
                out.push_str(&i.to_string());
                out.push_str("\r\n");
            }
            RespValue::BulkString(s) => {
                out.push('$');
                out.push_str(&s.len().to_string());
                out.push_str("\r\n");
                out.push_str(s);
                out.push_str("\r\n");
            }
            RespValue::Null => out.push_str("$-1\r\n"),
            RespValue::Array(elements) => {
                out.push('*');
                out.push_str(&elements.len().to_string());
                out.push_str("\r\n");
                for element in elements {
                    element.encode_into(out);
                }
            }
            RespValue::NullArray => out.push_str("*-1\r\n"),
        }
    }

    /// Number of bytes this value occupies on the wire.
    pub fn encoded_len(&self) -> usize {
        self.encode().len()
    }

    pub fn ok() -> Self {
        RespValue::SimpleString("OK".to_string())
    }

    pub fn bulk(s: impl Into<String>) -> Self {
        RespValue::BulkString(s.into())
    }

    pub fn array_of_bulk_strings<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RespValue::Array(items.into_iter().map(|s| RespValue::BulkString(s.into())).collect())
    }

    /// Builds a request array such as `["REPLCONF", "GETACK", "*"]`.
    pub fn command(parts: &[&str]) -> Self {
        Self::array_of_bulk_strings(parts.iter().copied())
    }

    /// Decodes one frame from the front of `buffer`.
    ///
    /// Returns the value and the number of bytes it consumed, or `None` when the
    /// buffer does not yet hold a complete frame.
    pub fn decode(buffer: &[u8]) -> Result<Option<(RespValue, usize)>, RespError> {
        let Some(&marker) = buffer.first() else {
            return Ok(None);
        };

        let mut decoder = FrameDecoder::new(buffer);
        let decoded = match marker {
            b'+' | b'-' | b':' | b'$' | b'*' => decoder.decode_at(0, 0)?,
            _ => decoder.decode_inline(),
        };

        decoder.finish(decoded)
    }
}

fn find_crlf(buffer: &[u8], from: usize) -> Option<usize> {
    buffer
        .get(from..)?
        .windows(2)
        .position(|w| w == b"\r\n")
        .map(|p| p + from)
}

fn parse_number<T: std::str::FromStr>(line: &[u8], error: RespError) -> Result<T, RespError> {
    std::str::from_utf8(line)
        .ok()
        .and_then(|s| s.parse::<T>().ok())
        .ok_or(error)
}

fn parse_length(line: &[u8]) -> Result<Option<usize>, RespError> {
    if line == b"-1" {
        return Ok(None);
    }

    let length = parse_number::<usize>(line, RespError::InvalidLength)?;

    if length > MAX_BULK_LENGTH {
        return Err(RespError::TooLarge);
    }

    Ok(Some(length))
}

/// Walks one frame. Text that is not UTF-8 is noted rather than treated as broken
/// framing, so the caller can step over the whole frame.
struct FrameDecoder<'a> {
    buffer: &'a [u8],
    invalid_text: bool,
}

impl<'a> FrameDecoder<'a> {
    fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            invalid_text: false,
        }
    }

    /// Finishes a decode, turning a complete frame with bad text into an error that
    /// carries the frame's length.
    fn finish(
        self,
        decoded: Option<(RespValue, usize)>,
    ) -> Result<Option<(RespValue, usize)>, RespError> {
        match decoded {
            Some((_, frame_len)) if self.invalid_text => Err(RespError::InvalidUtf8 { frame_len }),
            decoded => Ok(decoded),
        }
    }

    fn text(&mut self, bytes: &[u8]) -> String {
        match std::str::from_utf8(bytes) {
            Ok(text) => text.to_string(),
            Err(_) => {
                self.invalid_text = true;
                String::new()
            }
        }
    }

    fn line_at(&self, start: usize) -> Option<(&'a [u8], usize)> {
        let end = find_crlf(self.buffer, start)?;
        Some((&self.buffer[start..end], end + 2))
    }

    fn decode_at(
        &mut self,
        start: usize,
        depth: usize,
    ) -> Result<Option<(RespValue, usize)>, RespError> {
        let buffer = self.buffer;
        let Some(&marker) = buffer.get(start) else {
            return Ok(None);
        };

        let Some((line, after_line)) = self.line_at(start + 1) else {
            return Ok(None);
        };

        let value = match marker {
            b'+' => RespValue::SimpleString(self.text(line)),
            b'-' => RespValue::Error(self.text(line)),
            b':' => RespValue::Integer(parse_number(line, RespError::InvalidInteger)?),
            b'$' => {
                let Some(length) = parse_length(line)? else {
                    return Ok(Some((RespValue::Null, after_line - start)));
                };

                let end = after_line + length;
                if buffer.len() < end + 2 {
                    return Ok(None);
                }

                if &buffer[end..end + 2] != b"\r\n" {
                    return Err(RespError::MissingTerminator);
                }

                let content = self.text(&buffer[after_line..end]);

                return Ok(Some((RespValue::BulkString(content), end + 2 - start)));
            }
            b'*' => {
                let Some(count) = parse_length(line)? else {
                    return Ok(Some((RespValue::NullArray, after_line - start)));
                };

                if depth >= MAX_NESTING_DEPTH {
                    return Err(RespError::TooDeep);
                }

                let mut elements = Vec::with_capacity(count.min(1024));
                let mut cursor = after_line;

                for _ in 0..count {
                    let Some((element, consumed)) = self.decode_at(cursor, depth + 1)? else {
                        return Ok(None);
                    };
                    elements.push(element);
                    cursor += consumed;
                }

                return Ok(Some((RespValue::Array(elements), cursor - start)));
            }
            other => return Err(RespError::InvalidTypeMarker(other)),
        };

        Ok(Some((value, after_line - start)))
    }

    fn decode_inline(&mut self) -> Option<(RespValue, usize)> {
        let buffer = self.buffer;
        let end = buffer.iter().position(|&b| b == b'\n')?;

        let line = self.text(&buffer[..end]);
        let parts = line.trim_end_matches('\r').split_whitespace();

        Some((RespValue::array_of_bulk_strings(parts), end + 1))
    }
}
