//! Buffered frame reading from a byte stream.
//!
//! A [`FrameReader`] keeps the unconsumed tail of the socket in a `BytesMut`, so a read
//! that delivers one and a half commands yields the first one now and completes the
//! second one on the next read.

use bytes::{Buf, BytesMut};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::resp::{RespError, RespValue};

#[derive(Error, Debug)]
pub enum CommandReadError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("connection closed")]
    ConnectionClosed,
    #[error("RESP parse error: {0}")]
    RespParseError(#[from] RespError),
    /// A complete frame was dropped from the buffer. Reading can carry on.
    #[error("skipped unreadable frame: {error}")]
    SkippedFrame { error: RespError, length: usize },
    #[error("invalid snapshot header")]
    InvalidSnapshotHeader,
}

pub struct FrameReader<R> {
    reader: R,
    buffer: BytesMut,
}

impl<R> FrameReader<R>
where
    R: AsyncRead + Unpin,
{
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: BytesMut::with_capacity(4096),
        }
    }

    /// Reads more bytes from the stream into the buffer. Returns `0` at end of stream.
    pub async fn fill(&mut self) -> std::io::Result<usize> {
        self.reader.read_buf(&mut self.buffer).await
    }

    /// Returns the next complete frame and its size on the wire.
    ///
    /// # Returns
    ///
    /// * `Ok(Some((frame, length)))` - A frame was decoded from the buffer
    /// * `Ok(None)` - The peer closed the connection between frames
    /// * `Err(CommandReadError::ConnectionClosed)` - The peer closed mid-frame
    /// * `Err(CommandReadError::SkippedFrame)` - A well-framed but unusable frame was dropped
    /// * `Err(CommandReadError::RespParseError)` - The buffered bytes can never form a frame
    pub async fn read_frame(&mut self) -> Result<Option<(RespValue, usize)>, CommandReadError> {
        loop {
            if let Some((frame, length)) = self.try_decode()? {
                return Ok(Some((frame, length)));
            }

            if self.fill().await? == 0 {
                if self.buffer.iter().all(u8::is_ascii_whitespace) {
                    return Ok(None);
                }
                return Err(CommandReadError::ConnectionClosed);
            }
        }
    }

    /// Decodes a frame already sitting in the buffer, without touching the stream.
    pub fn try_decode(&mut self) -> Result<Option<(RespValue, usize)>, CommandReadError> {
        match RespValue::decode(&self.buffer) {
            Ok(Some((frame, length))) => {
                self.buffer.advance(length);
                Ok(Some((frame, length)))
            }
            Ok(None) => Ok(None),
            Err(error) => match error.skippable_len() {
                Some(length) => {
                    self.buffer.advance(length);
                    Err(CommandReadError::SkippedFrame { error, length })
                }
                None => Err(error.into()),
            },
        }
    }

    /// Reads the full resync payload: `$<len>\r\n` followed by exactly `len` raw bytes and
    /// no trailing CRLF.
    pub async fn read_snapshot(&mut self) -> Result<Vec<u8>, CommandReadError> {
        let header_end = loop {
            if let Some(position) = self.buffer.windows(2).position(|w| w == b"\r\n") {
                break position;
            }
            if self.fill().await? == 0 {
                return Err(CommandReadError::ConnectionClosed);
            }
        };

        if self.buffer.first() != Some(&b'$') {
            return Err(CommandReadError::InvalidSnapshotHeader);
        }

        let length = std::str::from_utf8(&self.buffer[1..header_end])
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .ok_or(CommandReadError::InvalidSnapshotHeader)?;
        self.buffer.advance(header_end + 2);

        while self.buffer.len() < length {
            if self.fill().await? == 0 {
                return Err(CommandReadError::ConnectionClosed);
            }
        }

        Ok(self.buffer.split_to(length).to_vec())
    }
}
