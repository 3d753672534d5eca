//! Reply parser
//!
//! Reads exactly one reply from a buffered byte source.
//!
//! ## Reply Format
//! ```text
//! +<line>\r\n                  status
//! -<line>\r\n                  error
//! :<i64>\r\n                   integer
//! $<len>\r\n<len bytes>\r\n    bulk string ($-1\r\n = nil)
//! *<count>\r\n<count replies>  array (*-1\r\n = nil)
//! ```
//!
//! Bulk payloads are read by length and never scanned for CR/LF.

use std::io::{self, BufRead, Read};

use bytes::Bytes;

use super::{Reply, ReplyTag};
use crate::error::{Error, Result};

/// Default maximum nesting depth for arrays
///
/// Transaction and pipeline replies nest one level of arrays; 32 leaves
/// plenty of room while keeping recursion far from the stack limit.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Default maximum bulk string and line length (512 MB, the server's own cap)
pub const DEFAULT_MAX_BULK_LEN: usize = 512 * 1024 * 1024;

/// Upper bound on array capacity reserved up front from a declared count
const MAX_PREALLOC: usize = 1024;

/// Limits applied while parsing a reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseLimits {
    /// Maximum number of nested arrays
    pub max_depth: usize,

    /// Maximum declared bulk length, also the cap on status/error lines
    pub max_bulk_len: usize,
}

impl Default for ParseLimits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_bulk_len: DEFAULT_MAX_BULK_LEN,
        }
    }
}

impl ParseLimits {
    /// Set the maximum nesting depth.
    pub const fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set the maximum bulk string length.
    pub const fn max_bulk_len(mut self, len: usize) -> Self {
        self.max_bulk_len = len;
        self
    }
}

/// Recursive-descent parser for server replies
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplyParser {
    limits: ParseLimits,
}

impl ReplyParser {
    pub fn new(limits: ParseLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> ParseLimits {
        self.limits
    }

    /// Read one complete reply
    ///
    /// Blocks until the whole frame (including every nested element) has
    /// been consumed. On error the reader is left mid-frame.
    pub fn parse<R: BufRead>(&self, reader: &mut R) -> Result<Reply> {
        self.parse_at(reader, 0)
    }

    fn parse_at<R: BufRead>(&self, reader: &mut R, depth: usize) -> Result<Reply> {
        let byte = read_tag(reader)?;
        let tag = ReplyTag::from_byte(byte).ok_or_else(|| {
            Error::Protocol(format!("unknown reply type byte 0x{:02x}", byte))
        })?;

        match tag {
            ReplyTag::Status => Ok(Reply::Status(self.read_line(reader)?)),
            ReplyTag::Error => Ok(Reply::Error(self.read_line(reader)?)),
            ReplyTag::Integer => {
                let line = self.read_line(reader)?;
                Ok(Reply::Integer(parse_integer(&line)?))
            }
            ReplyTag::Bulk => self.parse_bulk(reader),
            ReplyTag::Array => self.parse_array(reader, depth),
        }
    }

    fn parse_bulk<R: BufRead>(&self, reader: &mut R) -> Result<Reply> {
        let len = parse_integer(&self.read_line(reader)?)?;
        if len == -1 {
            return Ok(Reply::Bulk(None));
        }
        if len < 0 {
            return Err(Error::Protocol(format!("invalid bulk length {}", len)));
        }

        let len = len as usize;
        if len > self.limits.max_bulk_len {
            return Err(Error::Protocol(format!(
                "bulk string too long: {} bytes (max {})",
                len, self.limits.max_bulk_len
            )));
        }

        let mut payload = vec![0u8; len];
        reader
            .read_exact(&mut payload)
            .map_err(|e| frame_error(e, "bulk payload"))?;

        let mut terminator = [0u8; 2];
        reader
            .read_exact(&mut terminator)
            .map_err(|e| frame_error(e, "bulk terminator"))?;
        if terminator != *b"\r\n" {
            return Err(Error::Protocol(format!(
                "bulk string of {} bytes not followed by CRLF",
                len
            )));
        }

        Ok(Reply::Bulk(Some(Bytes::from(payload))))
    }

    fn parse_array<R: BufRead>(&self, reader: &mut R, depth: usize) -> Result<Reply> {
        let count = parse_integer(&self.read_line(reader)?)?;
        if count == -1 {
            return Ok(Reply::Array(None));
        }
        if count < 0 {
            return Err(Error::Protocol(format!("invalid array length {}", count)));
        }
        if depth >= self.limits.max_depth {
            return Err(Error::Protocol(format!(
                "nesting too deep: depth {} exceeds limit {}",
                depth + 1,
                self.limits.max_depth
            )));
        }

        let count = count as usize;
        let mut items = Vec::with_capacity(count.min(MAX_PREALLOC));
        for _ in 0..count {
            items.push(self.parse_at(reader, depth + 1)?);
        }
        Ok(Reply::Array(Some(items)))
    }

    /// Read up to CRLF and return the line without its terminator
    fn read_line<R: BufRead>(&self, reader: &mut R) -> Result<Bytes> {
        let limit = (self.limits.max_bulk_len as u64).saturating_add(2);
        let mut line = Vec::new();
        let read = reader
            .by_ref()
            .take(limit)
            .read_until(b'\n', &mut line)
            .map_err(|e| frame_error(e, "line"))?;

        if line.last() != Some(&b'\n') {
            if (read as u64) < limit {
                return Err(Error::PrematureEof(
                    "connection closed in the middle of a line".to_string(),
                ));
            }
            return Err(Error::Protocol(format!(
                "line exceeds {} bytes",
                self.limits.max_bulk_len
            )));
        }
        if line.len() < 2 || line[line.len() - 2] != b'\r' {
            return Err(Error::Protocol("line not terminated by CRLF".to_string()));
        }

        line.truncate(line.len() - 2);
        Ok(Bytes::from(line))
    }
}

/// Read one reply with default limits
pub fn read_reply<R: BufRead>(reader: &mut R) -> Result<Reply> {
    ReplyParser::default().parse(reader)
}

/// Parse one reply from a complete in-memory frame
pub fn decode_reply(bytes: &[u8]) -> Result<Reply> {
    let mut cursor = bytes;
    read_reply(&mut cursor)
}

fn read_tag<R: BufRead>(reader: &mut R) -> Result<u8> {
    let mut tag = [0u8; 1];
    reader
        .read_exact(&mut tag)
        .map_err(|e| frame_error(e, "reply type"))?;
    Ok(tag[0])
}

fn parse_integer(line: &[u8]) -> Result<i64> {
    std::str::from_utf8(line)
        .ok()
        // `str::parse` would also take a leading '+'
        .filter(|s| !s.starts_with('+'))
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(|| {
            Error::Protocol(format!(
                "invalid integer: {:?}",
                String::from_utf8_lossy(line)
            ))
        })
}

/// EOF while a frame is open is a premature close; anything else is a
/// transport failure.
fn frame_error(err: io::Error, reading: &str) -> Error {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        Error::PrematureEof(format!("connection closed while reading {}", reading))
    } else {
        Error::Io(err)
    }
}
