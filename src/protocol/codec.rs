//! Protocol codec
//!
//! Encoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! ### Request Format
//! Every request is an array of bulk strings, the command name first:
//! ```text
//! *<1 + argc>\r\n
//! $<len(name)>\r\n<name>\r\n
//! $<len(arg1)>\r\n<arg1>\r\n
//! ...
//! ```
//!
//! Lengths are explicit, so arguments are written verbatim with no escaping
//! and may contain CR, LF or NUL bytes.
//!
//! ### Reply Format
//! See [`super::ReplyParser`]. `encode_reply` produces the same framing the
//! server would, which is what tests and benchmarks feed back into the
//! parser.

use std::io::Write;

use super::Reply;
use crate::error::Result;

/// Line terminator
pub const CRLF: &[u8] = b"\r\n";

// =============================================================================
// Request Encoding
// =============================================================================

/// Exact number of bytes `encode_command` produces
pub fn encoded_len<A: AsRef<[u8]>>(name: &[u8], args: &[A]) -> usize {
    let mut len = header_len(1 + args.len());
    len += bulk_len(name.len());
    for arg in args {
        len += bulk_len(arg.as_ref().len());
    }
    len
}

/// Encode a command to bytes
///
/// Format: `*<N>\r\n` followed by one bulk string per element
pub fn encode_command<A: AsRef<[u8]>>(name: &[u8], args: &[A]) -> Vec<u8> {
    let mut message = Vec::with_capacity(encoded_len(name, args));
    encode_command_into(&mut message, name, args);
    message
}

/// Append an encoded command to an existing buffer
pub fn encode_command_into<A: AsRef<[u8]>>(buf: &mut Vec<u8>, name: &[u8], args: &[A]) {
    buf.reserve(encoded_len(name, args));
    push_header(buf, b'*', (1 + args.len()) as i64);
    push_bulk(buf, name);
    for arg in args {
        push_bulk(buf, arg.as_ref());
    }
}

/// Write a command to a stream
pub fn write_command<W: Write, A: AsRef<[u8]>>(writer: &mut W, name: &[u8], args: &[A]) -> Result<()> {
    let bytes = encode_command(name, args);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

// =============================================================================
// Reply Encoding
// =============================================================================

/// Encode a reply to bytes, as a server would send it
pub fn encode_reply(reply: &Reply) -> Vec<u8> {
    let mut message = Vec::new();
    encode_reply_into(&mut message, reply);
    message
}

/// Append an encoded reply to an existing buffer
pub fn encode_reply_into(buf: &mut Vec<u8>, reply: &Reply) {
    match reply {
        Reply::Status(text) => push_line(buf, b'+', text),
        Reply::Error(message) => push_line(buf, b'-', message),
        Reply::Integer(n) => push_header(buf, b':', *n),
        Reply::Bulk(Some(data)) => push_bulk(buf, data),
        Reply::Bulk(None) => push_header(buf, b'$', -1),
        Reply::Array(Some(items)) => {
            push_header(buf, b'*', items.len() as i64);
            for item in items {
                encode_reply_into(buf, item);
            }
        }
        Reply::Array(None) => push_header(buf, b'*', -1),
    }
}

/// Write a reply to a stream
pub fn write_reply<W: Write>(writer: &mut W, reply: &Reply) -> Result<()> {
    let bytes = encode_reply(reply);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

// =============================================================================
// Framing helpers
// =============================================================================

fn push_header(buf: &mut Vec<u8>, tag: u8, n: i64) {
    buf.push(tag);
    // Writing into a Vec cannot fail
    let _ = write!(buf, "{}", n);
    buf.extend_from_slice(CRLF);
}

fn push_line(buf: &mut Vec<u8>, tag: u8, line: &[u8]) {
    buf.push(tag);
    buf.extend_from_slice(line);
    buf.extend_from_slice(CRLF);
}

fn push_bulk(buf: &mut Vec<u8>, data: &[u8]) {
    push_header(buf, b'$', data.len() as i64);
    buf.extend_from_slice(data);
    buf.extend_from_slice(CRLF);
}

fn header_len(n: usize) -> usize {
    1 + decimal_len(n) + CRLF.len()
}

fn bulk_len(len: usize) -> usize {
    header_len(len) + len + CRLF.len()
}

fn decimal_len(mut n: usize) -> usize {
    let mut digits = 1;
    while n >= 10 {
        n /= 10;
        digits += 1;
    }
    digits
}
