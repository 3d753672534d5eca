//! Protocol Module
//!
//! Defines the wire protocol spoken with the server (RESP2).
//!
//! ## Request Format
//! ```text
//! *<N>\r\n$<len0>\r\n<arg0>\r\n ... $<lenN-1>\r\n<argN-1>\r\n
//! ```
//!
//! ## Reply Types
//! - `+` status
//! - `-` error
//! - `:` integer
//! - `$` bulk string (`$-1` = nil)
//! - `*` array (`*-1` = nil)
//!
//! All lines end with CRLF. Bulk lengths are authoritative.

mod codec;
mod parser;
mod reply;

pub use codec::{
    encode_command, encode_command_into, encode_reply, encode_reply_into, encoded_len,
    write_command, write_reply, CRLF,
};
pub use parser::{
    decode_reply, read_reply, ParseLimits, ReplyParser, DEFAULT_MAX_BULK_LEN, DEFAULT_MAX_DEPTH,
};
pub use reply::{Reply, ReplyTag};
