//! Reply definitions
//!
//! Raw replies exactly as decoded from the wire, before any policy is applied.

use bytes::Bytes;

/// Reply type tags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ReplyTag {
    Status = b'+',
    Error = b'-',
    Integer = b':',
    Bulk = b'$',
    Array = b'*',
}

impl ReplyTag {
    /// Map a wire byte to its tag
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'+' => Some(ReplyTag::Status),
            b'-' => Some(ReplyTag::Error),
            b':' => Some(ReplyTag::Integer),
            b'$' => Some(ReplyTag::Bulk),
            b'*' => Some(ReplyTag::Array),
            _ => None,
        }
    }
}

/// A decoded reply
///
/// A nil bulk string and a nil array are kept apart here; the transformer
/// maps both to the same absent value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Simple string: `+OK\r\n`
    Status(Bytes),

    /// Error: `-ERR message\r\n`
    Error(Bytes),

    /// Integer: `:1000\r\n`
    Integer(i64),

    /// Bulk string: `$6\r\nfoobar\r\n`, `None` for `$-1\r\n`
    Bulk(Option<Bytes>),

    /// Array: `*2\r\n...`, `None` for `*-1\r\n`
    Array(Option<Vec<Reply>>),
}

impl Reply {
    /// Create a status reply
    pub fn status(text: impl Into<Bytes>) -> Self {
        Reply::Status(text.into())
    }

    /// Create an error reply
    pub fn error(message: impl Into<Bytes>) -> Self {
        Reply::Error(message.into())
    }

    /// Create a non-nil bulk reply
    pub fn bulk(data: impl Into<Bytes>) -> Self {
        Reply::Bulk(Some(data.into()))
    }

    /// Create a non-nil array reply
    pub fn array(items: Vec<Reply>) -> Self {
        Reply::Array(Some(items))
    }

    /// The tag this reply is encoded with
    pub fn tag(&self) -> ReplyTag {
        match self {
            Reply::Status(_) => ReplyTag::Status,
            Reply::Error(_) => ReplyTag::Error,
            Reply::Integer(_) => ReplyTag::Integer,
            Reply::Bulk(_) => ReplyTag::Bulk,
            Reply::Array(_) => ReplyTag::Array,
        }
    }

    /// Nil bulk string or nil array
    pub fn is_nil(&self) -> bool {
        matches!(self, Reply::Bulk(None) | Reply::Array(None))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Reply::Error(_))
    }
}
