//! Error types for redwire
//!
//! Provides a unified error type for all operations.
//!
//! Transport and parse-level errors always surface as `Err`. Reply errors
//! sent by the server are the only kind a caller can choose to receive as a
//! value instead (see [`crate::transform::ErrorPolicy`]).

use std::fmt;

use thiserror::Error;

/// Result type alias using the crate error
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for redwire operations
#[derive(Debug, Error)]
pub enum Error {
    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("connection is already closed or not initialized yet")]
    Closed,

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Premature EOF: {0}")]
    PrematureEof(String),

    // -------------------------------------------------------------------------
    // Server Reply Errors
    // -------------------------------------------------------------------------
    #[error("Out of memory: {0}")]
    OutOfMemory(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("{0}")]
    Reply(ReplyError),

    #[error("Unexpected reply: {0}")]
    UnexpectedReply(String),

    // -------------------------------------------------------------------------
    // Caller Errors
    // -------------------------------------------------------------------------
    #[error("Argument error: {0}")]
    Argument(String),

    // -------------------------------------------------------------------------
    // Pipeline Errors
    // -------------------------------------------------------------------------
    #[error("nothing queued yet")]
    NothingQueued,

    #[error("pipeline counter would overflow")]
    QueueOverflow,

    #[error("{0} pipelined replies are still pending")]
    PipelinePending(usize),
}

impl Error {
    /// True for failures of the transport itself (could not connect, or a
    /// system-level I/O failure).
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Error::Connection(_) | Error::Io(_))
    }

    /// True when the stream can no longer be trusted and the connection
    /// must be re-established.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::Connection(_) | Error::Io(_) | Error::Protocol(_) | Error::PrematureEof(_)
        )
    }

    /// The server's reply error, if this is one.
    pub fn as_reply_error(&self) -> Option<&ReplyError> {
        match self {
            Error::Reply(err) => Some(err),
            _ => None,
        }
    }
}

/// An application-level error reply sent by the server (`-ERR ...`).
///
/// Never indicates a transport problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyError {
    message: String,
}

impl ReplyError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Full message as sent by the server, without the leading `-`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// First word of the message (`ERR`, `WRONGTYPE`, `NOAUTH`, ...).
    pub fn code(&self) -> &str {
        self.message.split(' ').next().unwrap_or("")
    }

    /// The server refused the command because it could not allocate.
    pub fn is_oom(&self) -> bool {
        self.code() == "OOM"
    }
}

impl fmt::Display for ReplyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ReplyError {}
