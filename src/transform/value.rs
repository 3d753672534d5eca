//! Caller-facing values

use std::borrow::Cow;
use std::fmt;

use bytes::Bytes;

use crate::error::{Error, ReplyError, Result};

/// Status texts that share static storage when interned
const WELL_KNOWN_STATUSES: &[&str] = &["OK", "PONG", "QUEUED", "RESET"];

/// An interned status token
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol(Cow<'static, str>);

impl Symbol {
    /// Intern status bytes
    pub fn intern(status: &[u8]) -> Self {
        match WELL_KNOWN_STATUSES
            .iter()
            .copied()
            .find(|known| known.as_bytes() == status)
        {
            Some(known) => Symbol(Cow::Borrowed(known)),
            None => Symbol(Cow::Owned(String::from_utf8_lossy(status).into_owned())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this symbol points at shared static storage
    pub fn is_static(&self) -> bool {
        matches!(self.0, Cow::Borrowed(_))
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for Symbol {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for Symbol {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

/// A reply after its rule has been applied
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Nil bulk, nil array, or an empty array under `EmptyArrayPolicy::Nil`
    Nil,

    /// Integer under `IntegerPolicy::Boolean`
    Bool(bool),

    Int(i64),

    /// Lossy widening of an integer outside the native range
    Float(f64),

    /// Bulk string, verbatim
    Bytes(Bytes),

    /// Status under `StatusPolicy::Text`
    Status(String),

    /// Status under `StatusPolicy::Symbol`
    Symbol(Symbol),

    Array(Vec<Value>),

    /// Error reply under `ErrorPolicy::Return`
    Error(ReplyError),
}

impl Value {
    /// Integer value, widened to a float when it does not fit `i64`
    pub fn from_wide_integer(n: i128) -> Self {
        match i64::try_from(n) {
            Ok(n) => Value::Int(n),
            Err(_) => Value::Float(n as f64),
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b.as_ref()),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Status text, whether surfaced as text or as a symbol
    pub fn as_status(&self) -> Option<&str> {
        match self {
            Value::Status(s) => Some(s.as_str()),
            Value::Symbol(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_error(&self) -> Option<&ReplyError> {
        match self {
            Value::Error(err) => Some(err),
            _ => None,
        }
    }

    pub fn into_array(self) -> Option<Vec<Value>> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Turn a returned error value back into an `Err`
    pub fn into_result(self) -> Result<Value> {
        match self {
            Value::Error(err) => Err(super::raise(err)),
            other => Ok(other),
        }
    }

    /// Expect a bulk string or nil
    pub fn into_optional_bytes(self) -> Result<Option<Bytes>> {
        match self {
            Value::Bytes(b) => Ok(Some(b)),
            Value::Nil => Ok(None),
            other => Err(unexpected("bulk string", &other)),
        }
    }

    /// Expect an integer
    pub fn into_int(self) -> Result<i64> {
        match self {
            Value::Int(n) => Ok(n),
            other => Err(unexpected("integer", &other)),
        }
    }

    /// Expect a boolean (integer reply under `IntegerPolicy::Boolean`)
    pub fn into_bool(self) -> Result<bool> {
        match self {
            Value::Bool(b) => Ok(b),
            other => Err(unexpected("integer", &other)),
        }
    }
}

pub(crate) fn unexpected(expected: &str, got: &Value) -> Error {
    Error::UnexpectedReply(format!("expected {}, got {:?}", expected, got))
}
