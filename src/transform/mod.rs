//! Reply Transformer
//!
//! Applies a [`ReplyRule`] to a decoded [`Reply`] and produces the
//! caller-facing [`Value`].
//!
//! | Reply          | Value                                                  |
//! |----------------|--------------------------------------------------------|
//! | bulk           | `Bytes`, unchanged                                     |
//! | nil bulk/array | `Nil`                                                  |
//! | array          | `Array`, same rule applied to every element;           |
//! |                | `Nil` when empty under `EmptyArrayPolicy::Nil`         |
//! | integer        | `Int`, or `Bool` under `IntegerPolicy::Boolean`        |
//! | status         | `Status`, or `Symbol` under `StatusPolicy::Symbol`     |
//! | error          | `Err(..)`, or `Error` under `ErrorPolicy::Return`      |
//!
//! The reply is consumed. If an error is raised halfway through an array,
//! the elements not yet visited are dropped along with the iterator.

mod rule;
pub mod shape;
mod value;

pub use rule::{EmptyArrayPolicy, ErrorPolicy, IntegerPolicy, ReplyRule, StatusPolicy};
pub use value::{Symbol, Value};

pub(crate) use value::unexpected;

use crate::error::{Error, ReplyError, Result};
use crate::protocol::Reply;

/// Apply `rule` to `reply`
pub fn transform(reply: Reply, rule: ReplyRule) -> Result<Value> {
    match reply {
        Reply::Bulk(Some(data)) => Ok(Value::Bytes(data)),
        Reply::Bulk(None) | Reply::Array(None) => Ok(Value::Nil),
        Reply::Array(Some(items)) => {
            if items.is_empty() && rule.empty_array == EmptyArrayPolicy::Nil {
                return Ok(Value::Nil);
            }
            let mut values = Vec::with_capacity(items.len());
            for item in items {
                values.push(transform(item, rule)?);
            }
            Ok(Value::Array(values))
        }
        Reply::Integer(n) => Ok(match rule.integer {
            IntegerPolicy::Boolean => Value::Bool(n != 0),
            IntegerPolicy::Number => Value::Int(n),
        }),
        Reply::Status(text) => Ok(match rule.status {
            StatusPolicy::Symbol => Value::Symbol(Symbol::intern(&text)),
            StatusPolicy::Text => Value::Status(String::from_utf8_lossy(&text).into_owned()),
        }),
        Reply::Error(message) => {
            let err = ReplyError::new(String::from_utf8_lossy(&message).into_owned());
            match rule.error {
                ErrorPolicy::Return => Ok(Value::Error(err)),
                ErrorPolicy::Raise => Err(raise(err)),
            }
        }
    }
}

/// The error a raised reply error turns into
///
/// `-OOM` replies get their own kind; everything else stays a reply error.
pub fn raise(err: ReplyError) -> Error {
    if err.is_oom() {
        Error::OutOfMemory(err.message().to_string())
    } else {
        Error::Reply(err)
    }
}
