//! Reshaping transformed values into typed results
//!
//! Used by the typed command wrappers once the rule has been applied.

use std::collections::HashMap;

use bytes::Bytes;

use super::{unexpected, Value};
use crate::error::{Error, Result};

/// Expect a bulk string
pub fn into_bytes(value: Value) -> Result<Bytes> {
    match value {
        Value::Bytes(b) => Ok(b),
        other => Err(unexpected("bulk string", &other)),
    }
}

/// Array of bulk strings
pub fn into_bytes_list(value: Value) -> Result<Vec<Bytes>> {
    match value {
        Value::Array(items) => items.into_iter().map(into_bytes).collect(),
        other => Err(unexpected("array", &other)),
    }
}

/// Array of bulk strings or `Nil` (for rules with `EmptyArrayPolicy::Nil`)
pub fn into_optional_bytes_list(value: Value) -> Result<Option<Vec<Bytes>>> {
    match value {
        Value::Nil => Ok(None),
        other => into_bytes_list(other).map(Some),
    }
}

/// Array whose elements may be absent (MGET, HMGET)
///
/// Nil and zero-length elements both come back as `None`. An empty reply
/// gives an empty vector.
pub fn into_sparse_list(value: Value) -> Result<Vec<Option<Bytes>>> {
    let items = match value {
        Value::Array(items) => items,
        Value::Nil => return Ok(Vec::new()),
        other => return Err(unexpected("array", &other)),
    };

    items
        .into_iter()
        .map(|item| match item {
            Value::Bytes(b) if !b.is_empty() => Ok(Some(b)),
            Value::Bytes(_) | Value::Nil => Ok(None),
            other => Err(unexpected("bulk string", &other)),
        })
        .collect()
}

/// Flat `[k1, v1, k2, v2, ...]` into a map (HGETALL)
///
/// An odd number of elements means the reply does not match the command
/// and is rejected rather than truncated.
pub fn into_map(value: Value) -> Result<Option<HashMap<Bytes, Bytes>>> {
    let items = match value {
        Value::Nil => return Ok(None),
        Value::Array(items) => items,
        other => return Err(unexpected("array", &other)),
    };

    if items.len() % 2 != 0 {
        return Err(Error::UnexpectedReply(format!(
            "expected field/value pairs, got {} elements",
            items.len()
        )));
    }

    let mut map = HashMap::with_capacity(items.len() / 2);
    let mut iter = items.into_iter();
    while let (Some(field), Some(value)) = (iter.next(), iter.next()) {
        map.insert(into_bytes(field)?, into_bytes(value)?);
    }
    Ok(Some(map))
}

/// Status text, either as text or symbol
pub fn into_status(value: Value) -> Result<String> {
    match value {
        Value::Status(s) => Ok(s),
        Value::Symbol(s) => Ok(s.as_str().to_string()),
        other => Err(unexpected("status", &other)),
    }
}
