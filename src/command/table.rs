//! Command table
//!
//! Arity bounds and argument shapes for every command this crate wraps.
//! Counts exclude the command name. Commands missing from the table are
//! forwarded unchecked.

use bytes::Bytes;

use crate::error::{Error, Result};

/// Layout constraint on the argument list beyond its length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgShape {
    /// No constraint
    Any,

    /// `k1 v1 k2 v2 ...` (MSET)
    Pairs,

    /// `key f1 v1 f2 v2 ...` (HMSET)
    KeyThenPairs,
}

/// One entry of the command table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: &'static str,
    pub min_args: usize,
    /// `None` = unbounded
    pub max_args: Option<usize>,
    pub shape: ArgShape,
}

const fn fixed(name: &'static str, n: usize) -> CommandSpec {
    CommandSpec {
        name,
        min_args: n,
        max_args: Some(n),
        shape: ArgShape::Any,
    }
}

const fn at_least(name: &'static str, n: usize) -> CommandSpec {
    CommandSpec {
        name,
        min_args: n,
        max_args: None,
        shape: ArgShape::Any,
    }
}

const fn shaped(name: &'static str, n: usize, shape: ArgShape) -> CommandSpec {
    CommandSpec {
        name,
        min_args: n,
        max_args: None,
        shape,
    }
}

/// Every wrapped command
pub static COMMANDS: &[CommandSpec] = &[
    // Connection
    fixed("PING", 0),
    CommandSpec {
        name: "AUTH",
        min_args: 1,
        max_args: Some(2),
        shape: ArgShape::Any,
    },
    fixed("SELECT", 1),
    // Strings
    fixed("GET", 1),
    CommandSpec {
        name: "SET",
        min_args: 2,
        max_args: Some(5),
        shape: ArgShape::Any,
    },
    fixed("SETNX", 2),
    at_least("MGET", 1),
    shaped("MSET", 2, ArgShape::Pairs),
    fixed("INCR", 1),
    fixed("DECR", 1),
    fixed("INCRBY", 2),
    fixed("DECRBY", 2),
    // Keys
    at_least("DEL", 1),
    at_least("EXISTS", 1),
    fixed("EXPIRE", 2),
    fixed("TTL", 1),
    fixed("KEYS", 1),
    fixed("RANDOMKEY", 0),
    CommandSpec {
        name: "FLUSHDB",
        min_args: 0,
        max_args: Some(1),
        shape: ArgShape::Any,
    },
    CommandSpec {
        name: "FLUSHALL",
        min_args: 0,
        max_args: Some(1),
        shape: ArgShape::Any,
    },
    // Lists
    fixed("LLEN", 1),
    at_least("LPUSH", 2),
    at_least("RPUSH", 2),
    fixed("LPOP", 1),
    fixed("RPOP", 1),
    fixed("LRANGE", 3),
    fixed("LTRIM", 3),
    fixed("LINDEX", 2),
    // Sets
    at_least("SADD", 2),
    at_least("SREM", 2),
    fixed("SISMEMBER", 2),
    fixed("SMEMBERS", 1),
    fixed("SCARD", 1),
    fixed("SPOP", 1),
    // Hashes
    fixed("HSET", 3),
    fixed("HSETNX", 3),
    fixed("HGET", 2),
    fixed("HGETALL", 1),
    at_least("HDEL", 2),
    fixed("HEXISTS", 2),
    fixed("HKEYS", 1),
    fixed("HVALS", 1),
    at_least("HMGET", 2),
    shaped("HMSET", 3, ArgShape::KeyThenPairs),
    fixed("HINCRBY", 3),
    // Sorted sets
    fixed("ZADD", 3),
    fixed("ZCARD", 1),
    fixed("ZRANGE", 3),
    fixed("ZREVRANGE", 3),
    fixed("ZRANK", 2),
    fixed("ZREVRANK", 2),
    fixed("ZSCORE", 2),
    // HyperLogLog
    at_least("PFADD", 1),
    at_least("PFCOUNT", 1),
    at_least("PFMERGE", 2),
    // Pub/Sub
    fixed("PUBLISH", 2),
    // Transactions
    fixed("MULTI", 0),
    fixed("EXEC", 0),
    fixed("DISCARD", 0),
    at_least("WATCH", 1),
    fixed("UNWATCH", 0),
    // Cluster (forwarded opaquely)
    at_least("CLUSTER", 1),
    fixed("ASKING", 0),
];

/// Find the table entry for a command name (case-insensitive)
pub fn lookup(name: &[u8]) -> Option<&'static CommandSpec> {
    COMMANDS
        .iter()
        .find(|spec| spec.name.as_bytes().eq_ignore_ascii_case(name))
}

impl CommandSpec {
    /// Check an argument list against this entry
    pub fn validate(&self, args: &[Bytes]) -> Result<()> {
        let count = args.len();
        if count < self.min_args || self.max_args.map_or(false, |max| count > max) {
            return Err(Error::Argument(format!(
                "wrong number of arguments for '{}': {}",
                self.name, count
            )));
        }

        let paired = match self.shape {
            ArgShape::Any => return Ok(()),
            ArgShape::Pairs => count,
            ArgShape::KeyThenPairs => count - 1,
        };
        if paired % 2 != 0 {
            return Err(Error::Argument(format!(
                "'{}' expects field/value pairs, got an odd number of them",
                self.name
            )));
        }
        Ok(())
    }
}
