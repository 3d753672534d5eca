//! Typed command wrappers
//!
//! Each wrapper builds its [`Command`], picks the reply rule that command
//! needs and reshapes the resulting [`Value`]. Anything not covered here
//! goes through [`Connection::execute`] directly.

use std::collections::HashMap;

use bytes::Bytes;

use super::connection::Connection;
use super::transport::Transport;
use crate::command::{Command, SetOptions, ToArg};
use crate::error::{Error, Result};
use crate::transform::{shape, unexpected, ReplyRule, Value};

const BOOL: ReplyRule = ReplyRule::DEFAULT.integer_to_bool();
const NIL_IF_EMPTY: ReplyRule = ReplyRule::DEFAULT.empty_array_to_nil();

impl<T: Transport> Connection<T> {
    fn call(&mut self, command: Command, rule: ReplyRule) -> Result<Value> {
        self.execute(&command, rule)
    }

    fn call_ok(&mut self, command: Command) -> Result<()> {
        shape::into_status(self.call(command, ReplyRule::DEFAULT)?).map(drop)
    }

    fn call_int(&mut self, command: Command) -> Result<i64> {
        self.call(command, ReplyRule::DEFAULT)?.into_int()
    }

    fn call_bool(&mut self, command: Command) -> Result<bool> {
        self.call(command, BOOL)?.into_bool()
    }

    fn call_bytes(&mut self, command: Command) -> Result<Option<Bytes>> {
        self.call(command, ReplyRule::DEFAULT)?.into_optional_bytes()
    }

    fn call_list(&mut self, command: Command) -> Result<Vec<Bytes>> {
        shape::into_bytes_list(self.call(command, ReplyRule::DEFAULT)?)
    }

    // =========================================================================
    // Connection
    // =========================================================================

    /// PING, returns the status text (normally `PONG`)
    pub fn ping(&mut self) -> Result<String> {
        shape::into_status(self.call(Command::new("PING"), ReplyRule::DEFAULT)?)
    }

    /// AUTH password
    ///
    /// A rejected credential surfaces as [`Error::Auth`].
    pub fn auth(&mut self, password: impl ToArg) -> Result<()> {
        self.authenticate(Command::new("AUTH").arg(password))
    }

    /// AUTH username password (ACL style)
    pub fn auth_with_user(&mut self, username: impl ToArg, password: impl ToArg) -> Result<()> {
        self.authenticate(Command::new("AUTH").arg(username).arg(password))
    }

    fn authenticate(&mut self, command: Command) -> Result<()> {
        match self.call(command, ReplyRule::DEFAULT.return_errors())? {
            Value::Error(err) => {
                tracing::debug!("Authentication rejected: {}", err);
                Err(Error::Auth(err.message().to_string()))
            }
            other => shape::into_status(other).map(drop),
        }
    }

    pub fn select(&mut self, db: i64) -> Result<()> {
        self.call_ok(Command::new("SELECT").arg(db))
    }

    // =========================================================================
    // Strings
    // =========================================================================

    pub fn get(&mut self, key: impl ToArg) -> Result<Option<Bytes>> {
        self.call_bytes(Command::new("GET").arg(key))
    }

    pub fn set(&mut self, key: impl ToArg, value: impl ToArg) -> Result<()> {
        self.call_ok(Command::set(key, value, &SetOptions::new()))
    }

    /// SET with EX/PX/NX/XX
    ///
    /// Returns `false` when an NX or XX condition kept the value from being
    /// written.
    pub fn set_with(&mut self, key: impl ToArg, value: impl ToArg, options: &SetOptions) -> Result<bool> {
        match self.call(Command::set(key, value, options), ReplyRule::DEFAULT)? {
            Value::Nil => Ok(false),
            other => shape::into_status(other).map(|_| true),
        }
    }

    pub fn setnx(&mut self, key: impl ToArg, value: impl ToArg) -> Result<bool> {
        self.call_bool(Command::new("SETNX").arg(key).arg(value))
    }

    /// MGET; missing and empty values come back as `None`
    pub fn mget<I>(&mut self, keys: I) -> Result<Vec<Option<Bytes>>>
    where
        I: IntoIterator,
        I::Item: ToArg,
    {
        let command = Command::mget(keys)?;
        shape::into_sparse_list(self.call(command, ReplyRule::DEFAULT)?)
    }

    pub fn mset<I, K, V>(&mut self, pairs: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: ToArg,
        V: ToArg,
    {
        self.call_ok(Command::mset(pairs)?)
    }

    pub fn incr(&mut self, key: impl ToArg) -> Result<i64> {
        self.call_int(Command::new("INCR").arg(key))
    }

    pub fn decr(&mut self, key: impl ToArg) -> Result<i64> {
        self.call_int(Command::new("DECR").arg(key))
    }

    pub fn incrby(&mut self, key: impl ToArg, by: i64) -> Result<i64> {
        self.call_int(Command::new("INCRBY").arg(key).arg(by))
    }

    pub fn decrby(&mut self, key: impl ToArg, by: i64) -> Result<i64> {
        self.call_int(Command::new("DECRBY").arg(key).arg(by))
    }

    // =========================================================================
    // Keys
    // =========================================================================

    /// DEL, returns how many keys were removed
    pub fn del<I>(&mut self, keys: I) -> Result<i64>
    where
        I: IntoIterator,
        I::Item: ToArg,
    {
        self.call_int(Command::new("DEL").args(keys).checked()?)
    }

    pub fn exists(&mut self, key: impl ToArg) -> Result<bool> {
        self.call_bool(Command::new("EXISTS").arg(key))
    }

    pub fn expire(&mut self, key: impl ToArg, seconds: i64) -> Result<bool> {
        self.call_bool(Command::new("EXPIRE").arg(key).arg(seconds))
    }

    /// Remaining time to live in seconds (-1 no expiry, -2 no key)
    pub fn ttl(&mut self, key: impl ToArg) -> Result<i64> {
        self.call_int(Command::new("TTL").arg(key))
    }

    /// KEYS pattern; `None` when nothing matches
    pub fn keys(&mut self, pattern: impl ToArg) -> Result<Option<Vec<Bytes>>> {
        shape::into_optional_bytes_list(self.call(Command::new("KEYS").arg(pattern), NIL_IF_EMPTY)?)
    }

    pub fn randomkey(&mut self) -> Result<Option<Bytes>> {
        self.call_bytes(Command::new("RANDOMKEY"))
    }

    pub fn flushdb(&mut self) -> Result<()> {
        self.call_ok(Command::new("FLUSHDB"))
    }

    pub fn flushall(&mut self) -> Result<()> {
        self.call_ok(Command::new("FLUSHALL"))
    }

    // =========================================================================
    // Lists
    // =========================================================================

    pub fn llen(&mut self, key: impl ToArg) -> Result<i64> {
        self.call_int(Command::new("LLEN").arg(key))
    }

    /// LPUSH, returns the new length
    pub fn lpush<I>(&mut self, key: impl ToArg, values: I) -> Result<i64>
    where
        I: IntoIterator,
        I::Item: ToArg,
    {
        self.call_int(Command::key_with_members("LPUSH", key, values)?)
    }

    /// RPUSH, returns the new length
    pub fn rpush<I>(&mut self, key: impl ToArg, values: I) -> Result<i64>
    where
        I: IntoIterator,
        I::Item: ToArg,
    {
        self.call_int(Command::key_with_members("RPUSH", key, values)?)
    }

    pub fn lpop(&mut self, key: impl ToArg) -> Result<Option<Bytes>> {
        self.call_bytes(Command::new("LPOP").arg(key))
    }

    pub fn rpop(&mut self, key: impl ToArg) -> Result<Option<Bytes>> {
        self.call_bytes(Command::new("RPOP").arg(key))
    }

    pub fn lrange(&mut self, key: impl ToArg, start: i64, stop: i64) -> Result<Vec<Bytes>> {
        self.call_list(Command::new("LRANGE").arg(key).arg(start).arg(stop))
    }

    pub fn ltrim(&mut self, key: impl ToArg, start: i64, stop: i64) -> Result<()> {
        self.call_ok(Command::new("LTRIM").arg(key).arg(start).arg(stop))
    }

    pub fn lindex(&mut self, key: impl ToArg, index: i64) -> Result<Option<Bytes>> {
        self.call_bytes(Command::new("LINDEX").arg(key).arg(index))
    }

    // =========================================================================
    // Sets
    // =========================================================================

    /// SADD, returns how many members were new
    pub fn sadd<I>(&mut self, key: impl ToArg, members: I) -> Result<i64>
    where
        I: IntoIterator,
        I::Item: ToArg,
    {
        self.call_int(Command::key_with_members("SADD", key, members)?)
    }

    /// SREM, returns how many members were removed
    pub fn srem<I>(&mut self, key: impl ToArg, members: I) -> Result<i64>
    where
        I: IntoIterator,
        I::Item: ToArg,
    {
        self.call_int(Command::key_with_members("SREM", key, members)?)
    }

    pub fn sismember(&mut self, key: impl ToArg, member: impl ToArg) -> Result<bool> {
        self.call_bool(Command::new("SISMEMBER").arg(key).arg(member))
    }

    pub fn smembers(&mut self, key: impl ToArg) -> Result<Vec<Bytes>> {
        self.call_list(Command::new("SMEMBERS").arg(key))
    }

    pub fn scard(&mut self, key: impl ToArg) -> Result<i64> {
        self.call_int(Command::new("SCARD").arg(key))
    }

    pub fn spop(&mut self, key: impl ToArg) -> Result<Option<Bytes>> {
        self.call_bytes(Command::new("SPOP").arg(key))
    }

    // =========================================================================
    // Hashes
    // =========================================================================

    /// HSET, `true` if the field is new
    pub fn hset(&mut self, key: impl ToArg, field: impl ToArg, value: impl ToArg) -> Result<bool> {
        self.call_bool(Command::new("HSET").arg(key).arg(field).arg(value))
    }

    pub fn hsetnx(&mut self, key: impl ToArg, field: impl ToArg, value: impl ToArg) -> Result<bool> {
        self.call_bool(Command::new("HSETNX").arg(key).arg(field).arg(value))
    }

    pub fn hget(&mut self, key: impl ToArg, field: impl ToArg) -> Result<Option<Bytes>> {
        self.call_bytes(Command::new("HGET").arg(key).arg(field))
    }

    /// HGETALL as a map; `None` when the hash does not exist
    pub fn hgetall(&mut self, key: impl ToArg) -> Result<Option<HashMap<Bytes, Bytes>>> {
        shape::into_map(self.call(Command::new("HGETALL").arg(key), NIL_IF_EMPTY)?)
    }

    pub fn hdel<I>(&mut self, key: impl ToArg, fields: I) -> Result<i64>
    where
        I: IntoIterator,
        I::Item: ToArg,
    {
        self.call_int(Command::key_with_members("HDEL", key, fields)?)
    }

    pub fn hexists(&mut self, key: impl ToArg, field: impl ToArg) -> Result<bool> {
        self.call_bool(Command::new("HEXISTS").arg(key).arg(field))
    }

    pub fn hkeys(&mut self, key: impl ToArg) -> Result<Option<Vec<Bytes>>> {
        shape::into_optional_bytes_list(self.call(Command::new("HKEYS").arg(key), NIL_IF_EMPTY)?)
    }

    pub fn hvals(&mut self, key: impl ToArg) -> Result<Option<Vec<Bytes>>> {
        shape::into_optional_bytes_list(self.call(Command::new("HVALS").arg(key), NIL_IF_EMPTY)?)
    }

    /// HMGET; missing and empty values come back as `None`
    pub fn hmget<I>(&mut self, key: impl ToArg, fields: I) -> Result<Vec<Option<Bytes>>>
    where
        I: IntoIterator,
        I::Item: ToArg,
    {
        let command = Command::hmget(key, fields)?;
        shape::into_sparse_list(self.call(command, ReplyRule::DEFAULT)?)
    }

    pub fn hmset<I, K, V>(&mut self, key: impl ToArg, pairs: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: ToArg,
        V: ToArg,
    {
        self.call_ok(Command::hmset(key, pairs)?)
    }

    pub fn hincrby(&mut self, key: impl ToArg, field: impl ToArg, by: i64) -> Result<i64> {
        self.call_int(Command::new("HINCRBY").arg(key).arg(field).arg(by))
    }

    // =========================================================================
    // Sorted sets
    // =========================================================================

    pub fn zadd(&mut self, key: impl ToArg, score: f64, member: impl ToArg) -> Result<i64> {
        self.call_int(Command::new("ZADD").arg(key).arg(score).arg(member))
    }

    pub fn zcard(&mut self, key: impl ToArg) -> Result<i64> {
        self.call_int(Command::new("ZCARD").arg(key))
    }

    pub fn zrange(&mut self, key: impl ToArg, start: i64, stop: i64) -> Result<Vec<Bytes>> {
        self.call_list(Command::new("ZRANGE").arg(key).arg(start).arg(stop))
    }

    pub fn zrevrange(&mut self, key: impl ToArg, start: i64, stop: i64) -> Result<Vec<Bytes>> {
        self.call_list(Command::new("ZREVRANGE").arg(key).arg(start).arg(stop))
    }

    /// ZRANK; `None` when the member is absent
    pub fn zrank(&mut self, key: impl ToArg, member: impl ToArg) -> Result<Option<i64>> {
        self.rank(Command::new("ZRANK").arg(key).arg(member))
    }

    pub fn zrevrank(&mut self, key: impl ToArg, member: impl ToArg) -> Result<Option<i64>> {
        self.rank(Command::new("ZREVRANK").arg(key).arg(member))
    }

    fn rank(&mut self, command: Command) -> Result<Option<i64>> {
        match self.call(command, ReplyRule::DEFAULT)? {
            Value::Nil => Ok(None),
            other => other.into_int().map(Some),
        }
    }

    /// ZSCORE; `None` when the member is absent
    pub fn zscore(&mut self, key: impl ToArg, member: impl ToArg) -> Result<Option<f64>> {
        let Some(score) = self.call_bytes(Command::new("ZSCORE").arg(key).arg(member))? else {
            return Ok(None);
        };
        std::str::from_utf8(&score)
            .ok()
            .and_then(|s| s.parse::<f64>().ok())
            .map(Some)
            .ok_or_else(|| unexpected("score", &Value::Bytes(score.clone())))
    }

    // =========================================================================
    // Pub/Sub and HyperLogLog
    // =========================================================================

    /// PUBLISH, returns how many subscribers received the message
    pub fn publish(&mut self, channel: impl ToArg, message: impl ToArg) -> Result<i64> {
        self.call_int(Command::new("PUBLISH").arg(channel).arg(message))
    }

    pub fn pfadd<I>(&mut self, key: impl ToArg, elements: I) -> Result<i64>
    where
        I: IntoIterator,
        I::Item: ToArg,
    {
        self.call_int(Command::new("PFADD").arg(key).args(elements))
    }

    pub fn pfcount<I>(&mut self, keys: I) -> Result<i64>
    where
        I: IntoIterator,
        I::Item: ToArg,
    {
        self.call_int(Command::new("PFCOUNT").args(keys).checked()?)
    }

    pub fn pfmerge<I>(&mut self, dest: impl ToArg, sources: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: ToArg,
    {
        self.call_ok(Command::key_with_members("PFMERGE", dest, sources)?)
    }

    // =========================================================================
    // Transactions
    // =========================================================================

    /// MULTI
    ///
    /// Until EXEC the server answers `QUEUED`; send the queued commands with
    /// [`Connection::execute`] rather than the typed wrappers.
    pub fn multi(&mut self) -> Result<()> {
        self.call_ok(Command::new("MULTI"))
    }

    /// EXEC; `None` when the transaction was aborted or empty
    pub fn exec(&mut self) -> Result<Option<Vec<Value>>> {
        match self.call(Command::new("EXEC"), NIL_IF_EMPTY)? {
            Value::Nil => Ok(None),
            Value::Array(items) => Ok(Some(items)),
            other => Err(unexpected("array", &other)),
        }
    }

    pub fn discard(&mut self) -> Result<()> {
        self.call_ok(Command::new("DISCARD"))
    }

    pub fn watch<I>(&mut self, keys: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: ToArg,
    {
        self.call_ok(Command::new("WATCH").args(keys).checked()?)
    }

    pub fn unwatch(&mut self) -> Result<()> {
        self.call_ok(Command::new("UNWATCH"))
    }

    // =========================================================================
    // Cluster
    // =========================================================================

    /// CLUSTER subcommand, reply passed through untouched
    pub fn cluster(&mut self, subcommand: impl ToArg) -> Result<Value> {
        self.call(Command::new("CLUSTER").arg(subcommand), ReplyRule::DEFAULT)
    }

    pub fn asking(&mut self) -> Result<()> {
        self.call_ok(Command::new("ASKING"))
    }
}
