//! Command Module
//!
//! Builds and validates the argument vectors sent to the server.
//!
//! ## Responsibilities
//! - Convert caller values into byte-string arguments ([`ToArg`])
//! - Check arity and argument shape against the command table
//! - Shape option-bearing commands (`SET` with [`SetOptions`])
//!
//! Validation always happens before any byte is written.

mod arg;
mod set;
mod table;

pub use arg::ToArg;
pub use set::{Existence, Expiry, OptionValue, SetOptions};
pub use table::{lookup, ArgShape, CommandSpec, COMMANDS};

use std::borrow::Cow;

use bytes::Bytes;

use crate::error::Result;
use crate::protocol::{encode_command, encode_command_into};

/// A command name plus its arguments, ready to encode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    name: Bytes,
    args: Vec<Bytes>,
}

impl Command {
    /// Start a command with no arguments
    pub fn new(name: impl ToArg) -> Self {
        Self {
            name: name.to_arg(),
            args: Vec::new(),
        }
    }

    /// Add one argument
    pub fn arg(mut self, arg: impl ToArg) -> Self {
        self.args.push(arg.to_arg());
        self
    }

    /// Add every argument of an iterator
    pub fn args<I>(mut self, args: I) -> Self
    where
        I: IntoIterator,
        I::Item: ToArg,
    {
        let args = args.into_iter();
        self.args.reserve(args.size_hint().0);
        self.args.extend(args.map(|arg| arg.to_arg()));
        self
    }

    pub fn name(&self) -> &[u8] {
        &self.name
    }

    /// Name for logs and error messages
    pub fn name_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.name)
    }

    pub fn arguments(&self) -> &[Bytes] {
        &self.args
    }

    /// Table entry for this command, if it is a wrapped one
    pub fn spec(&self) -> Option<&'static CommandSpec> {
        lookup(&self.name)
    }

    /// Check the arguments against the command table
    ///
    /// Commands not in the table pass unchecked.
    pub fn validate(&self) -> Result<()> {
        match self.spec() {
            Some(spec) => spec.validate(&self.args),
            None => Ok(()),
        }
    }

    /// Validate and return self
    pub fn checked(self) -> Result<Self> {
        self.validate()?;
        Ok(self)
    }

    /// Encode to wire bytes
    pub fn encode(&self) -> Vec<u8> {
        encode_command(&self.name, &self.args)
    }

    /// Append the wire bytes to `buf`
    pub fn encode_into(&self, buf: &mut Vec<u8>) {
        encode_command_into(buf, &self.name, &self.args)
    }

    // =========================================================================
    // Shaped builders
    // =========================================================================

    /// `SET key value [EX n|PX n] [NX|XX]`
    pub fn set(key: impl ToArg, value: impl ToArg, options: &SetOptions) -> Self {
        Command::new("SET")
            .arg(key)
            .arg(value)
            .args(options.to_args())
    }

    /// `MGET key [key ...]`
    pub fn mget<I>(keys: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: ToArg,
    {
        Command::new("MGET").args(keys).checked()
    }

    /// `HMGET key field [field ...]`
    pub fn hmget<I>(key: impl ToArg, fields: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: ToArg,
    {
        Command::new("HMGET").arg(key).args(fields).checked()
    }

    /// `MSET key value [key value ...]`
    pub fn mset<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: ToArg,
        V: ToArg,
    {
        Command::new("MSET").args(flatten(pairs)).checked()
    }

    /// `HMSET key field value [field value ...]`
    pub fn hmset<I, K, V>(key: impl ToArg, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: ToArg,
        V: ToArg,
    {
        Command::new("HMSET").arg(key).args(flatten(pairs)).checked()
    }

    /// `<name> key member [member ...]` (SADD, SREM, LPUSH, RPUSH, PFADD, ...)
    pub fn key_with_members<I>(name: &'static str, key: impl ToArg, members: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: ToArg,
    {
        Command::new(name).arg(key).args(members).checked()
    }
}

fn flatten<I, K, V>(pairs: I) -> Vec<Bytes>
where
    I: IntoIterator<Item = (K, V)>,
    K: ToArg,
    V: ToArg,
{
    let pairs = pairs.into_iter();
    let mut args = Vec::with_capacity(pairs.size_hint().0 * 2);
    for (k, v) in pairs {
        args.push(k.to_arg());
        args.push(v.to_arg());
    }
    args
}
