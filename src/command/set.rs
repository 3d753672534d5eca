//! SET options
//!
//! `SET key value [EX seconds | PX milliseconds] [NX | XX]`
//!
//! Options can be built with the typed methods or from a loose key/value
//! map (`from_pairs`). Either way, conflicting or unknown options are
//! rejected before a command exists, so nothing reaches the wire.

use bytes::Bytes;

use crate::error::{Error, Result};

/// Key expiry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    /// `EX seconds`
    Seconds(u64),

    /// `PX milliseconds`
    Millis(u64),
}

/// Existence condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Existence {
    /// `NX`: only set if the key does not exist
    IfAbsent,

    /// `XX`: only set if the key already exists
    IfPresent,
}

/// Value of a loose option entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Int(i64),
    Text(String),
    Flag(bool),
}

impl From<i64> for OptionValue {
    fn from(n: i64) -> Self {
        OptionValue::Int(n)
    }
}

impl From<i32> for OptionValue {
    fn from(n: i32) -> Self {
        OptionValue::Int(i64::from(n))
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::Text(s.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(s: String) -> Self {
        OptionValue::Text(s)
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        OptionValue::Flag(b)
    }
}

/// Validated SET options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetOptions {
    expiry: Option<Expiry>,
    existence: Option<Existence>,
}

impl SetOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expire after `seconds`
    pub fn ex(self, seconds: u64) -> Result<Self> {
        self.with_expiry(Expiry::Seconds(seconds))
    }

    /// Expire after `millis`
    pub fn px(self, millis: u64) -> Result<Self> {
        self.with_expiry(Expiry::Millis(millis))
    }

    /// Only set if the key does not exist
    pub fn nx(self) -> Result<Self> {
        self.with_existence(Existence::IfAbsent)
    }

    /// Only set if the key already exists
    pub fn xx(self) -> Result<Self> {
        self.with_existence(Existence::IfPresent)
    }

    pub fn expiry(&self) -> Option<Expiry> {
        self.expiry
    }

    pub fn existence(&self) -> Option<Existence> {
        self.existence
    }

    fn with_expiry(mut self, expiry: Expiry) -> Result<Self> {
        if self.expiry.is_some() {
            return Err(Error::Argument("Only one of EX or PX can be set".to_string()));
        }
        let amount = match expiry {
            Expiry::Seconds(n) | Expiry::Millis(n) => n,
        };
        if amount == 0 {
            return Err(Error::Argument("expire time must be positive".to_string()));
        }
        self.expiry = Some(expiry);
        Ok(self)
    }

    fn with_existence(mut self, existence: Existence) -> Result<Self> {
        if self.existence.is_some() {
            return Err(Error::Argument("Only one of NX or XX can be set".to_string()));
        }
        self.existence = Some(existence);
        Ok(self)
    }

    /// Build options from a loose `{"EX" => 10, "NX" => true}` style map
    ///
    /// Keys are matched exactly (`EX`, `PX`, `NX`, `XX`). `EX`/`PX` take an
    /// integer or its decimal text; `NX`/`XX` are set unless the value is
    /// `Flag(false)`.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<OptionValue>,
    {
        let mut options = SetOptions::new();
        let mut unknown = Vec::new();

        for (key, value) in pairs {
            let key = key.as_ref();
            let value = value.into();
            options = match key {
                "EX" => options.ex(expiry_amount(key, &value)?)?,
                "PX" => options.px(expiry_amount(key, &value)?)?,
                "NX" if is_set(&value) => options.nx()?,
                "XX" if is_set(&value) => options.xx()?,
                "NX" | "XX" => options,
                _ => {
                    unknown.push(key.to_string());
                    options
                }
            };
        }

        if !unknown.is_empty() {
            return Err(Error::Argument(format!(
                "unknown option(s) specified {:?}",
                unknown
            )));
        }
        Ok(options)
    }

    /// The option words appended after `key value`
    pub fn to_args(&self) -> Vec<Bytes> {
        let mut args = Vec::with_capacity(3);
        match self.expiry {
            Some(Expiry::Seconds(n)) => {
                args.push(Bytes::from_static(b"EX"));
                args.push(Bytes::from(n.to_string()));
            }
            Some(Expiry::Millis(n)) => {
                args.push(Bytes::from_static(b"PX"));
                args.push(Bytes::from(n.to_string()));
            }
            None => {}
        }
        match self.existence {
            Some(Existence::IfAbsent) => args.push(Bytes::from_static(b"NX")),
            Some(Existence::IfPresent) => args.push(Bytes::from_static(b"XX")),
            None => {}
        }
        args
    }
}

fn expiry_amount(key: &str, value: &OptionValue) -> Result<u64> {
    let parsed = match value {
        OptionValue::Int(n) => u64::try_from(*n).ok(),
        OptionValue::Text(s) => s.parse::<u64>().ok(),
        OptionValue::Flag(_) => None,
    };
    parsed.ok_or_else(|| {
        Error::Argument(format!(
            "{} should be a non-negative integer, but {:?} given",
            key, value
        ))
    })
}

fn is_set(value: &OptionValue) -> bool {
    !matches!(value, OptionValue::Flag(false))
}
