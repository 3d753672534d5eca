//! Reply handling rules
//!
//! A [`ReplyRule`] is chosen per call. Each concern is its own enum so a
//! command can switch one behavior without touching the others: `EXISTS`
//! wants integer→boolean, `INCR` does not, and neither cares about empty
//! arrays.

/// How status replies (`+OK`) are surfaced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusPolicy {
    /// As owned text
    #[default]
    Text,

    /// As an interned [`super::Symbol`]
    Symbol,
}

/// How integer replies are surfaced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntegerPolicy {
    /// As the number itself
    #[default]
    Number,

    /// `false` for zero, `true` otherwise
    Boolean,
}

/// How zero-element arrays are surfaced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyArrayPolicy {
    /// As an empty array
    #[default]
    Empty,

    /// As the absent value, same as a nil array
    Nil,
}

/// What happens to error replies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Return `Err` from the call
    #[default]
    Raise,

    /// Return `Ok(Value::Error(..))` for the caller to inspect
    Return,
}

/// Per-call reply handling configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReplyRule {
    pub status: StatusPolicy,
    pub integer: IntegerPolicy,
    pub empty_array: EmptyArrayPolicy,
    pub error: ErrorPolicy,
}

impl ReplyRule {
    /// Everything as-is, errors raised
    pub const DEFAULT: ReplyRule = ReplyRule {
        status: StatusPolicy::Text,
        integer: IntegerPolicy::Number,
        empty_array: EmptyArrayPolicy::Empty,
        error: ErrorPolicy::Raise,
    };

    /// Rule used when draining pipelined replies
    ///
    /// Errors come back as values so one failed command does not abort
    /// collection of the rest of the batch.
    pub const PIPELINE: ReplyRule = ReplyRule::DEFAULT
        .status_to_symbol()
        .return_errors();

    pub const fn new() -> Self {
        Self::DEFAULT
    }

    pub const fn status_to_symbol(mut self) -> Self {
        self.status = StatusPolicy::Symbol;
        self
    }

    pub const fn integer_to_bool(mut self) -> Self {
        self.integer = IntegerPolicy::Boolean;
        self
    }

    pub const fn empty_array_to_nil(mut self) -> Self {
        self.empty_array = EmptyArrayPolicy::Nil;
        self
    }

    pub const fn return_errors(mut self) -> Self {
        self.error = ErrorPolicy::Return;
        self
    }
}
