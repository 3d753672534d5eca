//! # redwire
//!
//! A blocking RESP2 client core with:
//! - Binary-safe request encoding and reply parsing
//! - Per-call reply rules (status as symbol, integer as bool, empty array
//!   as nil, errors raised or returned)
//! - Pipelining with a pending-reply counter
//! - Argument validation before anything touches the wire
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Caller / Typed Wrappers                    │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ Command
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                      Connection                              │
//! │           (execute / queue / drain, pending count)           │
//! └──────────┬───────────────────────────────────▲──────────────┘
//!            │ encode                            │ Value
//!            ▼                                   │
//!   ┌─────────────────┐                 ┌────────┴────────┐
//!   │   WireEncoder   │                 │   Transformer   │
//!   │    (codec)      │                 │   (ReplyRule)   │
//!   └────────┬────────┘                 └────────▲────────┘
//!            │                                   │ Reply
//!            ▼                                   │
//!   ┌─────────────────┐                 ┌────────┴────────┐
//!   │    Transport    │ ──── bytes ───▶ │   ReplyParser   │
//!   │ (TCP / unix)    │                 │                 │
//!   └─────────────────┘                 └─────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod transform;
pub mod command;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Error, ReplyError, Result};
pub use config::{Config, Endpoint};
pub use command::{Command, SetOptions, ToArg};
pub use network::Connection;
pub use protocol::Reply;
pub use transform::{ReplyRule, Symbol, Value};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of redwire
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
