//! Network Module
//!
//! Client connections over TCP or unix sockets.
//!
//! ## Architecture
//! - One blocking transport per [`Connection`]
//! - Request/response through `execute`, pipelining through `queue`/`drain`
//! - Typed wrappers for the common commands on top of `execute`

mod commands;
mod connection;
mod transport;

pub use connection::Connection;
pub use transport::{Stream, Transport};
