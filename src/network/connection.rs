//! Connection
//!
//! One transport, one logical request/reply stream.
//!
//! ## Request/Response
//! `execute` encodes a command, flushes it and reads exactly one reply.
//!
//! ## Pipelining
//! ```text
//! Idle ──queue──▶ Pipelining(n) ──drain × n──▶ Idle
//! ```
//! `queue` buffers an encoded command and bumps the pending counter;
//! nothing is read. `drain_one` flushes whatever is buffered, reads the
//! oldest outstanding reply and decrements the counter. Replies are never
//! stored, only counted, so they come back strictly in send order.
//!
//! ## Failure
//! Transport and parse errors leave the stream at an unknown position. The
//! connection closes itself and every later call fails with
//! [`Error::Closed`].

use std::io::{BufReader, Write};
use std::path::Path;
use std::time::Duration;

use crate::command::Command;
use crate::config::{Config, Endpoint};
use crate::error::{Error, Result};
use crate::protocol::{Reply, ReplyParser};
use crate::transform::{transform, ReplyRule, Value};

use super::transport::{Stream, Transport};

/// A live transport with its buffers
struct Link<T> {
    /// Buffered reader over the transport; writes go through `get_mut`
    reader: BufReader<T>,

    /// Encoded commands not yet written
    outgoing: Vec<u8>,
}

/// A client connection
///
/// Not shareable: every operation takes `&mut self`, so callers that need
/// concurrency must serialize access themselves.
pub struct Connection<T: Transport = Stream> {
    /// `None` once closed
    link: Option<Link<T>>,

    /// Where this connection points, for accessors and logging
    endpoint: Endpoint,

    /// SO_KEEPALIVE has been enabled
    keepalive: bool,

    /// Commands queued whose replies have not been drained
    pending: usize,

    parser: ReplyParser,
}

impl Connection<Stream> {
    /// Open a connection as described by `config`
    ///
    /// Fails with [`Error::Connection`] if the socket cannot be established
    /// within the connect timeout.
    pub fn connect(config: &Config) -> Result<Self> {
        let stream = Stream::connect(&config.endpoint, Config::duration(config.connect_timeout_ms))?;
        tracing::debug!("Connected to {}", config.endpoint);
        Self::with_transport(stream, config)
    }

    /// Open a TCP connection
    ///
    /// `timeout` bounds the connect and every later read and write. It is
    /// rounded up to whole milliseconds; zero is rejected.
    pub fn open(host: &str, port: u16, timeout: Duration) -> Result<Self> {
        if timeout.is_zero() {
            return Err(Error::Argument("timeout must be greater than zero".to_string()));
        }
        let ms = u64::try_from(timeout.as_nanos().div_ceil(1_000_000)).unwrap_or(u64::MAX);

        let config = Config::builder()
            .tcp(host, port)
            .connect_timeout_ms(ms)
            .read_timeout_ms(ms)
            .write_timeout_ms(ms)
            .build();
        Self::connect(&config)
    }
}

impl<T: Transport> Connection<T> {
    /// Wrap an already connected transport
    ///
    /// Applies the timeouts and keepalive setting from `config`.
    pub fn with_transport(transport: T, config: &Config) -> Result<Self> {
        transport.set_read_timeout(Config::duration(config.read_timeout_ms))?;
        transport.set_write_timeout(Config::duration(config.write_timeout_ms))?;

        let mut connection = Self {
            link: Some(Link {
                reader: BufReader::new(transport),
                outgoing: Vec::new(),
            }),
            endpoint: config.endpoint.clone(),
            keepalive: false,
            pending: 0,
            parser: ReplyParser::new(config.parse_limits),
        };

        if config.keepalive {
            connection.enable_keepalive()?;
        }
        Ok(connection)
    }

    // =========================================================================
    // Request/Response
    // =========================================================================

    /// Send one command and read its reply
    ///
    /// Arguments are validated first; an invalid command writes nothing.
    /// Refuses to run while pipelined replies are pending, since the next
    /// reply on the wire would belong to a queued command.
    pub fn execute(&mut self, command: &Command, rule: ReplyRule) -> Result<Value> {
        command.validate()?;
        self.link()?;
        if self.pending > 0 {
            return Err(Error::PipelinePending(self.pending));
        }

        tracing::trace!("Executing {} ({} args)", command.name_lossy(), command.arguments().len());

        self.buffer(command)?;
        self.flush()?;
        let reply = self.read_reply()?;

        tracing::trace!("Reply to {}: {:?}", command.name_lossy(), reply.tag());
        transform(reply, rule)
    }

    // =========================================================================
    // Pipelining
    // =========================================================================

    /// Queue a command without reading its reply
    ///
    /// The command is buffered and goes out with the next flush; drains
    /// flush before reading.
    pub fn queue(&mut self, command: &Command) -> Result<()> {
        command.validate()?;
        self.link()?;
        let pending = self.pending.checked_add(1).ok_or(Error::QueueOverflow)?;

        self.buffer(command)?;
        self.pending = pending;

        tracing::trace!("Queued {} ({} pending)", command.name_lossy(), self.pending);
        Ok(())
    }

    /// Read the oldest outstanding reply
    ///
    /// Statuses come back as symbols and error replies as
    /// [`Value::Error`], so one failed command does not abort a batch.
    pub fn drain_one(&mut self) -> Result<Value> {
        self.link()?;
        if self.pending == 0 {
            return Err(Error::NothingQueued);
        }

        self.flush()?;
        let reply = self.read_reply()?;
        // The frame has been consumed whatever the transform does with it
        self.pending -= 1;

        tracing::trace!("Drained {:?} ({} pending)", reply.tag(), self.pending);
        transform(reply, ReplyRule::PIPELINE)
    }

    /// Drain every outstanding reply, in send order
    pub fn drain_all(&mut self) -> Result<Vec<Value>> {
        self.link()?;
        if self.pending == 0 {
            return Err(Error::NothingQueued);
        }

        let mut replies = Vec::with_capacity(self.pending);
        while self.pending > 0 {
            replies.push(self.drain_one()?);
        }
        Ok(replies)
    }

    /// Number of queued commands whose replies have not been drained
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Write out buffered commands
    pub fn flush(&mut self) -> Result<()> {
        let link = self.link()?;
        if link.outgoing.is_empty() {
            return Ok(());
        }

        let Link { reader, outgoing } = link;
        let transport = reader.get_mut();
        let written = transport
            .write_all(outgoing)
            .and_then(|_| transport.flush());
        outgoing.clear();

        written.map_err(|e| self.fail(Error::Io(e)))
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Close the connection
    ///
    /// Idempotent. Queued but unsent commands are discarded.
    pub fn close(&mut self) {
        if let Some(link) = self.link.take() {
            let _ = link.reader.get_ref().shutdown();
            tracing::debug!("Closed connection to {}", self.endpoint);
        }
        self.pending = 0;
    }

    pub fn is_closed(&self) -> bool {
        self.link.is_none()
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// TCP host, `None` for unix sockets
    pub fn host(&self) -> Result<Option<&str>> {
        self.link_ref()?;
        Ok(match &self.endpoint {
            Endpoint::Tcp { host, .. } => Some(host.as_str()),
            Endpoint::Unix(_) => None,
        })
    }

    /// TCP port, `None` for unix sockets
    pub fn port(&self) -> Result<Option<u16>> {
        self.link_ref()?;
        Ok(match &self.endpoint {
            Endpoint::Tcp { port, .. } => Some(*port),
            Endpoint::Unix(_) => None,
        })
    }

    /// Socket path, `None` for TCP
    pub fn unix_path(&self) -> Result<Option<&Path>> {
        self.link_ref()?;
        Ok(match &self.endpoint {
            Endpoint::Unix(path) => Some(path.as_path()),
            Endpoint::Tcp { .. } => None,
        })
    }

    /// Whether SO_KEEPALIVE has been enabled
    pub fn keepalive(&self) -> Result<bool> {
        self.link_ref()?;
        Ok(self.keepalive)
    }

    /// Turn on SO_KEEPALIVE
    pub fn enable_keepalive(&mut self) -> Result<()> {
        let link = self.link_ref()?;
        link.reader.get_ref().set_keepalive(true)?;
        self.keepalive = true;
        tracing::debug!("Enabled keepalive on {}", self.endpoint);
        Ok(())
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn link(&mut self) -> Result<&mut Link<T>> {
        self.link.as_mut().ok_or(Error::Closed)
    }

    fn link_ref(&self) -> Result<&Link<T>> {
        self.link.as_ref().ok_or(Error::Closed)
    }

    fn buffer(&mut self, command: &Command) -> Result<()> {
        let link = self.link()?;
        command.encode_into(&mut link.outgoing);
        Ok(())
    }

    fn read_reply(&mut self) -> Result<Reply> {
        let parser = self.parser;
        let link = self.link()?;
        parser.parse(&mut link.reader).map_err(|e| self.fail(e))
    }

    /// Close after an error that leaves the stream unusable
    fn fail(&mut self, err: Error) -> Error {
        if err.is_fatal() {
            tracing::warn!("Closing connection to {}: {}", self.endpoint, err);
            self.close();
        }
        err
    }
}

impl<T: Transport> Drop for Connection<T> {
    fn drop(&mut self) {
        self.close();
    }
}
