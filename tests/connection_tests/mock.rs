//! In-memory transport for connection tests
//!
//! Replies are canned up front; everything written is recorded in a log
//! shared with the test.

use std::io::{self, Cursor, Read, Write};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use redwire::network::Transport;
use redwire::protocol::{encode_reply, Reply};
use redwire::{Config, Connection};

pub struct MockTransport {
    replies: Cursor<Vec<u8>>,
    written: Arc<Mutex<Vec<u8>>>,
    fail_writes: bool,
}

/// Test-side handle onto the mock's write log
#[derive(Clone)]
pub struct WriteLog(Arc<Mutex<Vec<u8>>>);

impl WriteLog {
    pub fn bytes(&self) -> Vec<u8> {
        self.0.lock().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }
}

impl MockTransport {
    pub fn new(replies: &[Reply]) -> (Self, WriteLog) {
        let mut bytes = Vec::new();
        for reply in replies {
            bytes.extend_from_slice(&encode_reply(reply));
        }
        Self::raw(bytes)
    }

    /// Serve exactly these bytes, valid framing or not
    pub fn raw(bytes: impl Into<Vec<u8>>) -> (Self, WriteLog) {
        let written = Arc::new(Mutex::new(Vec::new()));
        let transport = Self {
            replies: Cursor::new(bytes.into()),
            written: Arc::clone(&written),
            fail_writes: false,
        };
        (transport, WriteLog(written))
    }

    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }
}

impl Read for MockTransport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.replies.read(buf)
    }
}

impl Write for MockTransport {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.fail_writes {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "broken pipe"));
        }
        self.written.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Transport for MockTransport {
    fn set_read_timeout(&self, _timeout: Option<Duration>) -> io::Result<()> {
        Ok(())
    }

    fn set_write_timeout(&self, _timeout: Option<Duration>) -> io::Result<()> {
        Ok(())
    }
}

/// Connection over a mock serving `replies`
pub fn connection(replies: &[Reply]) -> (Connection<MockTransport>, WriteLog) {
    let (transport, log) = MockTransport::new(replies);
    let conn = Connection::with_transport(transport, &Config::default()).unwrap();
    (conn, log)
}
