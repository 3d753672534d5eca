//! Transport
//!
//! The byte stream a connection talks over.

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
#[cfg(unix)]
use std::os::unix::net::UnixStream;
use std::time::Duration;

use crate::config::Endpoint;
use crate::error::{Error, Result};

/// A connected, blocking byte stream
///
/// Implemented for TCP and unix sockets; tests plug in in-memory streams.
pub trait Transport: Read + Write {
    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()>;

    fn set_write_timeout(&self, timeout: Option<Duration>) -> io::Result<()>;

    /// Toggle SO_KEEPALIVE
    fn set_keepalive(&self, _enabled: bool) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "keepalive is not supported by this transport",
        ))
    }

    /// Shut down both directions
    fn shutdown(&self) -> io::Result<()> {
        Ok(())
    }
}

impl Transport for TcpStream {
    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        TcpStream::set_read_timeout(self, timeout)
    }

    fn set_write_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        TcpStream::set_write_timeout(self, timeout)
    }

    #[cfg(unix)]
    fn set_keepalive(&self, enabled: bool) -> io::Result<()> {
        use std::os::unix::io::AsRawFd;

        let optval: libc::c_int = enabled as libc::c_int;
        // SAFETY: the fd stays open while `self` is borrowed, and `optval`
        // outlives the call with the length passed alongside it.
        let rc = unsafe {
            libc::setsockopt(
                self.as_raw_fd(),
                libc::SOL_SOCKET,
                libc::SO_KEEPALIVE,
                &optval as *const _ as *const libc::c_void,
                std::mem::size_of::<libc::c_int>() as libc::socklen_t,
            )
        };
        if rc != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    fn shutdown(&self) -> io::Result<()> {
        TcpStream::shutdown(self, Shutdown::Both)
    }
}

#[cfg(unix)]
impl Transport for UnixStream {
    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        UnixStream::set_read_timeout(self, timeout)
    }

    fn set_write_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        UnixStream::set_write_timeout(self, timeout)
    }

    fn shutdown(&self) -> io::Result<()> {
        UnixStream::shutdown(self, Shutdown::Both)
    }
}

/// A socket opened from an [`Endpoint`]
#[derive(Debug)]
pub enum Stream {
    Tcp(TcpStream),
    #[cfg(unix)]
    Unix(UnixStream),
}

impl Stream {
    /// Open a socket to `endpoint`
    ///
    /// Every resolved address is tried in turn; the last failure is
    /// reported if none accepts.
    pub fn connect(endpoint: &Endpoint, timeout: Option<Duration>) -> Result<Self> {
        match endpoint {
            Endpoint::Tcp { host, port } => {
                let addrs = (host.as_str(), *port)
                    .to_socket_addrs()
                    .map_err(|e| setup_error(endpoint, "resolve", e))?;

                let mut last_err = None;
                for addr in addrs {
                    let attempt = match timeout {
                        Some(timeout) => TcpStream::connect_timeout(&addr, timeout),
                        None => TcpStream::connect(addr),
                    };
                    match attempt {
                        Ok(stream) => {
                            // Disable Nagle's algorithm for low latency
                            stream
                                .set_nodelay(true)
                                .map_err(|e| setup_error(endpoint, "configure", e))?;
                            return Ok(Stream::Tcp(stream));
                        }
                        Err(e) => {
                            tracing::debug!("Connect to {} failed: {}", addr, e);
                            last_err = Some(e);
                        }
                    }
                }

                Err(match last_err {
                    Some(e) => setup_error(endpoint, "connect to", e),
                    None => Error::Connection(format!("no addresses found for {}", endpoint)),
                })
            }
            #[cfg(unix)]
            Endpoint::Unix(path) => UnixStream::connect(path)
                .map(Stream::Unix)
                .map_err(|e| setup_error(endpoint, "connect to", e)),
            #[cfg(not(unix))]
            Endpoint::Unix(_) => Err(Error::Connection(format!(
                "unix sockets are not supported on this platform: {}",
                endpoint
            ))),
        }
    }
}

/// Any failure while establishing a socket is a connection error, never bare I/O
fn setup_error(endpoint: &Endpoint, action: &str, err: io::Error) -> Error {
    Error::Connection(format!("could not {} {}: {}", action, endpoint, err))
}

impl Read for Stream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Stream::Tcp(s) => s.read(buf),
            #[cfg(unix)]
            Stream::Unix(s) => s.read(buf),
        }
    }
}

impl Write for Stream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Stream::Tcp(s) => s.write(buf),
            #[cfg(unix)]
            Stream::Unix(s) => s.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Stream::Tcp(s) => s.flush(),
            #[cfg(unix)]
            Stream::Unix(s) => s.flush(),
        }
    }
}

impl Transport for Stream {
    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        match self {
            Stream::Tcp(s) => Transport::set_read_timeout(s, timeout),
            #[cfg(unix)]
            Stream::Unix(s) => Transport::set_read_timeout(s, timeout),
        }
    }

    fn set_write_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        match self {
            Stream::Tcp(s) => Transport::set_write_timeout(s, timeout),
            #[cfg(unix)]
            Stream::Unix(s) => Transport::set_write_timeout(s, timeout),
        }
    }

    fn set_keepalive(&self, enabled: bool) -> io::Result<()> {
        match self {
            Stream::Tcp(s) => Transport::set_keepalive(s, enabled),
            #[cfg(unix)]
            Stream::Unix(s) => Transport::set_keepalive(s, enabled),
        }
    }

    fn shutdown(&self) -> io::Result<()> {
        match self {
            Stream::Tcp(s) => Transport::shutdown(s),
            #[cfg(unix)]
            Stream::Unix(s) => Transport::shutdown(s),
        }
    }
}
