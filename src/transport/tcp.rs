//! Blocking TCP transport with a receive timeout and a blocking-mode toggle.
//!
//! The session runs the socket in blocking mode with a receive timeout; the
//! freshness check flips it to non-blocking for a single peek and flips it
//! back. Partial reads are accumulated in an internal buffer, so a
//! `receive_exact` interrupted by `WouldBlock` or a timeout never loses
//! bytes and a later call resumes exactly where the stream left off.

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;

use bytes::{Bytes, BytesMut};

/// Failure modes of [`TcpTransport::receive_exact`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecvError {
    /// The peer closed the connection.
    Closed,
    /// A blocking read hit the receive timeout.
    Timeout,
    /// A non-blocking read found no (or not yet enough) data.
    WouldBlock,
    /// Any other socket error, or the transport is not connected.
    Other,
}

/// Failure modes of [`TcpTransport::connect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TcpConnectError {
    /// The transport already holds a live connection.
    AlreadyConnected,
    /// The host name did not resolve to any address.
    HostNotResolved,
    /// No resolved address accepted the connection.
    ConnectFailed,
}

/// A client TCP connection.
pub struct TcpTransport {
    stream: Option<TcpStream>,
    /// Bytes received but not yet handed out by `receive_exact`.
    pending: BytesMut,
    /// Mirrors the kernel-side O_NONBLOCK state of `stream`.
    nonblocking: bool,
    last_os_error: Option<i32>,
}

impl TcpTransport {
    pub fn new() -> Self {
        Self {
            stream: None,
            pending: BytesMut::new(),
            nonblocking: false,
            last_os_error: None,
        }
    }

    /// Whether a connection is currently held.
    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Raw OS error code of the most recent system-level failure.
    pub fn last_system_error(&self) -> Option<i32> {
        self.last_os_error
    }

    /// Resolve `host` and connect to the first address that accepts.
    pub fn connect(&mut self, host: &str, port: u16) -> Result<(), TcpConnectError> {
        if self.stream.is_some() {
            return Err(TcpConnectError::AlreadyConnected);
        }

        let addrs: Vec<_> = match (host, port).to_socket_addrs() {
            Ok(addrs) => addrs.collect(),
            Err(e) => {
                self.last_os_error = e.raw_os_error();
                return Err(TcpConnectError::HostNotResolved);
            }
        };
        if addrs.is_empty() {
            return Err(TcpConnectError::HostNotResolved);
        }

        match TcpStream::connect(&addrs[..]) {
            Ok(stream) => {
                self.stream = Some(stream);
                self.pending.clear();
                self.nonblocking = false;
                Ok(())
            }
            Err(e) => {
                self.last_os_error = e.raw_os_error();
                Err(TcpConnectError::ConnectFailed)
            }
        }
    }

    /// Close the connection. Returns whether a live connection was actually
    /// torn down. Idempotent.
    pub fn disconnect(&mut self) -> bool {
        self.pending.clear();
        self.nonblocking = false;
        match self.stream.take() {
            Some(stream) => {
                // a shutdown error means the peer already dropped the
                // connection, which is what the caller wanted anyway
                let _ = stream.shutdown(Shutdown::Both);
                true
            }
            None => false,
        }
    }

    /// Set the receive timeout for blocking reads.
    ///
    /// Only valid while connected; the OS socket does not exist before.
    pub fn set_timeout(&mut self, timeout: Duration) -> bool {
        let Some(stream) = &self.stream else {
            return false;
        };
        match stream.set_read_timeout(Some(timeout)) {
            Ok(()) => true,
            Err(e) => {
                self.last_os_error = e.raw_os_error();
                false
            }
        }
    }

    /// Switch the socket between blocking and non-blocking mode.
    ///
    /// Idempotent: switching to the current mode succeeds without touching
    /// the socket.
    pub fn set_blocking(&mut self, blocking: bool) -> bool {
        let Some(stream) = &self.stream else {
            return false;
        };
        if self.nonblocking == !blocking {
            return true;
        }
        match stream.set_nonblocking(!blocking) {
            Ok(()) => {
                self.nonblocking = !blocking;
                true
            }
            Err(e) => {
                self.last_os_error = e.raw_os_error();
                false
            }
        }
    }

    /// Send all the given bytes.
    pub fn send(&mut self, bytes: &[u8]) -> bool {
        let result = match self.stream.as_mut() {
            Some(stream) => stream.write_all(bytes),
            None => return false,
        };
        match result {
            Ok(()) => true,
            Err(e) => {
                self.last_os_error = e.raw_os_error();
                false
            }
        }
    }

    /// Receive exactly `n` bytes.
    ///
    /// On [`RecvError::Timeout`] or [`RecvError::WouldBlock`] any bytes read
    /// so far stay buffered for the next call.
    pub fn receive_exact(&mut self, n: usize) -> Result<Bytes, RecvError> {
        let mut chunk = [0u8; 4096];
        loop {
            if self.pending.len() >= n {
                return Ok(self.pending.split_to(n).freeze());
            }
            let want = (n - self.pending.len()).min(chunk.len());
            let result = match self.stream.as_mut() {
                Some(stream) => stream.read(&mut chunk[..want]),
                None => return Err(RecvError::Other),
            };
            match result {
                Ok(0) => return Err(RecvError::Closed),
                Ok(got) => self.pending.extend_from_slice(&chunk[..got]),
                Err(e) => match e.kind() {
                    io::ErrorKind::Interrupted => {}
                    // both modes surface as WouldBlock/TimedOut depending on
                    // the platform; the tracked mode disambiguates
                    io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => {
                        return Err(if self.nonblocking {
                            RecvError::WouldBlock
                        } else {
                            RecvError::Timeout
                        });
                    }
                    _ => {
                        self.last_os_error = e.raw_os_error();
                        return Err(RecvError::Other);
                    }
                },
            }
        }
    }
}

impl Default for TcpTransport {
    fn default() -> Self {
        Self::new()
    }
}
