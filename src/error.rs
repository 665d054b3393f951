//! Error types for the OpenRGB client.
//!
//! Every fallible public operation reports its outcome as a value; nothing in
//! this crate panics across the public surface. The enums are fieldless and
//! `Copy` so callers can match and compare them freely. The OS error code
//! behind a system-level failure is kept separately and can be queried via
//! [`Client::last_system_error`](crate::Client::last_system_error).

use thiserror::Error;

/// All the ways the connect operation can fail.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConnectError {
    /// The underlying OS networking stack could not be initialized.
    ///
    /// Reserved for platforms that need explicit initialization; `std::net`
    /// performs it implicitly, so this variant is currently never produced.
    #[error("the underlying networking system could not be initialized")]
    NetworkingInitFailed,

    /// The socket is already connected. Call `disconnect()` first.
    #[error("the socket is already connected, call disconnect() first")]
    AlreadyConnected,

    /// The hostname could not be resolved to an IP address.
    #[error("the hostname could not be resolved to an IP address")]
    HostNotResolved,

    /// Could not connect to the target server, either it's down or the port
    /// is closed.
    #[error("could not connect to the target server")]
    ConnectFailed,

    /// Failed to send our protocol version or receive the server's.
    #[error("failed to exchange protocol versions with the server")]
    RequestVersionFailed,

    /// The server speaks the version-less legacy protocol, which is not
    /// supported.
    #[error("the protocol version of the server is not supported")]
    VersionNotSupported,

    /// Failed to announce the client name to the server.
    #[error("failed to send the client name to the server")]
    SendNameFailed,

    /// Other system error. Check `last_system_error()` for details.
    #[error("other system error")]
    OtherSystemError,

    /// Internal error of this library.
    #[error("internal error of this library")]
    Unexpected,
}

/// All the ways a request can fail.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RequestError {
    /// The client is not connected. Call `connect()` first.
    #[error("the client is not connected, call connect() first")]
    NotConnected,

    /// Failed to send the request message.
    #[error("failed to send the request message")]
    SendRequestFailed,

    /// The server has closed the connection.
    #[error("the server has closed the connection")]
    ConnectionClosed,

    /// No reply arrived from the server within the receive timeout.
    ///
    /// The inbound stream is at an unknown position after a timeout, so the
    /// session force-closes its socket before reporting this. Reconnect
    /// before issuing further requests.
    #[error("no reply arrived from the server within the receive timeout")]
    NoReply,

    /// Some other error occurred while receiving a reply. Check
    /// `last_system_error()` for details.
    #[error("error while receiving a reply from the server")]
    ReceiveError,

    /// The reply from the server is invalid.
    #[error("the reply from the server is invalid")]
    InvalidReply,

    /// Internal error of this library.
    #[error("internal error of this library")]
    Unexpected,
}

/// Outcome of a successful device-list freshness check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStatus {
    /// The device list downloaded earlier still seems up to date.
    UpToDate,
    /// The server announced a device-list change. Call
    /// `request_device_list()` again.
    OutOfDate,
}

/// All the ways a device-list freshness check can fail.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum UpdateError {
    /// The client is not connected. Call `connect()` first.
    #[error("the client is not connected, call connect() first")]
    NotConnected,

    /// The server has closed the connection.
    #[error("the server has closed the connection")]
    ConnectionClosed,

    /// The server sent unsolicited traffic that is not a device-list
    /// notification. 16 header bytes have been consumed from the stream and
    /// resynchronization is not possible; treat the session as broken and
    /// reconnect.
    #[error("the server sent an unexpected unsolicited message")]
    UnexpectedMessage,

    /// The socket could not be restored to blocking mode and has been
    /// closed. Check `last_system_error()` for details.
    #[error("failed to restore the socket to blocking mode, connection closed")]
    CantRestoreSocket,

    /// Other system error. Check `last_system_error()` for details.
    #[error("other system error")]
    Other,
}

/// Failure modes of the wire codec.
///
/// Never surfaced directly by [`Client`](crate::Client) operations; a reply
/// that fails to decode is reported as [`RequestError::InvalidReply`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The data ended before the field being read was complete.
    #[error("unexpected end of data")]
    UnexpectedEnd,

    /// A length-prefixed string did not end with a NUL byte.
    #[error("string is missing its NUL terminator")]
    MissingTerminator,

    /// The header does not start with the `"ORGB"` magic.
    #[error("header magic does not match \"ORGB\"")]
    BadMagic,

    /// A declared record size does not agree with the bytes actually
    /// available.
    #[error("declared size is inconsistent with the available data")]
    SizeMismatch,

    /// A load-bearing enum field carried a value outside the known range.
    #[error("value {value} is out of range for {field}")]
    InvalidEnum {
        /// Which field was being decoded.
        field: &'static str,
        /// The raw value found on the wire.
        value: u32,
    },
}
