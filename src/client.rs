//! The OpenRGB client.
//!
//! A [`Client`] is a single-threaded, synchronous session: it is created
//! disconnected, becomes connected via [`Client::connect`] and returns to
//! disconnected via [`Client::disconnect`] or any fatal I/O outcome.
//! Reconnecting is the caller's responsibility. At most one request is ever
//! outstanding; replies are matched to it in program order, and unsolicited
//! `DEVICE_LIST_UPDATED` notifications interleaved into the stream are
//! consumed on the fly and recorded in the freshness flag.
//!
//! # Example
//!
//! ```ignore
//! use openrgb_client::{Client, Color, DEFAULT_PORT};
//!
//! let mut client = Client::new("my-app");
//! client.connect("127.0.0.1", DEFAULT_PORT)?;
//!
//! let devices = client.request_device_list()?;
//! for device in &devices {
//!     client.switch_to_custom_mode(device)?;
//!     client.set_device_color(device, Color::RED)?;
//! }
//! ```

use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, warn};

use crate::codec::Writer;
use crate::error::{ConnectError, RequestError, UpdateError, UpdateStatus};
use crate::protocol::device::{Color, Device, DeviceList, Led, Mode, Zone};
use crate::protocol::messages::{
    ReplyControllerCount, ReplyControllerData, ReplyMessage, ReplyProfileList,
    ReplyProtocolVersion, RequestControllerCount, RequestControllerData, RequestDeleteProfile,
    RequestLoadProfile, RequestMessage, RequestProfileList, RequestProtocolVersion,
    RequestSaveProfile, ResizeZone, SaveMode, SetClientName, SetCustomMode, UpdateLeds, UpdateMode,
    UpdateSingleLed, UpdateZoneLeds,
};
use crate::protocol::{build_frame, Header, MessageType, HEADER_SIZE};
use crate::transport::{RecvError, TcpConnectError, TcpTransport};

/// TCP port the server listens on by default.
pub const DEFAULT_PORT: u16 = 6742;

/// Client name announced when none is given.
pub const DEFAULT_CLIENT_NAME: &str = "openrgb-client";

/// Receive timeout installed right after connecting; override with
/// [`Client::set_timeout`].
pub const DEFAULT_RECV_TIMEOUT: Duration = Duration::from_millis(500);

/// Highest protocol version this library implements.
///
/// The negotiated version is the minimum of this and what the server
/// reports, and gates the optional record fields on the wire.
pub const IMPLEMENTED_PROTOCOL_VERSION: u32 = 3;

/// OpenRGB network client. Connect one to the OpenRGB service to enumerate
/// RGB hardware and push color, mode and profile changes to it.
///
/// All operations take `&mut self`: a `Client` cannot be shared between
/// threads without external synchronization, and must not be, because the
/// freshness check temporarily flips the socket's blocking mode.
pub struct Client {
    client_name: String,
    transport: TcpTransport,
    negotiated_version: u32,
    device_list_out_of_date: bool,
}

impl Client {
    /// Create a disconnected client that will announce itself under the
    /// given name.
    pub fn new(client_name: impl Into<String>) -> Self {
        Self {
            client_name: client_name.into(),
            transport: TcpTransport::new(),
            negotiated_version: 0,
            device_list_out_of_date: false,
        }
    }

    /// Whether the session currently holds a live connection.
    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    /// Protocol version negotiated during [`Client::connect`]; 0 while
    /// disconnected.
    pub fn negotiated_protocol_version(&self) -> u32 {
        self.negotiated_version
    }

    /// Whether a device-list change notification has been observed since the
    /// last [`Client::request_device_list`].
    ///
    /// Set on connect as well, so a caller can drive a single
    /// "reconnect if needed, refresh if stale" loop off this one flag.
    pub fn is_device_list_out_of_date(&self) -> bool {
        self.device_list_out_of_date
    }

    /// Raw OS error code of the most recent system-level failure, for
    /// diagnostics.
    pub fn last_system_error(&self) -> Option<i32> {
        self.transport.last_system_error()
    }

    /// Human-readable form of [`Client::last_system_error`].
    pub fn last_system_error_string(&self) -> Option<String> {
        self.transport
            .last_system_error()
            .map(|code| std::io::Error::from_raw_os_error(code).to_string())
    }

    /// Connect to the server, negotiate the protocol version and announce
    /// the client name.
    ///
    /// On any failure after the TCP connection was established, the socket
    /// is closed again before the error is returned, so the session is back
    /// in the disconnected state it started from.
    pub fn connect(&mut self, host: &str, port: u16) -> Result<(), ConnectError> {
        self.transport.connect(host, port).map_err(|e| match e {
            TcpConnectError::AlreadyConnected => ConnectError::AlreadyConnected,
            TcpConnectError::HostNotResolved => ConnectError::HostNotResolved,
            TcpConnectError::ConnectFailed => ConnectError::ConnectFailed,
        })?;

        // a sane default so a dead server cannot hang the caller forever
        if !self.transport.set_timeout(DEFAULT_RECV_TIMEOUT) {
            self.transport.disconnect();
            return Err(ConnectError::OtherSystemError);
        }

        self.negotiated_version = 0;

        if !self.send_message(&RequestProtocolVersion {
            version: IMPLEMENTED_PROTOCOL_VERSION,
        }) {
            self.transport.disconnect();
            return Err(ConnectError::RequestVersionFailed);
        }
        let server_version = match self.await_reply::<ReplyProtocolVersion>() {
            Ok(reply) => reply.version,
            Err(_) => {
                self.transport.disconnect();
                return Err(ConnectError::RequestVersionFailed);
            }
        };

        if server_version == 0 {
            // the very first version-less protocol is not supported
            self.transport.disconnect();
            return Err(ConnectError::VersionNotSupported);
        }
        self.negotiated_version = IMPLEMENTED_PROTOCOL_VERSION.min(server_version);
        debug!(
            server = server_version,
            negotiated = self.negotiated_version,
            "protocol version negotiated"
        );

        if !self.send_message(&SetClientName {
            name: self.client_name.clone(),
        }) {
            self.transport.disconnect();
            return Err(ConnectError::SendNameFailed);
        }

        // There is no list yet, but starting out "stale" means callers only
        // ever need to react to one flag.
        self.device_list_out_of_date = true;

        Ok(())
    }

    /// Close the connection. Returns whether a live connection was actually
    /// torn down. Idempotent.
    pub fn disconnect(&mut self) -> bool {
        self.negotiated_version = 0;
        self.transport.disconnect()
    }

    /// Override the receive timeout for replies.
    ///
    /// Only valid while connected, because the OS socket does not exist
    /// before; returns whether the timeout was applied.
    pub fn set_timeout(&mut self, timeout: Duration) -> bool {
        self.transport.set_timeout(timeout)
    }

    /// Download the full device list.
    ///
    /// Runs in two phases: fetch the device count, then each device record.
    /// If a `DEVICE_LIST_UPDATED` notification interleaves anywhere in the
    /// sweep, records already in hand may describe pre-update state, so the
    /// accumulated list is discarded and the sweep restarts from the count
    /// phase. The sweep finishes when a full pass completes with no
    /// notification observed.
    ///
    /// Any previously obtained [`Device`], [`Zone`], [`Led`] or [`Mode`]
    /// indices are invalidated by a successful call.
    pub fn request_device_list(&mut self) -> Result<DeviceList, RequestError> {
        self.ensure_connected()?;

        loop {
            self.device_list_out_of_date = false;
            let mut devices = Vec::new();

            self.send_request(&RequestControllerCount)?;
            let count = self.await_reply::<ReplyControllerCount>()?.count;

            for device_idx in 0..count {
                self.send_request(&RequestControllerData { device_idx })?;
                let reply = self.await_reply::<ReplyControllerData>()?;
                if reply.device.idx != device_idx {
                    warn!(
                        requested = device_idx,
                        received = reply.device.idx,
                        "device record for the wrong index"
                    );
                    return Err(RequestError::InvalidReply);
                }
                devices.push(reply.device);
            }

            if !self.device_list_out_of_date {
                return Ok(DeviceList::new(devices));
            }
            debug!("device list changed mid-download, starting over");
        }
    }

    /// Ask how many devices the server currently exposes.
    pub fn request_device_count(&mut self) -> Result<u32, RequestError> {
        self.ensure_connected()?;
        self.send_request(&RequestControllerCount)?;
        Ok(self.await_reply::<ReplyControllerCount>()?.count)
    }

    /// Download a single device record.
    pub fn request_device_info(&mut self, device_idx: u32) -> Result<Device, RequestError> {
        self.ensure_connected()?;
        self.send_request(&RequestControllerData { device_idx })?;
        let reply = self.await_reply::<ReplyControllerData>()?;
        if reply.device.idx != device_idx {
            return Err(RequestError::InvalidReply);
        }
        Ok(reply.device)
    }

    /// Check whether the device list downloaded earlier is still current,
    /// without blocking.
    ///
    /// If a notification was already observed, reports stale immediately and
    /// does not touch the socket. Otherwise the socket is switched to
    /// non-blocking mode for one header-sized peek and switched back; if it
    /// cannot be switched back, the connection is closed and
    /// [`UpdateError::CantRestoreSocket`] reported, so a live session's
    /// socket is always blocking outside this function.
    pub fn check_for_device_updates(&mut self) -> Result<UpdateStatus, UpdateError> {
        if !self.is_connected() {
            return Err(UpdateError::NotConnected);
        }
        if self.device_list_out_of_date {
            // cached discovery, keep reporting stale until the list is
            // requested again
            return Ok(UpdateStatus::OutOfDate);
        }

        if !self.transport.set_blocking(false) {
            return Err(UpdateError::Other);
        }

        let result = self.peek_for_notification();

        if !self.transport.set_blocking(true) {
            // the socket mode is now undefined, burn it down rather than
            // let the session continue in an inconsistent state
            warn!("failed to restore blocking mode, closing the connection");
            self.disconnect();
            return Err(UpdateError::CantRestoreSocket);
        }

        result
    }

    fn peek_for_notification(&mut self) -> Result<UpdateStatus, UpdateError> {
        let header_bytes = match self.transport.receive_exact(HEADER_SIZE) {
            Ok(bytes) => bytes,
            Err(RecvError::WouldBlock) => return Ok(UpdateStatus::UpToDate),
            Err(RecvError::Closed) => return Err(UpdateError::ConnectionClosed),
            Err(RecvError::Timeout) | Err(RecvError::Other) => return Err(UpdateError::Other),
        };

        match Header::decode(&header_bytes) {
            Ok(header) if header.is(MessageType::DeviceListUpdated) => {
                debug!("device list update notification received");
                self.device_list_out_of_date = true;
                Ok(UpdateStatus::OutOfDate)
            }
            _ => {
                // 16 bytes are consumed with no way to resynchronize; the
                // session has to be treated as broken
                warn!("unsolicited non-notification traffic on the socket");
                Err(UpdateError::UnexpectedMessage)
            }
        }
    }

    /// Switch a device to its direct-control mode.
    ///
    /// Call this before pushing colors, and give the device a few
    /// milliseconds to apply it.
    pub fn switch_to_custom_mode(&mut self, device: &Device) -> Result<(), RequestError> {
        self.ensure_connected()?;
        self.send_request(&SetCustomMode {
            device_idx: device.idx,
        })
    }

    /// Activate a mode on a device.
    pub fn change_mode(&mut self, device: &Device, mode: &Mode) -> Result<(), RequestError> {
        self.ensure_connected()?;
        self.send_request(&UpdateMode {
            device_idx: device.idx,
            mode_idx: mode.idx,
            mode,
        })
    }

    /// Activate a mode on a device and persist it on the device.
    pub fn save_mode(&mut self, device: &Device, mode: &Mode) -> Result<(), RequestError> {
        self.ensure_connected()?;
        self.send_request(&SaveMode {
            device_idx: device.idx,
            mode_idx: mode.idx,
            mode,
        })
    }

    /// Set one unified color for the whole device.
    pub fn set_device_color(&mut self, device: &Device, color: Color) -> Result<(), RequestError> {
        self.ensure_connected()?;
        let colors = vec![color; device.leds.len()];
        self.send_request(&UpdateLeds {
            device_idx: device.idx,
            colors: &colors,
        })
    }

    /// Set one unified color for a zone.
    pub fn set_zone_color(&mut self, zone: &Zone, color: Color) -> Result<(), RequestError> {
        self.ensure_connected()?;
        let colors = vec![color; zone.leds_count as usize];
        self.send_request(&UpdateZoneLeds {
            device_idx: zone.parent_idx,
            zone_idx: zone.idx,
            colors: &colors,
        })
    }

    /// Resize a zone, if the device supports it.
    pub fn set_zone_size(&mut self, zone: &Zone, new_size: u32) -> Result<(), RequestError> {
        self.ensure_connected()?;
        self.send_request(&ResizeZone {
            device_idx: zone.parent_idx,
            zone_idx: zone.idx,
            new_size,
        })
    }

    /// Set the color of one LED.
    pub fn set_led_color(&mut self, led: &Led, color: Color) -> Result<(), RequestError> {
        self.ensure_connected()?;
        self.send_request(&UpdateSingleLed {
            device_idx: led.parent_idx,
            led_idx: led.idx,
            color,
        })
    }

    /// List the profiles stored on the server.
    pub fn request_profile_list(&mut self) -> Result<Vec<String>, RequestError> {
        self.ensure_connected()?;
        self.send_request(&RequestProfileList)?;
        Ok(self.await_reply::<ReplyProfileList>()?.profiles)
    }

    /// Persist the current state of all devices under a profile name.
    pub fn save_profile(&mut self, name: &str) -> Result<(), RequestError> {
        self.ensure_connected()?;
        self.send_request(&RequestSaveProfile { name })
    }

    /// Apply a stored profile.
    pub fn load_profile(&mut self, name: &str) -> Result<(), RequestError> {
        self.ensure_connected()?;
        self.send_request(&RequestLoadProfile { name })
    }

    /// Remove a stored profile.
    pub fn delete_profile(&mut self, name: &str) -> Result<(), RequestError> {
        self.ensure_connected()?;
        self.send_request(&RequestDeleteProfile { name })
    }

    fn ensure_connected(&self) -> Result<(), RequestError> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(RequestError::NotConnected)
        }
    }

    /// Serialize a message into a frame and send it.
    fn send_message<M: RequestMessage>(&mut self, message: &M) -> bool {
        let mut body = Writer::new();
        message.encode_body(&mut body, self.negotiated_version);
        let body = body.into_bytes();
        let header = Header::new(message.device_idx(), M::TYPE, body.len() as u32);
        self.transport.send(&build_frame(&header, &body))
    }

    fn send_request<M: RequestMessage>(&mut self, message: &M) -> Result<(), RequestError> {
        if self.send_message(message) {
            Ok(())
        } else {
            Err(RequestError::SendRequestFailed)
        }
    }

    /// Block until a reply of the expected type arrives.
    ///
    /// The server may emit a `DEVICE_LIST_UPDATED` notification before it
    /// has processed our request, so notification headers found in front of
    /// the reply are consumed here (they carry no body) and recorded in the
    /// freshness flag. Any other message type in place of the reply is an
    /// [`RequestError::InvalidReply`].
    fn await_reply<M: ReplyMessage>(&mut self) -> Result<M, RequestError> {
        let header = loop {
            let header_bytes = self.receive_or_close(HEADER_SIZE)?;
            let header = match Header::decode(&header_bytes) {
                Ok(header) => header,
                Err(e) => {
                    warn!(error = %e, "received a malformed reply header");
                    return Err(RequestError::InvalidReply);
                }
            };
            if header.is(MessageType::DeviceListUpdated) {
                debug!("device list update notification interleaved with a reply");
                self.device_list_out_of_date = true;
                continue;
            }
            break header;
        };

        if !header.is(M::TYPE) {
            warn!(
                message_type = header.message_type,
                "received a reply of an unexpected type"
            );
            return Err(RequestError::InvalidReply);
        }

        let body = self.receive_or_close(header.body_size as usize)?;
        M::decode_body(&header, &body, self.negotiated_version).map_err(|e| {
            warn!(error = %e, "failed to decode reply body");
            RequestError::InvalidReply
        })
    }

    fn receive_or_close(&mut self, n: usize) -> Result<Bytes, RequestError> {
        match self.transport.receive_exact(n) {
            Ok(bytes) => Ok(bytes),
            Err(RecvError::Closed) => Err(RequestError::ConnectionClosed),
            Err(RecvError::Timeout) | Err(RecvError::WouldBlock) => {
                // the inbound stream is at an unknown position after a
                // timeout; close rather than hand out desynchronized frames
                warn!("no reply within the timeout, closing the connection");
                self.disconnect();
                Err(RequestError::NoReply)
            }
            Err(RecvError::Other) => Err(RequestError::ReceiveError),
        }
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new(DEFAULT_CLIENT_NAME)
    }
}
