//! Wire format encoding and decoding.
//!
//! Every frame starts with the fixed 16-byte header:
//!
//! ```text
//! ┌──────────┬────────────┬──────────────┬───────────┐
//! │ Magic    │ Device idx │ Message type │ Body size │
//! │ 4 bytes  │ 4 bytes    │ 4 bytes      │ 4 bytes   │
//! │ "ORGB"   │ uint32 LE  │ uint32 LE    │ uint32 LE │
//! └──────────┴────────────┴──────────────┴───────────┘
//! ```
//!
//! All multi-byte integers are Little Endian.

use crate::error::DecodeError;

/// The 4-byte magic every frame starts with.
pub const MAGIC: [u8; 4] = *b"ORGB";

/// Header size in bytes (fixed, exactly 16).
pub const HEADER_SIZE: usize = 16;

/// Message type codes of the OpenRGB SDK protocol.
///
/// Codes match the reference server. Messages the client only ever sends and
/// messages it only ever receives share one namespace; request/reply pairs
/// (controller count, controller data, protocol version, profile list) reuse
/// the same code in both directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum MessageType {
    /// Ask for the number of devices.
    RequestControllerCount = 0,
    /// Ask for one device record.
    RequestControllerData = 1,
    /// Advertise the client's protocol version; the reply carries the
    /// server's.
    RequestProtocolVersion = 40,
    /// Announce the client's display name.
    SetClientName = 50,
    /// Unsolicited notification that the server's device list changed.
    DeviceListUpdated = 100,
    /// List the profiles stored on the server.
    RequestProfileList = 150,
    /// Persist the current state under a profile name.
    RequestSaveProfile = 151,
    /// Apply a stored profile.
    RequestLoadProfile = 152,
    /// Remove a stored profile.
    RequestDeleteProfile = 153,
    /// Resize a zone.
    ResizeZone = 1000,
    /// Set the colors of all LEDs of a device.
    UpdateLeds = 1050,
    /// Set the colors of all LEDs of one zone.
    UpdateZoneLeds = 1051,
    /// Set the color of a single LED.
    UpdateSingleLed = 1052,
    /// Switch a device to its direct-control mode.
    SetCustomMode = 1100,
    /// Change the active mode of a device.
    UpdateMode = 1101,
    /// Change and persist the active mode of a device.
    SaveMode = 1102,
}

impl MessageType {
    /// Map a raw wire value back to a known message type.
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::RequestControllerCount),
            1 => Some(Self::RequestControllerData),
            40 => Some(Self::RequestProtocolVersion),
            50 => Some(Self::SetClientName),
            100 => Some(Self::DeviceListUpdated),
            150 => Some(Self::RequestProfileList),
            151 => Some(Self::RequestSaveProfile),
            152 => Some(Self::RequestLoadProfile),
            153 => Some(Self::RequestDeleteProfile),
            1000 => Some(Self::ResizeZone),
            1050 => Some(Self::UpdateLeds),
            1051 => Some(Self::UpdateZoneLeds),
            1052 => Some(Self::UpdateSingleLed),
            1100 => Some(Self::SetCustomMode),
            1101 => Some(Self::UpdateMode),
            1102 => Some(Self::SaveMode),
            _ => None,
        }
    }
}

/// Decoded frame header.
///
/// `message_type` stays a raw `u32` so that unknown unsolicited traffic is
/// still representable; compare against known types with [`Header::is`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Index of the device this frame concerns (0 where meaningless).
    pub device_idx: u32,
    /// Raw message type code.
    pub message_type: u32,
    /// Length of the body following the header, in bytes.
    pub body_size: u32,
}

impl Header {
    /// Create a new header.
    pub fn new(device_idx: u32, message_type: MessageType, body_size: u32) -> Self {
        Self {
            device_idx,
            message_type: message_type as u32,
            body_size,
        }
    }

    /// Check the message type.
    #[inline]
    pub fn is(&self, message_type: MessageType) -> bool {
        self.message_type == message_type as u32
    }

    /// Encode the header to bytes.
    ///
    /// # Example
    ///
    /// ```
    /// use openrgb_client::protocol::{Header, MessageType};
    ///
    /// let header = Header::new(2, MessageType::RequestControllerData, 4);
    /// let bytes = header.encode();
    /// assert_eq!(bytes.len(), 16);
    /// assert_eq!(&bytes[..4], b"ORGB");
    /// ```
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..4].copy_from_slice(&MAGIC);
        buf[4..8].copy_from_slice(&self.device_idx.to_le_bytes());
        buf[8..12].copy_from_slice(&self.message_type.to_le_bytes());
        buf[12..16].copy_from_slice(&self.body_size.to_le_bytes());
        buf
    }

    /// Decode a header from bytes.
    ///
    /// Fails if the buffer is shorter than [`HEADER_SIZE`] or the magic does
    /// not match.
    pub fn decode(buf: &[u8]) -> Result<Self, DecodeError> {
        if buf.len() < HEADER_SIZE {
            return Err(DecodeError::UnexpectedEnd);
        }
        if buf[0..4] != MAGIC {
            return Err(DecodeError::BadMagic);
        }
        Ok(Self {
            device_idx: u32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]),
            message_type: u32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]),
            body_size: u32::from_le_bytes([buf[12], buf[13], buf[14], buf[15]]),
        })
    }
}

/// Build a complete frame as a single byte vector.
pub fn build_frame(header: &Header, body: &[u8]) -> Vec<u8> {
    debug_assert_eq!(header.body_size as usize, body.len());
    let mut buf = Vec::with_capacity(HEADER_SIZE + body.len());
    buf.extend_from_slice(&header.encode());
    buf.extend_from_slice(body);
    buf
}
