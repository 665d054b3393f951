//! Typed protocol messages.
//!
//! Each message the client exchanges with the server is a small struct
//! implementing [`RequestMessage`] (outbound) or [`ReplyMessage`] (inbound).
//! The session sends and awaits them through generic functions, so dispatch
//! on the message tag happens at compile time.
//!
//! Body layouts follow the reference server. Note two deliberate departures
//! from the length-prefixed string form used inside records:
//! `SET_CLIENT_NAME` carries the raw name bytes plus a NUL terminator, and
//! the profile operations carry the raw unterminated name bytes.

use crate::codec::{Reader, Writer};
use crate::error::DecodeError;

use super::device::{Color, Device, Mode};
use super::wire_format::{Header, MessageType};

/// An outbound message.
pub trait RequestMessage {
    /// Wire code of this message.
    const TYPE: MessageType;

    /// Device index to place in the frame header (0 where meaningless).
    fn device_idx(&self) -> u32 {
        0
    }

    /// Serialize the body. Fields gated on a minimum protocol version are
    /// written iff `protocol_version` reaches it.
    fn encode_body(&self, w: &mut Writer, protocol_version: u32);
}

/// An inbound reply message.
pub trait ReplyMessage: Sized {
    /// Wire code of this message.
    const TYPE: MessageType;

    /// Parse the body of a frame whose header already matched [`Self::TYPE`].
    fn decode_body(
        header: &Header,
        body: &[u8],
        protocol_version: u32,
    ) -> Result<Self, DecodeError>;
}

/// Advertise the client's protocol version.
pub struct RequestProtocolVersion {
    pub version: u32,
}

impl RequestMessage for RequestProtocolVersion {
    const TYPE: MessageType = MessageType::RequestProtocolVersion;

    fn encode_body(&self, w: &mut Writer, _protocol_version: u32) {
        w.write_u32(self.version);
    }
}

/// The server's protocol version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyProtocolVersion {
    pub version: u32,
}

impl ReplyMessage for ReplyProtocolVersion {
    const TYPE: MessageType = MessageType::RequestProtocolVersion;

    fn decode_body(
        _header: &Header,
        body: &[u8],
        _protocol_version: u32,
    ) -> Result<Self, DecodeError> {
        let mut r = Reader::new(body);
        Ok(Self {
            version: r.read_u32()?,
        })
    }
}

/// Announce the client's display name.
pub struct SetClientName {
    pub name: String,
}

impl RequestMessage for SetClientName {
    const TYPE: MessageType = MessageType::SetClientName;

    fn encode_body(&self, w: &mut Writer, _protocol_version: u32) {
        // the server reads a NUL-terminated C string, no length prefix
        w.write_bytes(self.name.as_bytes());
        w.write_u8(0);
    }
}

/// Ask for the number of devices.
pub struct RequestControllerCount;

impl RequestMessage for RequestControllerCount {
    const TYPE: MessageType = MessageType::RequestControllerCount;

    fn encode_body(&self, _w: &mut Writer, _protocol_version: u32) {}
}

/// The number of devices the server exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyControllerCount {
    pub count: u32,
}

impl ReplyMessage for ReplyControllerCount {
    const TYPE: MessageType = MessageType::RequestControllerCount;

    fn decode_body(
        _header: &Header,
        body: &[u8],
        _protocol_version: u32,
    ) -> Result<Self, DecodeError> {
        let mut r = Reader::new(body);
        Ok(Self {
            count: r.read_u32()?,
        })
    }
}

/// Ask for one device record. The body carries the negotiated protocol
/// version so the server knows which record layout to produce.
pub struct RequestControllerData {
    pub device_idx: u32,
}

impl RequestMessage for RequestControllerData {
    const TYPE: MessageType = MessageType::RequestControllerData;

    fn device_idx(&self) -> u32 {
        self.device_idx
    }

    fn encode_body(&self, w: &mut Writer, protocol_version: u32) {
        w.write_u32(protocol_version);
    }
}

/// One device record; the header's device index says which one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyControllerData {
    pub device: Device,
}

impl ReplyMessage for ReplyControllerData {
    const TYPE: MessageType = MessageType::RequestControllerData;

    fn decode_body(
        header: &Header,
        body: &[u8],
        protocol_version: u32,
    ) -> Result<Self, DecodeError> {
        Ok(Self {
            device: Device::decode(body, protocol_version, header.device_idx)?,
        })
    }
}

/// Switch a device to its direct-control mode.
pub struct SetCustomMode {
    pub device_idx: u32,
}

impl RequestMessage for SetCustomMode {
    const TYPE: MessageType = MessageType::SetCustomMode;

    fn device_idx(&self) -> u32 {
        self.device_idx
    }

    fn encode_body(&self, _w: &mut Writer, _protocol_version: u32) {}
}

fn encode_mode_body(w: &mut Writer, mode_idx: u32, mode: &Mode, protocol_version: u32) {
    let mut record = Writer::new();
    mode.encode(&mut record, protocol_version);
    // data size covers the whole body, itself included
    w.write_u32((4 + 4 + record.len()) as u32);
    w.write_u32(mode_idx);
    w.write_bytes(record.as_slice());
}

/// Change the active mode of a device.
pub struct UpdateMode<'a> {
    pub device_idx: u32,
    pub mode_idx: u32,
    pub mode: &'a Mode,
}

impl RequestMessage for UpdateMode<'_> {
    const TYPE: MessageType = MessageType::UpdateMode;

    fn device_idx(&self) -> u32 {
        self.device_idx
    }

    fn encode_body(&self, w: &mut Writer, protocol_version: u32) {
        encode_mode_body(w, self.mode_idx, self.mode, protocol_version);
    }
}

/// Change the active mode of a device and persist it on the device.
pub struct SaveMode<'a> {
    pub device_idx: u32,
    pub mode_idx: u32,
    pub mode: &'a Mode,
}

impl RequestMessage for SaveMode<'_> {
    const TYPE: MessageType = MessageType::SaveMode;

    fn device_idx(&self) -> u32 {
        self.device_idx
    }

    fn encode_body(&self, w: &mut Writer, protocol_version: u32) {
        encode_mode_body(w, self.mode_idx, self.mode, protocol_version);
    }
}

fn encode_colors(w: &mut Writer, colors: &[Color]) {
    debug_assert!(colors.len() < u16::MAX as usize);
    w.write_u16(colors.len() as u16);
    for color in colors {
        color.encode(w);
    }
}

/// Set the colors of all LEDs of a device, in LED order.
pub struct UpdateLeds<'a> {
    pub device_idx: u32,
    pub colors: &'a [Color],
}

impl RequestMessage for UpdateLeds<'_> {
    const TYPE: MessageType = MessageType::UpdateLeds;

    fn device_idx(&self) -> u32 {
        self.device_idx
    }

    fn encode_body(&self, w: &mut Writer, _protocol_version: u32) {
        w.write_u32((4 + 2 + Color::WIRE_SIZE * self.colors.len()) as u32);
        encode_colors(w, self.colors);
    }
}

/// Set the colors of all LEDs of one zone, in zone-LED order.
pub struct UpdateZoneLeds<'a> {
    pub device_idx: u32,
    pub zone_idx: u32,
    pub colors: &'a [Color],
}

impl RequestMessage for UpdateZoneLeds<'_> {
    const TYPE: MessageType = MessageType::UpdateZoneLeds;

    fn device_idx(&self) -> u32 {
        self.device_idx
    }

    fn encode_body(&self, w: &mut Writer, _protocol_version: u32) {
        w.write_u32((4 + 4 + 2 + Color::WIRE_SIZE * self.colors.len()) as u32);
        w.write_u32(self.zone_idx);
        encode_colors(w, self.colors);
    }
}

/// Set the color of a single LED.
pub struct UpdateSingleLed {
    pub device_idx: u32,
    pub led_idx: u32,
    pub color: Color,
}

impl RequestMessage for UpdateSingleLed {
    const TYPE: MessageType = MessageType::UpdateSingleLed;

    fn device_idx(&self) -> u32 {
        self.device_idx
    }

    fn encode_body(&self, w: &mut Writer, _protocol_version: u32) {
        w.write_u32(self.led_idx);
        self.color.encode(w);
    }
}

/// Resize a zone, if the device supports it.
pub struct ResizeZone {
    pub device_idx: u32,
    pub zone_idx: u32,
    pub new_size: u32,
}

impl RequestMessage for ResizeZone {
    const TYPE: MessageType = MessageType::ResizeZone;

    fn device_idx(&self) -> u32 {
        self.device_idx
    }

    fn encode_body(&self, w: &mut Writer, _protocol_version: u32) {
        w.write_u32(self.zone_idx);
        w.write_u32(self.new_size);
    }
}

/// List the profiles stored on the server.
pub struct RequestProfileList;

impl RequestMessage for RequestProfileList {
    const TYPE: MessageType = MessageType::RequestProfileList;

    fn encode_body(&self, _w: &mut Writer, _protocol_version: u32) {}
}

/// Names of the profiles stored on the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyProfileList {
    pub profiles: Vec<String>,
}

impl ReplyMessage for ReplyProfileList {
    const TYPE: MessageType = MessageType::RequestProfileList;

    fn decode_body(
        _header: &Header,
        body: &[u8],
        _protocol_version: u32,
    ) -> Result<Self, DecodeError> {
        let mut r = Reader::new(body);
        let data_size = r.read_u32()? as usize;
        if data_size != body.len() {
            return Err(DecodeError::SizeMismatch);
        }
        let count = r.read_u16()?;
        let mut profiles = Vec::with_capacity(count as usize);
        for _ in 0..count {
            profiles.push(r.read_string()?);
        }
        Ok(Self { profiles })
    }
}

/// Encode the profile list the way the server replies to
/// `REQUEST_PROFILE_LIST`; the decode counterpart's test/server helper.
pub fn encode_profile_list(profiles: &[String]) -> Vec<u8> {
    let mut names = Writer::new();
    for profile in profiles {
        names.write_string(profile);
    }
    let mut w = Writer::with_capacity(6 + names.len());
    w.write_u32((4 + 2 + names.len()) as u32);
    w.write_u16(profiles.len() as u16);
    w.write_bytes(names.as_slice());
    w.as_slice().to_vec()
}

fn encode_profile_name(w: &mut Writer, name: &str) {
    // raw unterminated bytes, the server takes the body as the name
    w.write_bytes(name.as_bytes());
}

/// Persist the current state of all devices under a profile name.
pub struct RequestSaveProfile<'a> {
    pub name: &'a str,
}

impl RequestMessage for RequestSaveProfile<'_> {
    const TYPE: MessageType = MessageType::RequestSaveProfile;

    fn encode_body(&self, w: &mut Writer, _protocol_version: u32) {
        encode_profile_name(w, self.name);
    }
}

/// Apply a stored profile.
pub struct RequestLoadProfile<'a> {
    pub name: &'a str,
}

impl RequestMessage for RequestLoadProfile<'_> {
    const TYPE: MessageType = MessageType::RequestLoadProfile;

    fn encode_body(&self, w: &mut Writer, _protocol_version: u32) {
        encode_profile_name(w, self.name);
    }
}

/// Remove a stored profile.
pub struct RequestDeleteProfile<'a> {
    pub name: &'a str,
}

impl RequestMessage for RequestDeleteProfile<'_> {
    const TYPE: MessageType = MessageType::RequestDeleteProfile;

    fn encode_body(&self, w: &mut Writer, _protocol_version: u32) {
        encode_profile_name(w, self.name);
    }
}
