//! Device data model - everything the server reports about its RGB hardware.
//!
//! The record layouts here are version-parameterized: fields guarded by a
//! minimum protocol version are present on the wire iff the negotiated
//! version reaches it. Both directions are implemented; the client decodes
//! device records out of replies and encodes mode records into
//! `UPDATE_MODE`/`SAVE_MODE` bodies.
//!
//! Indices stored on [`Zone`], [`Led`] and [`Mode`] (`parent_idx`, `idx`)
//! refer to positions in the device list they were downloaded with, and are
//! invalidated by any successful `request_device_list()`.

use bytes::Bytes;

use crate::codec::{Reader, Writer};
use crate::error::DecodeError;

/// One 24-bit RGB color.
///
/// On the wire a color occupies 4 bytes: `[r, g, b, 0x00]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0x00, 0x00, 0x00);
    pub const WHITE: Color = Color::new(0xFF, 0xFF, 0xFF);
    pub const RED: Color = Color::new(0xFF, 0x00, 0x00);
    pub const GREEN: Color = Color::new(0x00, 0xFF, 0x00);
    pub const BLUE: Color = Color::new(0x00, 0x00, 0xFF);
    pub const YELLOW: Color = Color::new(0xFF, 0xFF, 0x00);
    pub const CYAN: Color = Color::new(0x00, 0xFF, 0xFF);
    pub const MAGENTA: Color = Color::new(0xFF, 0x00, 0xFF);

    /// Size of one color on the wire.
    pub const WIRE_SIZE: usize = 4;

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub(crate) fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let bytes = r.read_bytes(Self::WIRE_SIZE)?;
        Ok(Self {
            r: bytes[0],
            g: bytes[1],
            b: bytes[2],
        })
    }

    pub(crate) fn encode(&self, w: &mut Writer) {
        w.write_bytes(&[self.r, self.g, self.b, 0x00]);
    }
}

/// Category of RGB hardware.
///
/// Values outside the known range decode as [`DeviceType::Unknown`] so that
/// newer servers with new categories remain usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u32)]
pub enum DeviceType {
    Motherboard = 0,
    Dram = 1,
    Gpu = 2,
    Cooler = 3,
    LedStrip = 4,
    Keyboard = 5,
    Mouse = 6,
    MouseMat = 7,
    Headset = 8,
    HeadsetStand = 9,
    Gamepad = 10,
    Light = 11,
    Speaker = 12,
    Virtual = 13,
    Unknown = 14,
}

impl DeviceType {
    /// Map a raw wire value to a device type, tolerating unknown values.
    pub fn from_u32(value: u32) -> Self {
        match value {
            0 => Self::Motherboard,
            1 => Self::Dram,
            2 => Self::Gpu,
            3 => Self::Cooler,
            4 => Self::LedStrip,
            5 => Self::Keyboard,
            6 => Self::Mouse,
            7 => Self::MouseMat,
            8 => Self::Headset,
            9 => Self::HeadsetStand,
            10 => Self::Gamepad,
            11 => Self::Light,
            12 => Self::Speaker,
            13 => Self::Virtual,
            _ => Self::Unknown,
        }
    }
}

/// Layout category of a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u32)]
pub enum ZoneType {
    /// One LED, or LEDs that always act as one.
    Single = 0,
    /// A strip of LEDs.
    Linear = 1,
    /// A two-dimensional grid of LEDs.
    Matrix = 2,
}

impl ZoneType {
    fn from_u32(value: u32) -> Result<Self, DecodeError> {
        match value {
            0 => Ok(Self::Single),
            1 => Ok(Self::Linear),
            2 => Ok(Self::Matrix),
            _ => Err(DecodeError::InvalidEnum {
                field: "zone type",
                value,
            }),
        }
    }
}

/// Direction of a moving lighting effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u32)]
pub enum Direction {
    Left = 0,
    Right = 1,
    Up = 2,
    Down = 3,
    Horizontal = 4,
    Vertical = 5,
}

impl Direction {
    /// Map a raw wire value to a direction.
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Left),
            1 => Some(Self::Right),
            2 => Some(Self::Up),
            3 => Some(Self::Down),
            4 => Some(Self::Horizontal),
            5 => Some(Self::Vertical),
            _ => None,
        }
    }
}

/// How a mode gets its colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u32)]
pub enum ColorMode {
    /// The mode has no colors.
    None = 0,
    /// Each LED carries its own color.
    PerLed = 1,
    /// The mode carries its own preset colors.
    ModeSpecific = 2,
    /// The device picks colors randomly.
    Random = 3,
}

impl ColorMode {
    fn from_u32(value: u32) -> Result<Self, DecodeError> {
        match value {
            0 => Ok(Self::None),
            1 => Ok(Self::PerLed),
            2 => Ok(Self::ModeSpecific),
            3 => Ok(Self::Random),
            _ => Err(DecodeError::InvalidEnum {
                field: "color mode",
                value,
            }),
        }
    }
}

/// Feature-flag constants for [`Mode::flags`].
pub mod mode_flags {
    /// The mode has an adjustable speed.
    pub const HAS_SPEED: u32 = 1 << 0;
    /// The mode can run left or right.
    pub const HAS_DIRECTION_LR: u32 = 1 << 1;
    /// The mode can run up or down.
    pub const HAS_DIRECTION_UD: u32 = 1 << 2;
    /// The mode can run horizontally or vertically.
    pub const HAS_DIRECTION_HV: u32 = 1 << 3;
    /// The mode has an adjustable brightness.
    pub const HAS_BRIGHTNESS: u32 = 1 << 4;
    /// The mode uses the per-LED colors.
    pub const HAS_PER_LED_COLOR: u32 = 1 << 5;
    /// The mode carries its own preset colors.
    pub const HAS_MODE_SPECIFIC_COLOR: u32 = 1 << 6;
    /// The mode can pick colors randomly.
    pub const HAS_RANDOM_COLOR: u32 = 1 << 7;
    /// The mode supports being saved manually.
    pub const MANUAL_SAVE: u32 = 1 << 8;
    /// The mode saves itself automatically.
    pub const AUTOMATIC_SAVE: u32 = 1 << 9;
    /// Any of the direction capabilities.
    pub const HAS_DIRECTION: u32 = HAS_DIRECTION_LR | HAS_DIRECTION_UD | HAS_DIRECTION_HV;

    /// Check if a specific flag is set.
    #[inline]
    pub fn has_flag(flags: u32, flag: u32) -> bool {
        flags & flag != 0
    }
}

/// One lighting effect a device can run.
///
/// The brightness triple is carried on the wire only at negotiated protocol
/// version ≥ 3 and reads zero below that.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mode {
    /// Index of the parent device.
    pub parent_idx: u32,
    /// Index of this mode within the parent device.
    pub idx: u32,
    pub name: String,
    /// Device-specific identifier of the effect.
    pub value: u32,
    /// Bitset of [`mode_flags`] capabilities.
    pub flags: u32,
    pub speed_min: u32,
    pub speed_max: u32,
    pub brightness_min: u32,
    pub brightness_max: u32,
    pub colors_min: u32,
    pub colors_max: u32,
    pub speed: u32,
    pub brightness: u32,
    /// Raw direction value; unknown values are passed through. Use
    /// [`Mode::direction`] for the typed view.
    pub direction: u32,
    pub color_mode: ColorMode,
    /// Preset colors, meaningful when the mode is
    /// [`ColorMode::ModeSpecific`].
    pub colors: Vec<Color>,
}

impl Mode {
    /// The direction of the effect, if the raw value is a known one.
    pub fn direction(&self) -> Option<Direction> {
        Direction::from_u32(self.direction)
    }

    /// Check a capability flag.
    pub fn has_flag(&self, flag: u32) -> bool {
        mode_flags::has_flag(self.flags, flag)
    }

    pub(crate) fn decode(
        r: &mut Reader<'_>,
        protocol_version: u32,
        parent_idx: u32,
        idx: u32,
    ) -> Result<Self, DecodeError> {
        let name = r.read_string()?;
        let value = r.read_u32()?;
        let flags = r.read_u32()?;
        let speed_min = r.read_u32()?;
        let speed_max = r.read_u32()?;
        let (brightness_min, brightness_max) = if protocol_version >= 3 {
            (r.read_u32()?, r.read_u32()?)
        } else {
            (0, 0)
        };
        let colors_min = r.read_u32()?;
        let colors_max = r.read_u32()?;
        let speed = r.read_u32()?;
        let brightness = if protocol_version >= 3 { r.read_u32()? } else { 0 };
        let direction = r.read_u32()?;
        let color_mode = ColorMode::from_u32(r.read_u32()?)?;
        let num_colors = r.read_u16()?;
        let mut colors = Vec::with_capacity(num_colors as usize);
        for _ in 0..num_colors {
            colors.push(Color::decode(r)?);
        }
        Ok(Self {
            parent_idx,
            idx,
            name,
            value,
            flags,
            speed_min,
            speed_max,
            brightness_min,
            brightness_max,
            colors_min,
            colors_max,
            speed,
            brightness,
            direction,
            color_mode,
            colors,
        })
    }

    pub(crate) fn encode(&self, w: &mut Writer, protocol_version: u32) {
        w.write_string(&self.name);
        w.write_u32(self.value);
        w.write_u32(self.flags);
        w.write_u32(self.speed_min);
        w.write_u32(self.speed_max);
        if protocol_version >= 3 {
            w.write_u32(self.brightness_min);
            w.write_u32(self.brightness_max);
        }
        w.write_u32(self.colors_min);
        w.write_u32(self.colors_max);
        w.write_u32(self.speed);
        if protocol_version >= 3 {
            w.write_u32(self.brightness);
        }
        w.write_u32(self.direction);
        w.write_u32(self.color_mode as u32);
        debug_assert!(self.colors.len() < u16::MAX as usize);
        w.write_u16(self.colors.len() as u16);
        for color in &self.colors {
            color.encode(w);
        }
    }
}

/// Cell-to-LED map of a matrix zone.
///
/// `values` is row-major, `height * width` entries; a cell holding
/// [`MatrixMap::NO_LED`] has no LED behind it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatrixMap {
    pub height: u32,
    pub width: u32,
    pub values: Vec<u32>,
}

impl MatrixMap {
    /// Marker for a cell without an LED.
    pub const NO_LED: u32 = u32::MAX;

    /// LED index at the given cell, if the cell is inside the matrix and has
    /// an LED.
    pub fn led_at(&self, row: u32, col: u32) -> Option<u32> {
        if row >= self.height || col >= self.width {
            return None;
        }
        match self.values.get((row * self.width + col) as usize) {
            Some(&value) if value != Self::NO_LED => Some(value),
            _ => None,
        }
    }
}

/// A contiguous range of LEDs on a device with shared layout semantics.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Zone {
    /// Index of the parent device.
    pub parent_idx: u32,
    /// Index of this zone within the parent device.
    pub idx: u32,
    pub name: String,
    pub zone_type: ZoneType,
    /// Smallest LED count the zone can be resized to.
    pub leds_min: u32,
    /// Largest LED count the zone can be resized to.
    pub leds_max: u32,
    /// Current LED count.
    pub leds_count: u32,
    /// Cell-to-LED map, present on matrix zones.
    pub matrix: Option<MatrixMap>,
}

impl Zone {
    pub(crate) fn decode(
        r: &mut Reader<'_>,
        parent_idx: u32,
        idx: u32,
    ) -> Result<Self, DecodeError> {
        let name = r.read_string()?;
        let zone_type = ZoneType::from_u32(r.read_u32()?)?;
        let leds_min = r.read_u32()?;
        let leds_max = r.read_u32()?;
        let leds_count = r.read_u32()?;
        let matrix_len = r.read_u16()? as usize;
        let matrix = if matrix_len > 0 {
            // the byte-length prefix lets unknown trailing matrix data be
            // skipped without understanding it
            let mut mr = Reader::new(r.read_bytes(matrix_len)?);
            let height = mr.read_u32()?;
            let width = mr.read_u32()?;
            let cells = height
                .checked_mul(width)
                .ok_or(DecodeError::SizeMismatch)?;
            if cells as u64 * 4 > mr.remaining() as u64 {
                return Err(DecodeError::SizeMismatch);
            }
            let mut values = Vec::with_capacity(cells as usize);
            for _ in 0..cells {
                values.push(mr.read_u32()?);
            }
            Some(MatrixMap {
                height,
                width,
                values,
            })
        } else {
            None
        };
        Ok(Self {
            parent_idx,
            idx,
            name,
            zone_type,
            leds_min,
            leds_max,
            leds_count,
            matrix,
        })
    }

    pub(crate) fn encode(&self, w: &mut Writer) {
        w.write_string(&self.name);
        w.write_u32(self.zone_type as u32);
        w.write_u32(self.leds_min);
        w.write_u32(self.leds_max);
        w.write_u32(self.leds_count);
        match &self.matrix {
            Some(matrix) => {
                let len = 8 + 4 * matrix.values.len();
                debug_assert!(len < u16::MAX as usize);
                w.write_u16(len as u16);
                w.write_u32(matrix.height);
                w.write_u32(matrix.width);
                for &value in &matrix.values {
                    w.write_u32(value);
                }
            }
            None => w.write_u16(0),
        }
    }
}

/// A single controllable pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Led {
    /// Index of the parent device.
    pub parent_idx: u32,
    /// Index of this LED within the parent device.
    pub idx: u32,
    pub name: String,
    /// Device-specific value of the LED.
    pub value: u32,
}

impl Led {
    pub(crate) fn decode(
        r: &mut Reader<'_>,
        parent_idx: u32,
        idx: u32,
    ) -> Result<Self, DecodeError> {
        Ok(Self {
            parent_idx,
            idx,
            name: r.read_string()?,
            value: r.read_u32()?,
        })
    }

    pub(crate) fn encode(&self, w: &mut Writer) {
        w.write_string(&self.name);
        w.write_u32(self.value);
    }
}

/// A piece of RGB-capable hardware exposed by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Device {
    /// Index of this device in the server's device list.
    pub idx: u32,
    pub device_type: DeviceType,
    pub name: String,
    /// Vendor name; empty when the negotiated version is below 1.
    pub vendor: String,
    pub description: String,
    /// Firmware version string.
    pub version: String,
    pub serial: String,
    /// Where the device is attached, typically a USB path.
    pub location: String,
    /// Index into [`Device::modes`] of the active mode.
    pub active_mode: u32,
    pub modes: Vec<Mode>,
    pub zones: Vec<Zone>,
    pub leds: Vec<Led>,
    /// Current colors, one per LED, in LED order.
    pub colors: Vec<Color>,
}

impl Device {
    /// Decode a size-prefixed device record out of a
    /// `REPLY_CONTROLLER_DATA` body.
    ///
    /// `idx` is the device index echoed in the reply header. Known fields
    /// beyond the negotiated version are absent; unknown trailing bytes
    /// inside the declared record size are skipped.
    pub fn decode(body: &[u8], protocol_version: u32, idx: u32) -> Result<Self, DecodeError> {
        let mut r = Reader::new(body);
        let data_size = r.read_u32()? as usize;
        // the prefix covers the whole record, itself included
        if data_size != body.len() {
            return Err(DecodeError::SizeMismatch);
        }

        let device_type = DeviceType::from_u32(r.read_u32()?);
        let name = r.read_string()?;
        let vendor = if protocol_version >= 1 {
            r.read_string()?
        } else {
            String::new()
        };
        let description = r.read_string()?;
        let version = r.read_string()?;
        let serial = r.read_string()?;
        let location = r.read_string()?;

        let num_modes = r.read_u16()?;
        let active_mode = r.read_u32()?;
        let mut modes = Vec::with_capacity(num_modes as usize);
        for mode_idx in 0..num_modes {
            modes.push(Mode::decode(&mut r, protocol_version, idx, mode_idx as u32)?);
        }

        let num_zones = r.read_u16()?;
        let mut zones = Vec::with_capacity(num_zones as usize);
        for zone_idx in 0..num_zones {
            zones.push(Zone::decode(&mut r, idx, zone_idx as u32)?);
        }

        let num_leds = r.read_u16()?;
        let mut leds = Vec::with_capacity(num_leds as usize);
        for led_idx in 0..num_leds {
            leds.push(Led::decode(&mut r, idx, led_idx as u32)?);
        }

        let num_colors = r.read_u16()?;
        let mut colors = Vec::with_capacity(num_colors as usize);
        for _ in 0..num_colors {
            colors.push(Color::decode(&mut r)?);
        }

        Ok(Self {
            idx,
            device_type,
            name,
            vendor,
            description,
            version,
            serial,
            location,
            active_mode,
            modes,
            zones,
            leds,
            colors,
        })
    }

    /// Encode this device as a size-prefixed record, the way the server
    /// serializes it into a `REPLY_CONTROLLER_DATA` body.
    ///
    /// The client never sends device records; this direction exists for
    /// round-trip verification and for test servers.
    pub fn encode(&self, protocol_version: u32) -> Bytes {
        let mut fields = Writer::new();
        fields.write_u32(self.device_type as u32);
        fields.write_string(&self.name);
        if protocol_version >= 1 {
            fields.write_string(&self.vendor);
        }
        fields.write_string(&self.description);
        fields.write_string(&self.version);
        fields.write_string(&self.serial);
        fields.write_string(&self.location);

        fields.write_u16(self.modes.len() as u16);
        fields.write_u32(self.active_mode);
        for mode in &self.modes {
            mode.encode(&mut fields, protocol_version);
        }

        fields.write_u16(self.zones.len() as u16);
        for zone in &self.zones {
            zone.encode(&mut fields);
        }

        fields.write_u16(self.leds.len() as u16);
        for led in &self.leds {
            led.encode(&mut fields);
        }

        fields.write_u16(self.colors.len() as u16);
        for color in &self.colors {
            color.encode(&mut fields);
        }

        let mut w = Writer::with_capacity(4 + fields.len());
        w.write_u32((4 + fields.len()) as u32);
        w.write_bytes(fields.as_slice());
        w.into_bytes()
    }

    /// Find a mode by name, first match wins.
    pub fn find_mode(&self, name: &str) -> Option<&Mode> {
        self.modes.iter().find(|m| m.name == name)
    }

    /// Find a zone by name, first match wins.
    pub fn find_zone(&self, name: &str) -> Option<&Zone> {
        self.zones.iter().find(|z| z.name == name)
    }

    /// Find an LED by name, first match wins.
    pub fn find_led(&self, name: &str) -> Option<&Led> {
        self.leds.iter().find(|l| l.name == name)
    }
}

/// Ordered collection of devices as downloaded from the server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceList {
    devices: Vec<Device>,
}

impl DeviceList {
    /// Wrap an ordered collection of devices.
    pub fn new(devices: Vec<Device>) -> Self {
        Self { devices }
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&Device> {
        self.devices.get(idx)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Device> {
        self.devices.iter()
    }

    /// Find a device by name, first match wins.
    pub fn find_device(&self, name: &str) -> Option<&Device> {
        self.devices.iter().find(|d| d.name == name)
    }
}

impl std::ops::Index<usize> for DeviceList {
    type Output = Device;

    fn index(&self, idx: usize) -> &Device {
        &self.devices[idx]
    }
}

impl<'a> IntoIterator for &'a DeviceList {
    type Item = &'a Device;
    type IntoIter = std::slice::Iter<'a, Device>;

    fn into_iter(self) -> Self::IntoIter {
        self.devices.iter()
    }
}

impl IntoIterator for DeviceList {
    type Item = Device;
    type IntoIter = std::vec::IntoIter<Device>;

    fn into_iter(self) -> Self::IntoIter {
        self.devices.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_mode(parent_idx: u32, idx: u32) -> Mode {
        Mode {
            parent_idx,
            idx,
            name: "Rainbow Wave".to_string(),
            value: 7,
            flags: mode_flags::HAS_SPEED | mode_flags::HAS_DIRECTION_LR | mode_flags::HAS_BRIGHTNESS,
            speed_min: 0,
            speed_max: 100,
            brightness_min: 0,
            brightness_max: 255,
            colors_min: 0,
            colors_max: 2,
            speed: 50,
            brightness: 200,
            direction: Direction::Right as u32,
            color_mode: ColorMode::ModeSpecific,
            colors: vec![Color::RED, Color::BLUE],
        }
    }

    fn sample_device(idx: u32) -> Device {
        Device {
            idx,
            device_type: DeviceType::Keyboard,
            name: "Test Keyboard".to_string(),
            vendor: "Test Vendor".to_string(),
            description: "A keyboard".to_string(),
            version: "1.2.3".to_string(),
            serial: "SN0001".to_string(),
            location: "/dev/hidraw3".to_string(),
            active_mode: 0,
            modes: vec![sample_mode(idx, 0)],
            zones: vec![
                Zone {
                    parent_idx: idx,
                    idx: 0,
                    name: "Keys".to_string(),
                    zone_type: ZoneType::Matrix,
                    leds_min: 2,
                    leds_max: 2,
                    leds_count: 2,
                    matrix: Some(MatrixMap {
                        height: 1,
                        width: 2,
                        values: vec![0, 1],
                    }),
                },
                Zone {
                    parent_idx: idx,
                    idx: 1,
                    name: "Edge".to_string(),
                    zone_type: ZoneType::Linear,
                    leds_min: 1,
                    leds_max: 4,
                    leds_count: 1,
                    matrix: None,
                },
            ],
            leds: vec![
                Led {
                    parent_idx: idx,
                    idx: 0,
                    name: "Key: A".to_string(),
                    value: 0,
                },
                Led {
                    parent_idx: idx,
                    idx: 1,
                    name: "Key: B".to_string(),
                    value: 1,
                },
                Led {
                    parent_idx: idx,
                    idx: 2,
                    name: "Edge 1".to_string(),
                    value: 2,
                },
            ],
            colors: vec![Color::RED, Color::GREEN, Color::BLUE],
        }
    }

    #[test]
    fn test_color_wire_form() {
        let mut w = Writer::new();
        Color::new(0xAA, 0xBB, 0xCC).encode(&mut w);
        assert_eq!(w.as_slice(), &[0xAA, 0xBB, 0xCC, 0x00]);
    }

    #[test]
    fn test_color_round_trip() {
        let mut w = Writer::new();
        Color::MAGENTA.encode(&mut w);
        let bytes = w.into_bytes();
        let mut r = Reader::new(&bytes);
        assert_eq!(Color::decode(&mut r).unwrap(), Color::MAGENTA);
    }

    #[test]
    fn test_mode_round_trip_version_3() {
        let mode = sample_mode(2, 5);
        let mut w = Writer::new();
        mode.encode(&mut w, 3);
        let bytes = w.into_bytes();
        let mut r = Reader::new(&bytes);
        let decoded = Mode::decode(&mut r, 3, 2, 5).unwrap();
        assert_eq!(decoded, mode);
        assert!(r.is_empty());
    }

    #[test]
    fn test_mode_version_gating() {
        let mode = sample_mode(0, 0);

        let mut v2 = Writer::new();
        mode.encode(&mut v2, 2);
        let mut v3 = Writer::new();
        mode.encode(&mut v3, 3);

        // the brightness triple occupies exactly 12 bytes
        assert_eq!(v3.len(), v2.len() + 12);

        // decoding at the version it was encoded for zeroes the gated fields
        let bytes = v2.into_bytes();
        let mut r = Reader::new(&bytes);
        let decoded = Mode::decode(&mut r, 2, 0, 0).unwrap();
        assert_eq!(decoded.brightness_min, 0);
        assert_eq!(decoded.brightness_max, 0);
        assert_eq!(decoded.brightness, 0);
        assert_eq!(decoded.speed, mode.speed);
        assert_eq!(decoded.colors, mode.colors);
    }

    #[test]
    fn test_mode_unknown_direction_is_tolerated() {
        let mut mode = sample_mode(0, 0);
        mode.direction = 77;
        let mut w = Writer::new();
        mode.encode(&mut w, 3);
        let bytes = w.into_bytes();
        let mut r = Reader::new(&bytes);
        let decoded = Mode::decode(&mut r, 3, 0, 0).unwrap();
        assert_eq!(decoded.direction, 77);
        assert_eq!(decoded.direction(), None);
    }

    #[test]
    fn test_mode_invalid_color_mode_fails() {
        let mut mode = sample_mode(0, 0);
        mode.colors.clear();
        let mut w = Writer::new();
        mode.encode(&mut w, 3);
        let mut bytes = w.as_slice().to_vec();
        // color_mode is the 4 bytes right before the trailing u16 color count
        let off = bytes.len() - 2 - 4;
        bytes[off..off + 4].copy_from_slice(&99u32.to_le_bytes());
        let mut r = Reader::new(&bytes);
        assert_eq!(
            Mode::decode(&mut r, 3, 0, 0),
            Err(DecodeError::InvalidEnum {
                field: "color mode",
                value: 99
            })
        );
    }

    #[test]
    fn test_zone_round_trip_with_matrix() {
        let zone = Zone {
            parent_idx: 1,
            idx: 0,
            name: "Keys".to_string(),
            zone_type: ZoneType::Matrix,
            leds_min: 6,
            leds_max: 6,
            leds_count: 6,
            matrix: Some(MatrixMap {
                height: 2,
                width: 3,
                values: vec![0, 1, 2, MatrixMap::NO_LED, 4, 5],
            }),
        };
        let mut w = Writer::new();
        zone.encode(&mut w);
        let bytes = w.into_bytes();
        let mut r = Reader::new(&bytes);
        assert_eq!(Zone::decode(&mut r, 1, 0).unwrap(), zone);
    }

    #[test]
    fn test_zone_unknown_matrix_tail_is_skipped() {
        let zone = Zone {
            parent_idx: 0,
            idx: 3,
            name: "Strip".to_string(),
            zone_type: ZoneType::Matrix,
            leds_min: 1,
            leds_max: 1,
            leds_count: 1,
            matrix: Some(MatrixMap {
                height: 1,
                width: 1,
                values: vec![0],
            }),
        };
        let mut w = Writer::new();
        zone.encode(&mut w);
        let mut bytes = w.as_slice().to_vec();

        // grow the matrix block by 4 unknown trailing bytes and fix up its
        // length prefix (right after name, type and the three counts)
        let matrix_len_off = 2 + zone.name.len() + 1 + 4 * 4;
        let old_len = u16::from_le_bytes([bytes[matrix_len_off], bytes[matrix_len_off + 1]]);
        bytes[matrix_len_off..matrix_len_off + 2].copy_from_slice(&(old_len + 4).to_le_bytes());
        bytes.extend_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);

        let mut r = Reader::new(&bytes);
        let decoded = Zone::decode(&mut r, 0, 3).unwrap();
        assert_eq!(decoded.matrix, zone.matrix);
        assert!(r.is_empty());
    }

    #[test]
    fn test_zone_invalid_type_fails() {
        let mut w = Writer::new();
        w.write_string("Weird");
        w.write_u32(9);
        let bytes = w.into_bytes();
        let mut r = Reader::new(&bytes);
        assert_eq!(
            Zone::decode(&mut r, 0, 0),
            Err(DecodeError::InvalidEnum {
                field: "zone type",
                value: 9
            })
        );
    }

    #[test]
    fn test_device_round_trip() {
        let device = sample_device(4);
        let body = device.encode(3);
        let decoded = Device::decode(&body, 3, 4).unwrap();
        assert_eq!(decoded, device);
    }

    #[test]
    fn test_device_round_trip_version_1_drops_brightness() {
        let device = sample_device(0);
        let body = device.encode(1);
        let decoded = Device::decode(&body, 1, 0).unwrap();
        assert_eq!(decoded.vendor, device.vendor);
        assert_eq!(decoded.modes[0].brightness, 0);
        assert_eq!(decoded.modes[0].speed, device.modes[0].speed);
    }

    #[test]
    fn test_device_data_size_mismatch_fails() {
        let device = sample_device(0);
        let mut body = device.encode(3).to_vec();
        let wrong = (body.len() as u32 + 1).to_le_bytes();
        body[0..4].copy_from_slice(&wrong);
        assert_eq!(
            Device::decode(&body, 3, 0),
            Err(DecodeError::SizeMismatch)
        );
    }

    #[test]
    fn test_device_truncated_record_fails() {
        let device = sample_device(0);
        let body = device.encode(3);
        let truncated = &body[..body.len() - 3];
        // the size prefix no longer matches the data
        assert!(Device::decode(truncated, 3, 0).is_err());
    }

    #[test]
    fn test_device_unknown_type_falls_back() {
        let device = sample_device(0);
        let mut body = device.encode(3).to_vec();
        body[4..8].copy_from_slice(&1234u32.to_le_bytes());
        let decoded = Device::decode(&body, 3, 0).unwrap();
        assert_eq!(decoded.device_type, DeviceType::Unknown);
    }

    #[test]
    fn test_device_zone_led_partition_invariant() {
        let device = sample_device(0);
        let total: u32 = device.zones.iter().map(|z| z.leds_count).sum();
        assert_eq!(total as usize, device.leds.len());
    }

    #[test]
    fn test_matrix_led_at() {
        let matrix = MatrixMap {
            height: 2,
            width: 3,
            values: vec![0, 1, 2, MatrixMap::NO_LED, 4, 5],
        };
        assert_eq!(matrix.led_at(0, 2), Some(2));
        assert_eq!(matrix.led_at(1, 0), None); // NO_LED cell
        assert_eq!(matrix.led_at(2, 0), None); // out of bounds
    }

    #[test]
    fn test_device_list_find_first_match() {
        let mut first = sample_device(0);
        first.serial = "first".to_string();
        let mut second = sample_device(1);
        second.serial = "second".to_string();
        let list = DeviceList::new(vec![first, second]);

        assert_eq!(list.len(), 2);
        let found = list.find_device("Test Keyboard").unwrap();
        assert_eq!(found.serial, "first");
        assert!(list.find_device("nope").is_none());
    }

    #[test]
    fn test_device_find_helpers() {
        let device = sample_device(0);
        assert_eq!(device.find_mode("Rainbow Wave").unwrap().idx, 0);
        assert_eq!(device.find_zone("Edge").unwrap().idx, 1);
        assert_eq!(device.find_led("Key: B").unwrap().idx, 1);
        assert!(device.find_led("Key: Z").is_none());
    }
}
