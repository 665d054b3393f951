//! # openrgb-client
//!
//! Rust client SDK for the OpenRGB SDK server network protocol.
//!
//! This crate connects to a running OpenRGB server (default TCP port 6742),
//! enumerates the RGB hardware it exposes and pushes color, mode and profile
//! changes to it. The protocol is a length-prefixed, little-endian binary
//! request/reply protocol; the server may additionally push unsolicited
//! device-list-change notifications at any time, which the client absorbs
//! and surfaces through a freshness flag.
//!
//! ## Architecture
//!
//! - **Codec** ([`codec`]): checked little-endian reading/writing
//! - **Protocol** ([`protocol`]): header, records, typed messages
//! - **Transport** ([`transport`]): blocking TCP with timeout and a
//!   non-blocking peek capability
//! - **Client** ([`Client`]): session state machine and typed operations
//!
//! ## Example
//!
//! ```ignore
//! use openrgb_client::{Client, Color, DEFAULT_PORT};
//!
//! let mut client = Client::new("my-app");
//! client.connect("127.0.0.1", DEFAULT_PORT)?;
//!
//! let devices = client.request_device_list()?;
//! if let Some(keyboard) = devices.find_device("My Keyboard") {
//!     client.switch_to_custom_mode(keyboard)?;
//!     client.set_device_color(keyboard, Color::new(0xFF, 0x20, 0x00))?;
//! }
//! ```

pub mod codec;
pub mod error;
pub mod protocol;
pub mod transport;

mod client;

pub use client::{
    Client, DEFAULT_CLIENT_NAME, DEFAULT_PORT, DEFAULT_RECV_TIMEOUT, IMPLEMENTED_PROTOCOL_VERSION,
};
pub use error::{ConnectError, DecodeError, RequestError, UpdateError, UpdateStatus};
pub use protocol::device::{
    mode_flags, Color, ColorMode, Device, DeviceList, DeviceType, Direction, Led, MatrixMap, Mode,
    Zone, ZoneType,
};
