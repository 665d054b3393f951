//! Protocol module - wire format, data model, and typed messages.
//!
//! This module implements the binary OpenRGB SDK protocol:
//! - the 16-byte `"ORGB"` header
//! - the version-parameterized device/zone/LED/mode records
//! - typed request and reply messages

pub mod device;
pub mod messages;
mod wire_format;

pub use wire_format::{build_frame, Header, MessageType, HEADER_SIZE, MAGIC};
