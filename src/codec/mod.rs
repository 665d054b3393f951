//! Codec module - checked little-endian reading and writing.
//!
//! The OpenRGB wire format is a fixed little-endian layout of integers,
//! length-prefixed strings and nested records. [`Reader`] and [`Writer`] are
//! thin layers over `bytes::Buf`/`BufMut` that add the bounds and terminator
//! checks the protocol requires, so the record code in
//! [`protocol`](crate::protocol) never indexes raw slices.

mod reader;
mod writer;

pub use reader::Reader;
pub use writer::Writer;
