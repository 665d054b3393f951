//! Little-endian writer over a growable buffer.

use bytes::{BufMut, Bytes, BytesMut};

/// Builder for an outgoing message body.
///
/// # Example
///
/// ```
/// use openrgb_client::codec::Writer;
///
/// let mut writer = Writer::new();
/// writer.write_string("hello");
/// assert_eq!(
///     writer.as_slice(),
///     &[0x06, 0x00, b'h', b'e', b'l', b'l', b'o', 0x00],
/// );
/// ```
pub struct Writer {
    buf: BytesMut,
}

impl Writer {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self {
            buf: BytesMut::new(),
        }
    }

    /// Create a writer with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    /// Number of bytes written so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Check whether nothing has been written yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// View the written bytes.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Finish writing and take the buffer (zero-copy freeze).
    pub fn into_bytes(self) -> Bytes {
        self.buf.freeze()
    }

    /// Write a single byte.
    pub fn write_u8(&mut self, value: u8) {
        self.buf.put_u8(value);
    }

    /// Write a little-endian `u16`.
    pub fn write_u16(&mut self, value: u16) {
        self.buf.put_u16_le(value);
    }

    /// Write a little-endian `u32`.
    pub fn write_u32(&mut self, value: u32) {
        self.buf.put_u32_le(value);
    }

    /// Write raw bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.put_slice(bytes);
    }

    /// Write a length-prefixed string: `u16` length including the NUL
    /// terminator, the characters, then `0x00`.
    pub fn write_string(&mut self, s: &str) {
        debug_assert!(s.len() < u16::MAX as usize);
        self.buf.put_u16_le((s.len() + 1) as u16);
        self.buf.put_slice(s.as_bytes());
        self.buf.put_u8(0);
    }
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}
