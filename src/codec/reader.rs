//! Checked little-endian reader over a byte slice.

use bytes::Buf;

use crate::error::DecodeError;

/// Cursor over a received message body.
///
/// Every read checks the remaining length first and fails with
/// [`DecodeError::UnexpectedEnd`] instead of panicking, which is what lets
/// reply decoding reject a body whose declared sizes overrun the data.
///
/// # Example
///
/// ```
/// use openrgb_client::codec::Reader;
///
/// let mut reader = Reader::new(&[0x2A, 0x00, 0x00, 0x00]);
/// assert_eq!(reader.read_u32().unwrap(), 42);
/// assert!(reader.is_empty());
/// ```
pub struct Reader<'a> {
    buf: &'a [u8],
}

impl<'a> Reader<'a> {
    /// Create a reader over the given bytes.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    /// Number of bytes not yet consumed.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len()
    }

    /// Check whether all bytes have been consumed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    fn need(&self, n: usize) -> Result<(), DecodeError> {
        if self.buf.len() < n {
            Err(DecodeError::UnexpectedEnd)
        } else {
            Ok(())
        }
    }

    /// Read a single byte.
    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        self.need(1)?;
        Ok(self.buf.get_u8())
    }

    /// Read a little-endian `u16`.
    pub fn read_u16(&mut self) -> Result<u16, DecodeError> {
        self.need(2)?;
        Ok(self.buf.get_u16_le())
    }

    /// Read a little-endian `u32`.
    pub fn read_u32(&mut self) -> Result<u32, DecodeError> {
        self.need(4)?;
        Ok(self.buf.get_u32_le())
    }

    /// Take the next `n` bytes as a sub-slice.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        self.need(n)?;
        let (head, tail) = self.buf.split_at(n);
        self.buf = tail;
        Ok(head)
    }

    /// Skip `n` bytes.
    pub fn skip(&mut self, n: usize) -> Result<(), DecodeError> {
        self.need(n)?;
        self.buf.advance(n);
        Ok(())
    }

    /// Read a length-prefixed string: `u16` length including the NUL
    /// terminator, the characters, then `0x00`.
    ///
    /// Fails if the declared length overruns the remaining data or the
    /// terminator is absent. Non-UTF-8 bytes are replaced rather than
    /// rejected; device names come from firmware and are not always clean.
    pub fn read_string(&mut self) -> Result<String, DecodeError> {
        let len = self.read_u16()? as usize;
        let bytes = self.read_bytes(len)?;
        match bytes.split_last() {
            Some((0, chars)) => Ok(String::from_utf8_lossy(chars).into_owned()),
            _ => Err(DecodeError::MissingTerminator),
        }
    }
}
