//! A little-endian cursor over a byte sequence.
//!
//! [`ByteBuffer`] is the only thing the encoder writes to and the decoder reads from. Writes
//! happen at the cursor and overwrite or extend the underlying vector, so a length prefix can
//! be backpatched by saving the position, writing the payload, and restoring the position.
//!
//! # Example
//!
//! ```
//! use tson::buffer::ByteBuffer;
//!
//! let mut buf = ByteBuffer::new();
//! let count_at = buf.position();
//! buf.write_u16(0);
//! buf.write_u32(7);
//!
//! let end = buf.position();
//! buf.set_position(count_at);
//! buf.write_u16(1);
//! buf.set_position(end);
//!
//! assert_eq!(buf.into_bytes().as_ref(), &[1, 0, 7, 0, 0, 0]);
//! ```

use crate::errors::{Error, Result};
use byteorder::{ByteOrder, LittleEndian};
use bytes::Bytes;

#[derive(Clone, Debug, Default)]
/// A repositionable little-endian cursor.
pub struct ByteBuffer<T = Vec<u8>> {
    inner: T,
    pos: usize,
}

macro_rules! read_le {
    ($name:ident, $t:ty, $width:expr, $read:path) => {
        /// Reads a little-endian value at the cursor.
        #[inline]
        pub fn $name(&mut self) -> Result<$t> { Ok($read(self.take($width)?)) }
    };
}

macro_rules! write_le {
    ($name:ident, $t:ty, $width:expr, $write:path) => {
        /// Writes a little-endian value at the cursor.
        #[inline]
        pub fn $name(&mut self, v: $t) { $write(self.claim($width), v) }
    };
}

impl<T: AsRef<[u8]>> ByteBuffer<T> {
    /// Wraps existing bytes, with the cursor at the start.
    pub fn wrap(inner: T) -> Self { ByteBuffer { inner, pos: 0 } }

    /// Current cursor position.
    pub fn position(&self) -> usize { self.pos }

    /// Moves the cursor. Positions past the end are allowed; reads from there fail.
    pub fn set_position(&mut self, pos: usize) { self.pos = pos }

    /// Total length of the underlying bytes.
    pub fn len(&self) -> usize { self.inner.as_ref().len() }

    /// Indicates whether the underlying bytes are empty.
    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Bytes left between the cursor and the end.
    pub fn remaining(&self) -> usize { self.len().saturating_sub(self.pos) }

    #[inline]
    fn take(&mut self, len: usize) -> Result<&[u8]> {
        let remaining = self.remaining();
        if remaining < len {
            return Err(Error::TruncatedInput {
                needed: len,
                remaining,
            });
        }
        let start = self.pos;
        self.pos += len;
        Ok(&self.inner.as_ref()[start..start + len])
    }

    /// Reads a byte at the cursor, any nonzero value is `true`.
    pub fn read_bool(&mut self) -> Result<bool> { Ok(self.read_u8()? != 0) }

    /// Reads a byte at the cursor.
    pub fn read_u8(&mut self) -> Result<u8> { Ok(self.take(1)?[0]) }

    /// Reads a signed byte at the cursor.
    pub fn read_i8(&mut self) -> Result<i8> { Ok(self.read_u8()? as i8) }

    read_le!(read_u16, u16, 2, LittleEndian::read_u16);
    read_le!(read_u32, u32, 4, LittleEndian::read_u32);
    read_le!(read_u64, u64, 8, LittleEndian::read_u64);
    read_le!(read_i16, i16, 2, LittleEndian::read_i16);
    read_le!(read_i32, i32, 4, LittleEndian::read_i32);
    read_le!(read_i64, i64, 8, LittleEndian::read_i64);
    read_le!(read_f32, f32, 4, LittleEndian::read_f32);
    read_le!(read_f64, f64, 8, LittleEndian::read_f64);

    /// Reads `len` raw bytes at the cursor.
    pub fn read_bytes(&mut self, len: usize) -> Result<&[u8]> { self.take(len) }
}

impl ByteBuffer<Vec<u8>> {
    /// Creates an empty buffer.
    pub fn new() -> Self { Self::default() }

    /// Creates an empty buffer with room for `cap` bytes.
    pub fn with_capacity(cap: usize) -> Self { Self::wrap(Vec::with_capacity(cap)) }

    /// Returns the `len` bytes at the cursor for writing, growing the vector if needed.
    #[inline]
    fn claim(&mut self, len: usize) -> &mut [u8] {
        let start = self.pos;
        let end = start + len;
        if self.inner.len() < end {
            self.inner.resize(end, 0);
        }
        self.pos = end;
        &mut self.inner[start..end]
    }

    /// Writes a bool as one byte.
    pub fn write_bool(&mut self, b: bool) { self.write_u8(b as u8) }

    /// Writes a byte.
    pub fn write_u8(&mut self, u: u8) { self.claim(1)[0] = u }

    /// Writes a signed byte.
    pub fn write_i8(&mut self, i: i8) { self.write_u8(i as u8) }

    write_le!(write_u16, u16, 2, LittleEndian::write_u16);
    write_le!(write_u32, u32, 4, LittleEndian::write_u32);
    write_le!(write_u64, u64, 8, LittleEndian::write_u64);
    write_le!(write_i16, i16, 2, LittleEndian::write_i16);
    write_le!(write_i32, i32, 4, LittleEndian::write_i32);
    write_le!(write_i64, i64, 8, LittleEndian::write_i64);
    write_le!(write_f32, f32, 4, LittleEndian::write_f32);
    write_le!(write_f64, f64, 8, LittleEndian::write_f64);

    /// Writes raw bytes.
    pub fn write_bytes(&mut self, bs: &[u8]) { self.claim(bs.len()).copy_from_slice(bs) }

    /// Consumes the buffer, returning everything written so far.
    pub fn into_bytes(self) -> Bytes { Bytes::from(self.inner) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn little_endian_layout() {
        let mut buf = ByteBuffer::new();
        buf.write_u16(0x0102);
        buf.write_i32(-42);
        buf.write_f32(1.0);

        assert_eq!(
            buf.into_bytes().as_ref(),
            &[0x02, 0x01, 0xd6, 0xff, 0xff, 0xff, 0, 0, 0x80, 0x3f]
        );
    }

    #[test]
    fn backpatch_keeps_tail() {
        let mut buf = ByteBuffer::new();
        buf.write_u16(0);
        buf.write_bytes(b"abc");
        let end = buf.position();
        buf.set_position(0);
        buf.write_u16(3);
        buf.set_position(end);
        buf.write_u8(b'd');

        assert_eq!(buf.into_bytes().as_ref(), &[3, 0, b'a', b'b', b'c', b'd']);
    }

    #[test]
    fn reads_round_trip() {
        let mut buf = ByteBuffer::new();
        buf.write_bool(true);
        buf.write_i8(-1);
        buf.write_u64(u64::max_value());
        buf.write_f64(-0.0);

        let mut rd = ByteBuffer::wrap(buf.into_bytes());
        assert!(rd.read_bool().unwrap());
        assert_eq!(rd.read_i8().unwrap(), -1);
        assert_eq!(rd.read_u64().unwrap(), u64::max_value());
        assert_eq!(rd.read_f64().unwrap().to_bits(), (-0.0f64).to_bits());
        assert_eq!(rd.remaining(), 0);
    }

    #[test]
    fn truncated_read() {
        let mut rd = ByteBuffer::wrap(&[1u8, 2, 3][..]);
        assert_eq!(rd.read_u16().unwrap(), 0x0201);
        assert_eq!(
            rd.read_u32(),
            Err(Error::TruncatedInput {
                needed: 4,
                remaining: 1
            })
        );
    }

    #[test]
    fn nonzero_is_true() {
        let mut rd = ByteBuffer::wrap(vec![0u8, 2]);
        assert!(!rd.read_bool().unwrap());
        assert!(rd.read_bool().unwrap());
    }
}
