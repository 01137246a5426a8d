//! # Readable Byte Buffer
//!
//! The mirror of [`WritableByteBuffer`](crate::core::writer::WritableByteBuffer):
//! a fixed byte sequence with a read cursor starting at 0.
//!
//! Readers take bytes in the requested order, rebuild the big-endian value,
//! and undo the transform on the least significant byte with the same
//! involution the writer applied. Reading past the end is an error; the
//! cursor is left untouched when a read fails.

use crate::config::STRING_TERMINATOR;
use crate::core::bits::BitReader;
use crate::core::transform::{DataOrder, Signedness, Transformation};
use crate::error::{ProtocolError, Result};
use bytes::Bytes;

#[derive(Debug, Clone, Default)]
pub struct ReadableByteBuffer {
    data: Bytes,
    position: usize,
}

impl From<Bytes> for ReadableByteBuffer {
    fn from(data: Bytes) -> Self {
        Self { data, position: 0 }
    }
}

impl From<Vec<u8>> for ReadableByteBuffer {
    fn from(data: Vec<u8>) -> Self {
        Self::from(Bytes::from(data))
    }
}

impl ReadableByteBuffer {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self::from(data.into())
    }

    pub fn from_slice(data: &[u8]) -> Self {
        Self::from(Bytes::copy_from_slice(data))
    }

    pub(crate) fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn set_position(&mut self, position: usize) {
        self.position = position;
    }

    /// Bytes left between the cursor and the end of the data
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Take the next `N` bytes in wire order
    fn take<const N: usize>(&mut self) -> Result<[u8; N]> {
        let remaining = self.remaining();
        if remaining < N {
            return Err(ProtocolError::BufferUnderflow {
                needed: N,
                remaining,
            });
        }

        let mut bytes = [0u8; N];
        bytes.copy_from_slice(&self.data[self.position..self.position + N]);
        self.position += N;
        Ok(bytes)
    }

    /// Take `N` bytes and put them back into big-endian order using `layout`,
    /// then undo the transform on the least significant byte.
    fn take_ordered<const N: usize>(
        &mut self,
        layout: [usize; N],
        transform: Transformation,
    ) -> Result<[u8; N]> {
        let wire = self.take::<N>()?;
        let mut bytes = [0u8; N];
        for (slot, index) in layout.into_iter().enumerate() {
            bytes[index] = wire[slot];
        }
        Ok(transform.apply_lsb(bytes))
    }

    pub fn read_byte(&mut self, signedness: Signedness, transform: Transformation) -> Result<i32> {
        let [byte] = self.take::<1>()?;
        Ok(signedness.extend(u32::from(transform.apply(byte)), 8))
    }

    pub fn read_short(
        &mut self,
        signedness: Signedness,
        order: DataOrder,
        transform: Transformation,
    ) -> Result<i32> {
        let bytes = self.take_ordered::<2>(order.layout(), transform)?;
        Ok(signedness.extend(u32::from(u16::from_be_bytes(bytes)), 16))
    }

    pub fn read_tribyte(
        &mut self,
        signedness: Signedness,
        order: DataOrder,
        transform: Transformation,
    ) -> Result<i32> {
        let [b0, b1, b2] = self.take_ordered::<3>(order.layout(), transform)?;
        let value = u32::from_be_bytes([0, b0, b1, b2]);
        Ok(signedness.extend(value, 24))
    }

    /// Read a 4-byte value. Cast the result to `i32` for a signed reading.
    pub fn read_int(
        &mut self,
        order: DataOrder,
        mixed: bool,
        transform: Transformation,
    ) -> Result<u32> {
        let bytes = self.take_ordered::<4>(order.int_layout(mixed), transform)?;
        Ok(u32::from_be_bytes(bytes))
    }

    /// Read an 8-byte value as its `(high, low)` 32-bit halves
    pub fn read_long(&mut self, order: DataOrder, transform: Transformation) -> Result<(u32, u32)> {
        let bytes = self.take_ordered::<8>(order.layout(), transform)?;
        let value = u64::from_be_bytes(bytes);
        Ok(((value >> 32) as u32, value as u32))
    }

    /// Read `len` raw bytes, untransformed
    pub fn read_bytes(&mut self, len: usize) -> Result<Bytes> {
        let remaining = self.remaining();
        if remaining < len {
            return Err(ProtocolError::BufferUnderflow {
                needed: len,
                remaining,
            });
        }

        let bytes = self.data.slice(self.position..self.position + len);
        self.position += len;
        Ok(bytes)
    }

    /// Read bytes up to the `0x0A` terminator, one character per byte.
    ///
    /// The terminator is consumed but not included in the result.
    pub fn read_string(&mut self) -> Result<String> {
        let start = self.position.min(self.data.len());
        let rest = &self.data[start..];
        let end = rest
            .iter()
            .position(|&b| b == STRING_TERMINATOR)
            .ok_or(ProtocolError::UnterminatedString)?;

        let value = rest[..end].iter().map(|&b| char::from(b)).collect();
        self.position = start + end + 1;
        Ok(value)
    }

    /// Read `count` bits (1..=32) starting at the byte-aligned cursor
    pub fn read_bits(&mut self, count: usize) -> Result<u32> {
        self.bit_reader().read_bits(count)
    }

    /// Bit reader starting at the byte-aligned cursor, for consecutive bit fields
    pub fn bit_reader(&mut self) -> BitReader<'_> {
        let bit_position = self.position * 8;
        BitReader::new(self, bit_position)
    }
}
