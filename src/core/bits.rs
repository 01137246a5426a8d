//! # Bit Cursors
//!
//! Sub-byte packing shared by the writable and readable buffers.
//!
//! Values are written most significant bit first, starting at a running bit
//! position. Every byte touched by a write is updated with a masked
//! read-modify-write so bits outside the written range, possibly belonging to
//! a neighbouring field, are left alone.
//!
//! After each operation the owning buffer's byte cursor is moved to
//! `ceil(bit_position / 8)` so byte-level access can resume straight away.

use crate::core::reader::ReadableByteBuffer;
use crate::core::transform::BIT_MASK;
use crate::core::writer::WritableByteBuffer;
use crate::error::{ProtocolError, Result};
use tracing::trace;

/// Largest number of bits a single call can move
pub const MAX_BIT_COUNT: usize = 32;

#[inline]
fn check_count(count: usize) -> Result<()> {
    if count == 0 || count > MAX_BIT_COUNT {
        return Err(ProtocolError::InvalidBitCount(count));
    }
    Ok(())
}

#[inline]
fn byte_ceil(bit_position: usize) -> usize {
    bit_position.div_ceil(8)
}

/// Chainable bit writer bound to a running bit position.
///
/// Returned by [`WritableByteBuffer::push_bits`]; each call consumes the
/// writer and hands back one positioned right after the bits just written.
#[derive(Debug)]
pub struct BitWriter<'a> {
    buffer: &'a mut WritableByteBuffer,
    bit_position: usize,
}

impl<'a> BitWriter<'a> {
    pub(crate) fn new(buffer: &'a mut WritableByteBuffer, bit_position: usize) -> Self {
        Self {
            buffer,
            bit_position,
        }
    }

    pub fn bit_position(&self) -> usize {
        self.bit_position
    }

    /// Write the low `count` bits (1..=32) of `value`
    pub fn push_bits(self, count: usize, value: u32) -> Result<Self> {
        check_count(count)?;

        let end = self.bit_position + count;
        self.buffer.ensure(byte_ceil(end))?;
        trace!(count, value, bit_position = self.bit_position, "Pushing bits");

        let store = self.buffer.store_mut();
        let mut byte_pos = self.bit_position >> 3;
        let mut bit_offset = 8 - (self.bit_position & 7);
        let mut remaining = count;

        while remaining > bit_offset {
            let mask = BIT_MASK[bit_offset];
            store[byte_pos] &= !mask;
            store[byte_pos] |= (value >> (remaining - bit_offset)) as u8 & mask;
            byte_pos += 1;
            remaining -= bit_offset;
            bit_offset = 8;
        }

        let shift = bit_offset - remaining;
        let mask = BIT_MASK[remaining] << shift;
        store[byte_pos] &= !mask;
        store[byte_pos] |= ((value as u8) & BIT_MASK[remaining]) << shift;

        self.buffer.set_position(byte_ceil(end))?;

        Ok(Self {
            buffer: self.buffer,
            bit_position: end,
        })
    }
}

/// Bit reader bound to a running bit position, mirroring [`BitWriter`].
///
/// Obtained from [`ReadableByteBuffer::bit_reader`]; consecutive reads share
/// the sub-byte position.
#[derive(Debug)]
pub struct BitReader<'a> {
    buffer: &'a mut ReadableByteBuffer,
    bit_position: usize,
}

impl<'a> BitReader<'a> {
    pub(crate) fn new(buffer: &'a mut ReadableByteBuffer, bit_position: usize) -> Self {
        Self {
            buffer,
            bit_position,
        }
    }

    pub fn bit_position(&self) -> usize {
        self.bit_position
    }

    /// Read `count` bits (1..=32), most significant first
    pub fn read_bits(&mut self, count: usize) -> Result<u32> {
        check_count(count)?;

        let end = self.bit_position + count;
        let data = self.buffer.data();
        if byte_ceil(end) > data.len() {
            return Err(ProtocolError::BufferUnderflow {
                needed: byte_ceil(end) - (self.bit_position >> 3),
                remaining: data.len().saturating_sub(self.bit_position >> 3),
            });
        }

        let mut byte_pos = self.bit_position >> 3;
        let mut bit_offset = 8 - (self.bit_position & 7);
        let mut remaining = count;
        let mut value = 0u32;

        while remaining > bit_offset {
            let bits = u32::from(data[byte_pos] & BIT_MASK[bit_offset]);
            value |= bits << (remaining - bit_offset);
            byte_pos += 1;
            remaining -= bit_offset;
            bit_offset = 8;
        }

        let shift = bit_offset - remaining;
        value |= u32::from((data[byte_pos] >> shift) & BIT_MASK[remaining]);

        self.bit_position = end;
        self.buffer.set_position(byte_ceil(end));
        Ok(value)
    }
}
