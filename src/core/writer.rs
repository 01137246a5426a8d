//! # Writable Byte Buffer
//!
//! A growable byte store with a single write cursor.
//!
//! Multi-byte values are always decomposed into big-endian bytes first, the
//! transform is applied to the least significant byte, and only then are the
//! bytes emitted in the requested order. Mixed and reversed orders move whole
//! bytes around; they never change which byte was transformed.
//!
//! ## Capacity
//! The store is created with an initial capacity. Under [`GrowthPolicy::Grow`]
//! it reallocates on demand (doubling, capped at `max_capacity`); under
//! [`GrowthPolicy::Fixed`] a write that does not fit fails with
//! [`ProtocolError::BufferOverflow`] before any byte is written.
//!
//! ```rust
//! use packet_buffer::{DataOrder, Transformation, WritableByteBuffer};
//!
//! let mut buffer = WritableByteBuffer::new(16);
//! buffer.push_short(0x1234, DataOrder::LittleEndian, Transformation::None)?;
//! buffer.push_bits(4, 0xA)?.push_bits(4, 0xC)?;
//! assert_eq!(buffer.payload(), &[0x34, 0x12, 0xAC]);
//! # Ok::<(), packet_buffer::ProtocolError>(())
//! ```

use crate::config::{DEFAULT_CAPACITY, MAX_BUFFER_CAPACITY, STRING_TERMINATOR};
use crate::core::bits::BitWriter;
use crate::core::transform::{DataOrder, Transformation};
use crate::error::{ProtocolError, Result};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// What happens when a write runs past the end of the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthPolicy {
    /// Reallocate on demand, up to the buffer's maximum capacity
    #[default]
    Grow,
    /// Never reallocate; overflowing writes fail
    Fixed,
}

#[derive(Debug, Clone)]
pub struct WritableByteBuffer {
    store: Vec<u8>,
    position: usize,
    policy: GrowthPolicy,
    max_capacity: usize,
}

impl Default for WritableByteBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl WritableByteBuffer {
    /// Create a growable buffer with the given initial capacity
    pub fn new(capacity: usize) -> Self {
        Self::with_policy(capacity, GrowthPolicy::Grow, MAX_BUFFER_CAPACITY)
    }

    /// Create a buffer that never grows past `capacity`
    pub fn fixed(capacity: usize) -> Self {
        Self::with_policy(capacity, GrowthPolicy::Fixed, capacity)
    }

    pub fn with_policy(capacity: usize, policy: GrowthPolicy, max_capacity: usize) -> Self {
        Self {
            store: vec![0; capacity],
            position: 0,
            policy,
            max_capacity: max_capacity.max(capacity),
        }
    }

    /// Current size of the underlying store (not the number of bytes written)
    pub fn capacity(&self) -> usize {
        self.store.len()
    }

    pub fn policy(&self) -> GrowthPolicy {
        self.policy
    }

    /// Make sure the store can be indexed up to (but excluding) `end`
    pub(crate) fn ensure(&mut self, end: usize) -> Result<()> {
        if end <= self.store.len() {
            return Ok(());
        }

        let limit = match self.policy {
            GrowthPolicy::Fixed => self.store.len(),
            GrowthPolicy::Grow => self.max_capacity,
        };
        if end > limit {
            return Err(ProtocolError::BufferOverflow {
                needed: end,
                capacity: limit,
            });
        }

        let new_len = self.store.len().saturating_mul(2).max(end).min(limit);
        trace!(from = self.store.len(), to = new_len, "Growing byte store");
        self.store.resize(new_len, 0);
        Ok(())
    }

    pub(crate) fn store_mut(&mut self) -> &mut [u8] {
        &mut self.store
    }

    fn put(&mut self, byte: u8) -> Result<()> {
        self.ensure(self.position + 1)?;
        self.store[self.position] = byte;
        self.position += 1;
        Ok(())
    }

    /// Emit `bytes` (big-endian order) following the index permutation `layout`
    fn put_ordered<const N: usize>(&mut self, bytes: [u8; N], layout: [usize; N]) -> Result<()> {
        self.ensure(self.position + N)?;
        for index in layout {
            self.store[self.position] = bytes[index];
            self.position += 1;
        }
        Ok(())
    }

    /// Write one byte: the transformed low 8 bits of `value`
    pub fn push_byte(&mut self, value: i32, transform: Transformation) -> Result<()> {
        self.put(transform.apply(value as u8))
    }

    pub fn push_short(&mut self, value: i32, order: DataOrder, transform: Transformation) -> Result<()> {
        let bytes = transform.apply_lsb([(value >> 8) as u8, value as u8]);
        self.put_ordered(bytes, order.layout())
    }

    pub fn push_tribyte(&mut self, value: i32, order: DataOrder, transform: Transformation) -> Result<()> {
        let bytes = transform.apply_lsb([(value >> 16) as u8, (value >> 8) as u8, value as u8]);
        self.put_ordered(bytes, order.layout())
    }

    /// Write a 4-byte value. `mixed` selects the word-swapped variant of `order`.
    pub fn push_int(
        &mut self,
        value: u32,
        order: DataOrder,
        mixed: bool,
        transform: Transformation,
    ) -> Result<()> {
        let bytes = transform.apply_lsb(value.to_be_bytes());
        self.put_ordered(bytes, order.int_layout(mixed))
    }

    /// Write an 8-byte value given as two 32-bit halves.
    pub fn push_long(
        &mut self,
        high: u32,
        low: u32,
        order: DataOrder,
        transform: Transformation,
    ) -> Result<()> {
        let value = (u64::from(high) << 32) | u64::from(low);
        let bytes = transform.apply_lsb(value.to_be_bytes());
        self.put_ordered(bytes, order.layout())
    }

    /// Write a raw run of bytes, untransformed
    pub fn push_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let end = self.position + bytes.len();
        self.ensure(end)?;
        self.store[self.position..end].copy_from_slice(bytes);
        self.position = end;
        Ok(())
    }

    /// Write each character as a single byte, followed by the `0x0A` terminator.
    ///
    /// Characters outside Latin-1 keep only the low 8 bits of their code point.
    pub fn push_string(&mut self, value: &str) -> Result<()> {
        for c in value.chars() {
            self.put(c as u32 as u8)?;
        }
        self.put(STRING_TERMINATOR)
    }

    /// Write the low `count` bits of `value` starting at the byte-aligned cursor.
    ///
    /// The returned [`BitWriter`] continues from the exact bit where this write
    /// ended, so `push_bits(4, a)?.push_bits(4, b)?` packs both into one byte.
    pub fn push_bits(&mut self, count: usize, value: u32) -> Result<BitWriter<'_>> {
        let bit_position = self.position * 8;
        BitWriter::new(self, bit_position).push_bits(count, value)
    }

    /// Move the cursor. The store grows to cover a cursor past its end
    /// (zero-filled) so the payload is always exactly `position` bytes; a
    /// fixed buffer rejects such a move with `BufferOverflow`.
    pub fn set_position(&mut self, position: usize) -> Result<()> {
        self.ensure(position)?;
        self.position = position;
        Ok(())
    }

    /// Move the cursor to the last valid index of the store (`len - 1`).
    pub fn set_position_to_end(&mut self) {
        self.position = self.store.len().saturating_sub(1);
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Bytes written so far: the store from index 0 up to the cursor
    pub fn payload(&self) -> &[u8] {
        &self.store[..self.position]
    }

    /// Consume the buffer, returning the written bytes
    pub fn freeze(mut self) -> Bytes {
        self.store.truncate(self.position);
        Bytes::from(self.store)
    }
}
