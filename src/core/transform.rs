//! # Byte Transforms
//!
//! Obfuscating transforms applied to the least significant byte of an encoded
//! value, along with the byte orders used by the multi-byte writers and readers.
//!
//! Every transform is an involution over the 8-bit domain: applying it twice
//! returns the original byte. The same function is therefore used to obfuscate
//! on write and to recover the value on read.
//!
//! | Transform  | Mapping               |
//! |------------|-----------------------|
//! | `None`     | `x`                   |
//! | `Add`      | `(x + 128) mod 256`   |
//! | `Subtract` | `(128 - x) mod 256`   |
//! | `Negate`   | `(-x) mod 256`        |

use serde::{Deserialize, Serialize};

/// Low-bit masks indexed by bit count: `BIT_MASK[n] == (1 << n) - 1`.
pub const BIT_MASK: [u8; 9] = [0x00, 0x01, 0x03, 0x07, 0x0F, 0x1F, 0x3F, 0x7F, 0xFF];

/// Transform applied to the least significant byte of a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transformation {
    #[default]
    None,
    Add,
    Subtract,
    Negate,
}

impl Transformation {
    /// All transforms, in declaration order
    pub const ALL: [Transformation; 4] = [
        Transformation::None,
        Transformation::Add,
        Transformation::Subtract,
        Transformation::Negate,
    ];

    /// Apply the transform to a single byte
    #[inline]
    pub fn apply(self, byte: u8) -> u8 {
        match self {
            Transformation::None => byte,
            Transformation::Add => byte.wrapping_add(128),
            Transformation::Subtract => 128u8.wrapping_sub(byte),
            Transformation::Negate => byte.wrapping_neg(),
        }
    }

    /// Apply the transform to the last (least significant) byte of a
    /// big-endian byte group, leaving the rest untouched.
    #[inline]
    pub(crate) fn apply_lsb<const N: usize>(self, mut bytes: [u8; N]) -> [u8; N] {
        if let Some(lsb) = bytes.last_mut() {
            *lsb = self.apply(*lsb);
        }
        bytes
    }
}

/// Emission order of the bytes of a multi-byte value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataOrder {
    #[default]
    BigEndian,
    LittleEndian,
}

impl DataOrder {
    /// Index permutation into a 4-byte big-endian group.
    ///
    /// The mixed variants swap the two 16-bit words: big-mixed emits
    /// `[2, 3, 0, 1]` and little-mixed emits `[1, 0, 3, 2]`.
    pub(crate) fn int_layout(self, mixed: bool) -> [usize; 4] {
        match (self, mixed) {
            (DataOrder::BigEndian, false) => [0, 1, 2, 3],
            (DataOrder::BigEndian, true) => [2, 3, 0, 1],
            (DataOrder::LittleEndian, false) => [3, 2, 1, 0],
            (DataOrder::LittleEndian, true) => [1, 0, 3, 2],
        }
    }

    /// Index permutation into an N-byte big-endian group (plain orders only).
    pub(crate) fn layout<const N: usize>(self) -> [usize; N] {
        let mut indices = [0usize; N];
        for (slot, index) in indices.iter_mut().enumerate() {
            *index = match self {
                DataOrder::BigEndian => slot,
                DataOrder::LittleEndian => N - 1 - slot,
            };
        }
        indices
    }
}

/// Whether a read should interpret its top bit as a sign bit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Signedness {
    Signed,
    #[default]
    Unsigned,
}

impl Signedness {
    /// Interpret the low `bits` bits of `value` according to this signedness
    #[inline]
    pub(crate) fn extend(self, value: u32, bits: u32) -> i32 {
        match self {
            Signedness::Unsigned => value as i32,
            Signedness::Signed => {
                let shift = 32 - bits;
                ((value << shift) as i32) >> shift
            }
        }
    }
}
