//! Opcode obfuscation streams.
//!
//! Both peers hold a stream built from the same seed and draw exactly one value
//! per framed opcode, in the same order. The encoder adds the value to the
//! opcode byte and the decoder subtracts it. Nothing on the wire reveals a
//! desynchronized stream: a skipped or repeated draw on either side simply
//! garbles every opcode that follows, so callers must never retry a packet
//! after the stream has advanced.

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::fmt;

/// Source of opcode obfuscation offsets
pub trait OpcodeStream {
    /// Draw the next offset. Called exactly once per opcode.
    fn next_value(&mut self) -> u32;
}

impl<S: OpcodeStream + ?Sized> OpcodeStream for &mut S {
    fn next_value(&mut self) -> u32 {
        (**self).next_value()
    }
}

impl<S: OpcodeStream + ?Sized> OpcodeStream for Box<S> {
    fn next_value(&mut self) -> u32 {
        (**self).next_value()
    }
}

/// Deterministic stream seeded from a shared `u64`
#[derive(Clone)]
pub struct SeededStream {
    rng: StdRng,
    seed: u64,
    draws: u64,
}

impl SeededStream {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
            draws: 0,
        }
    }

    /// Encoder and decoder halves starting from the same state
    pub fn pair(seed: u64) -> (Self, Self) {
        (Self::new(seed), Self::new(seed))
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of values drawn so far
    pub fn draws(&self) -> u64 {
        self.draws
    }
}

impl OpcodeStream for SeededStream {
    fn next_value(&mut self) -> u32 {
        self.draws += 1;
        self.rng.next_u32()
    }
}

impl fmt::Debug for SeededStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeededStream")
            .field("seed", &self.seed)
            .field("draws", &self.draws)
            .finish()
    }
}
