//! # Core Buffer Components
//!
//! Byte-level encoding and decoding primitives.
//!
//! ## Components
//! - **Transform**: obfuscating byte transforms, byte orders and the bit mask table
//! - **Writer**: growable byte buffer with multi-width, transformed writers
//! - **Reader**: the mirrored readers with signed/unsigned selection
//! - **Bits**: chained bit-level writer and reader
//!
//! ## Encoding Model
//! ```text
//! value -> big-endian bytes -> transform(LSB) -> reorder -> store
//! store -> reorder back -> transform(LSB) -> big-endian value
//! ```

pub mod bits;
pub mod reader;
pub mod transform;
pub mod writer;
