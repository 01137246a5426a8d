//! # Error Types
//!
//! Error handling for the byte buffers and the packet framing layer.
//!
//! ## Error Categories
//! - **Capacity Errors**: writes past a fixed store, reads past the end of input
//! - **Framing Errors**: packet state machine misuse (open twice, close unopened)
//! - **Protocol Errors**: unknown opcodes, oversized packets, malformed strings
//! - **Configuration Errors**: invalid or unreadable configuration
//!
//! All errors are local and synchronous. Nothing in this crate retries.
//!
//! ## Example Usage
//! ```rust
//! use packet_buffer::error::{ProtocolError, Result};
//! use packet_buffer::ReadableByteBuffer;
//!
//! fn first_short(data: &[u8]) -> Result<i32> {
//!     let mut reader = ReadableByteBuffer::from_slice(data);
//!     reader.read_short(Default::default(), Default::default(), Default::default())
//! }
//!
//! assert!(matches!(
//!     first_short(&[0x01]),
//!     Err(ProtocolError::BufferUnderflow { .. })
//! ));
//! ```

use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

/// Static error messages for framing violations.
pub mod constants {
    pub const ERR_PACKET_ALREADY_OPEN: &str = "Packet opened twice without being closed";
    pub const ERR_PACKET_NOT_OPEN: &str = "Packet is not open";
    pub const ERR_PACKET_CLOSED: &str = "Packet already closed";
    pub const ERR_PACKET_POISONED: &str = "Packet open failed after the opcode stream advanced";
    pub const ERR_PACKET_TRUNCATED: &str = "Cursor was moved back into the packet header";
    pub const ERR_DECODER_POISONED: &str = "Decoder stream is out of step after a failed packet";
}

// ProtocolError is the primary error type for all buffer and framing operations
#[derive(Error, Debug, Serialize, Deserialize)]
pub enum ProtocolError {
    #[error("I/O error: {0}")]
    #[serde(skip_serializing, skip_deserializing)]
    Io(#[from] io::Error),

    #[error("Buffer overflow: {needed} bytes needed, capacity is {capacity}")]
    BufferOverflow { needed: usize, capacity: usize },

    #[error("Buffer underflow: {needed} bytes needed, {remaining} remaining")]
    BufferUnderflow { needed: usize, remaining: usize },

    #[error("Invalid bit count: {0} (expected 1..=32)")]
    InvalidBitCount(usize),

    #[error("Framing error: {0}")]
    #[serde(skip_deserializing)]
    Framing(&'static str),

    #[error("Packet too large: {0} bytes")]
    OversizedPacket(usize),

    #[error("Unknown opcode: {0}")]
    UnknownOpcode(u8),

    #[error("String is missing its terminator")]
    UnterminatedString,

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Type alias for Results using ProtocolError
pub type Result<T> = std::result::Result<T, ProtocolError>;
