//! # Packet Framing
//!
//! Opcode obfuscation and length framing on top of the core buffers.
//!
//! ## Components
//! - **Stream**: the opcode obfuscation stream shared by both peers
//! - **Outbound**: builds one framed packet and backpatches its length
//! - **Inbound**: splits a byte stream back into packets
//! - **Codec**: `tokio_util` adapters for framed I/O

pub mod codec;
pub mod inbound;
pub mod outbound;
pub mod stream;
