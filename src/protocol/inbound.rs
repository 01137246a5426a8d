//! # Inbound Packet Decoding
//!
//! The mirror of [`OutboundPacketBuffer`](crate::protocol::outbound::OutboundPacketBuffer).
//!
//! Each packet starts with an obfuscated opcode byte. The decoder subtracts the
//! next stream value, looks the opcode up in a [`PacketSizeTable`] to learn how
//! the length is carried, and hands the payload back as a
//! [`ReadableByteBuffer`].
//!
//! The opcode is decoded as soon as its byte arrives and kept as pending state
//! until the rest of the packet is buffered. The stream is therefore advanced
//! exactly once per packet no matter how the bytes are split across reads.
//!
//! An unknown opcode or an oversized length leaves the decoder out of step
//! with its peer. It refuses every later call with
//! [`ProtocolError::Framing`] instead of drawing again.

use crate::config::MAX_PAYLOAD_SIZE;
use crate::core::reader::ReadableByteBuffer;
use crate::error::{constants, ProtocolError, Result};
use crate::protocol::outbound::PacketHeaderType;
use crate::protocol::stream::OpcodeStream;
use bytes::{Buf, BytesMut};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, instrument, trace, warn};

/// Length of a packet as both peers know it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PacketLength {
    /// Exactly this many payload bytes, no length field
    Fixed(usize),
    /// One-byte length field precedes the payload
    VariableByte,
    /// Two-byte big-endian length field precedes the payload
    VariableShort,
}

impl PacketLength {
    pub fn header_type(self) -> PacketHeaderType {
        match self {
            PacketLength::Fixed(_) => PacketHeaderType::FixedLength,
            PacketLength::VariableByte => PacketHeaderType::VariableLengthByte,
            PacketLength::VariableShort => PacketHeaderType::VariableLengthShort,
        }
    }
}

/// Opcode to packet length lookup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PacketSizeTable {
    sizes: HashMap<u8, PacketLength>,
}

impl PacketSizeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an opcode, returning the previous definition if any
    pub fn insert(&mut self, opcode: u8, length: PacketLength) -> Option<PacketLength> {
        self.sizes.insert(opcode, length)
    }

    pub fn get(&self, opcode: u8) -> Option<PacketLength> {
        self.sizes.get(&opcode).copied()
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }
}

impl FromIterator<(u8, PacketLength)> for PacketSizeTable {
    fn from_iter<I: IntoIterator<Item = (u8, PacketLength)>>(iter: I) -> Self {
        Self {
            sizes: iter.into_iter().collect(),
        }
    }
}

/// A decoded packet
#[derive(Debug, Clone)]
pub struct InboundPacket {
    pub opcode: u8,
    pub payload: ReadableByteBuffer,
}

/// Splits a byte stream into [`InboundPacket`]s
#[derive(Debug)]
pub struct PacketDecoder<S> {
    stream: S,
    sizes: PacketSizeTable,
    max_payload_size: usize,
    pending: Option<(u8, PacketLength)>,
    poisoned: bool,
}

impl<S: OpcodeStream> PacketDecoder<S> {
    pub fn new(stream: S, sizes: PacketSizeTable) -> Self {
        Self {
            stream,
            sizes,
            max_payload_size: MAX_PAYLOAD_SIZE,
            pending: None,
            poisoned: false,
        }
    }

    pub fn with_max_payload_size(mut self, max_payload_size: usize) -> Self {
        self.max_payload_size = max_payload_size;
        self
    }

    /// Whether a failed packet has left the stream out of step
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Opcode already taken from the stream whose payload is still incomplete
    pub fn pending_opcode(&self) -> Option<u8> {
        self.pending.map(|(opcode, _)| opcode)
    }

    /// Decode one packet from the front of `src`.
    ///
    /// Returns `Ok(None)` when more bytes are needed; consumed bytes are only
    /// removed from `src` once the whole packet is available, except for the
    /// opcode byte which is taken immediately.
    #[instrument(skip(self, src), fields(buffered = src.len()))]
    pub fn decode_packet(&mut self, src: &mut BytesMut) -> Result<Option<InboundPacket>> {
        if self.poisoned {
            return Err(ProtocolError::Framing(constants::ERR_DECODER_POISONED));
        }

        let (opcode, length) = match self.pending {
            Some(pending) => pending,
            None => {
                if src.is_empty() {
                    return Ok(None);
                }

                let offset = self.stream.next_value();
                let opcode = src.get_u8().wrapping_sub(offset as u8);
                let Some(length) = self.sizes.get(opcode) else {
                    warn!(opcode, "Unknown opcode");
                    self.poisoned = true;
                    return Err(ProtocolError::UnknownOpcode(opcode));
                };

                trace!(opcode, ?length, "Opcode decoded");
                self.pending = Some((opcode, length));
                (opcode, length)
            }
        };

        let (header_len, payload_len) = match length {
            PacketLength::Fixed(size) => (0, size),
            PacketLength::VariableByte => match src.first() {
                Some(&len) => (1, usize::from(len)),
                None => return Ok(None),
            },
            PacketLength::VariableShort => {
                if src.len() < 2 {
                    return Ok(None);
                }
                (2, usize::from(u16::from_be_bytes([src[0], src[1]])))
            }
        };

        if payload_len > self.max_payload_size {
            warn!(opcode, payload_len, "Packet exceeds max payload size");
            self.poisoned = true;
            return Err(ProtocolError::OversizedPacket(payload_len));
        }

        let total = header_len + payload_len;
        if src.len() < total {
            src.reserve(total - src.len());
            return Ok(None);
        }

        src.advance(header_len);
        let payload = src.split_to(payload_len).freeze();
        self.pending = None;

        debug!(opcode, payload_len, "Packet decoded");
        Ok(Some(InboundPacket {
            opcode,
            payload: ReadableByteBuffer::from(payload),
        }))
    }
}
