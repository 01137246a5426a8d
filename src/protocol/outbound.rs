//! # Outbound Packet Buffer
//!
//! Frames a single packet on top of a [`WritableByteBuffer`].
//!
//! ## Wire Format
//! ```text
//! FixedLength:          [opcode?] [payload...]
//! VariableLengthByte:   [opcode?] [len u8] [payload...]
//! VariableLengthShort:  [opcode?] [len u16 BE] [payload...]
//! ```
//!
//! The length counts only the payload bytes following the length field. It is
//! unknown while the payload is written, so `open_packet` reserves a zeroed
//! placeholder and `close_packet` seeks back and patches it.
//!
//! ## Lifecycle
//! `Unopened -> open_packet -> Open -> close_packet / finish -> Closed`
//!
//! Opening twice, writing outside `Open` and closing an unopened packet are
//! rejected with [`ProtocolError::Framing`]. So is closing with the cursor
//! rewound into the opcode or length field; the packet is unusable afterwards.
//!
//! ```rust
//! use packet_buffer::{OutboundPacketBuffer, PacketHeaderType, SeededStream};
//!
//! let mut stream = SeededStream::new(42);
//! let mut packet = OutboundPacketBuffer::new(&mut stream);
//! packet.open_packet(Some(10), PacketHeaderType::VariableLengthByte)?;
//! packet.writer()?.push_string("hello")?;
//! let bytes = packet.finish()?;
//! assert_eq!(bytes[1], 6);
//! # Ok::<(), packet_buffer::ProtocolError>(())
//! ```

use crate::core::transform::{DataOrder, Transformation};
use crate::core::writer::WritableByteBuffer;
use crate::error::{constants, ProtocolError, Result};
use crate::protocol::stream::OpcodeStream;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// How a packet's length is carried on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PacketHeaderType {
    /// No length field; both peers know the size
    #[default]
    FixedLength,
    /// One-byte length field
    VariableLengthByte,
    /// Two-byte big-endian length field
    VariableLengthShort,
}

impl PacketHeaderType {
    /// Size of the length field in bytes
    pub fn header_len(self) -> usize {
        match self {
            PacketHeaderType::FixedLength => 0,
            PacketHeaderType::VariableLengthByte => 1,
            PacketHeaderType::VariableLengthShort => 2,
        }
    }

    /// Largest payload the length field can describe
    pub fn max_payload(self) -> usize {
        match self {
            PacketHeaderType::FixedLength => usize::MAX,
            PacketHeaderType::VariableLengthByte => u8::MAX as usize,
            PacketHeaderType::VariableLengthShort => u16::MAX as usize,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameState {
    Unopened,
    Open {
        header_type: PacketHeaderType,
        start: usize,
        header_position: usize,
    },
    Closed,
    /// The opcode stream advanced but the packet could not be framed
    Poisoned,
}

/// Builds one framed packet, drawing from `S` for the opcode
#[derive(Debug)]
pub struct OutboundPacketBuffer<S> {
    buffer: WritableByteBuffer,
    stream: S,
    state: FrameState,
}

impl<S: OpcodeStream> OutboundPacketBuffer<S> {
    pub fn new(stream: S) -> Self {
        Self::with_buffer(WritableByteBuffer::default(), stream)
    }

    /// Frame into an existing buffer, e.g. one built from
    /// [`BufferConfig`](crate::config::BufferConfig)
    pub fn with_buffer(buffer: WritableByteBuffer, stream: S) -> Self {
        Self {
            buffer,
            stream,
            state: FrameState::Unopened,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, FrameState::Open { .. })
    }

    pub fn is_closed(&self) -> bool {
        self.state == FrameState::Closed
    }

    /// Offset at which the open packet starts
    pub fn start_position(&self) -> Option<usize> {
        match self.state {
            FrameState::Open { start, .. } => Some(start),
            _ => None,
        }
    }

    pub fn header_type(&self) -> Option<PacketHeaderType> {
        match self.state {
            FrameState::Open { header_type, .. } => Some(header_type),
            _ => None,
        }
    }

    fn state_error(&self) -> ProtocolError {
        let reason = match self.state {
            FrameState::Unopened => constants::ERR_PACKET_NOT_OPEN,
            FrameState::Open { .. } => constants::ERR_PACKET_ALREADY_OPEN,
            FrameState::Closed => constants::ERR_PACKET_CLOSED,
            FrameState::Poisoned => constants::ERR_PACKET_POISONED,
        };
        warn!(state = ?self.state, reason, "Packet framing violation");
        ProtocolError::Framing(reason)
    }

    /// Start the packet.
    ///
    /// With `Some(opcode)` one byte `(opcode + next_value()) mod 256` is written;
    /// `Some(0)` is a real opcode. A zeroed length placeholder follows for the
    /// variable-length header types.
    pub fn open_packet(&mut self, opcode: Option<u8>, header_type: PacketHeaderType) -> Result<()> {
        if self.state != FrameState::Unopened {
            return Err(self.state_error());
        }

        let start = self.buffer.position();

        if let Some(opcode) = opcode {
            let offset = self.stream.next_value();
            let encoded = opcode.wrapping_add(offset as u8);
            if let Err(e) = self.buffer.push_byte(i32::from(encoded), Transformation::None) {
                self.state = FrameState::Poisoned;
                return Err(e);
            }
        }

        let header_position = self.buffer.position();
        let placeholder = match header_type {
            PacketHeaderType::FixedLength => Ok(()),
            PacketHeaderType::VariableLengthByte => {
                self.buffer.push_byte(0, Transformation::None)
            }
            PacketHeaderType::VariableLengthShort => {
                self.buffer
                    .push_short(0, DataOrder::BigEndian, Transformation::None)
            }
        };

        if let Err(e) = placeholder {
            if opcode.is_some() {
                self.state = FrameState::Poisoned;
            } else {
                self.buffer.set_position(start)?;
            }
            return Err(e);
        }

        self.state = FrameState::Open {
            header_type,
            start,
            header_position,
        };
        debug!(?opcode, ?header_type, start, "Packet opened");
        Ok(())
    }

    /// Access the buffer to write payload fields. Only valid while open.
    pub fn writer(&mut self) -> Result<&mut WritableByteBuffer> {
        if !self.is_open() {
            return Err(self.state_error());
        }
        Ok(&mut self.buffer)
    }

    /// Patch the length placeholder and close the packet.
    ///
    /// The cursor is returned to the end of the payload afterwards so the
    /// extracted bytes include everything written.
    pub fn close_packet(&mut self) -> Result<()> {
        let FrameState::Open {
            header_type,
            start,
            header_position,
        } = self.state
        else {
            return Err(self.state_error());
        };

        let end = self.buffer.position();
        let payload_start = header_position + header_type.header_len();
        if end < payload_start {
            warn!(end, payload_start, "Cursor rewound into the packet header");
            self.state = FrameState::Poisoned;
            return Err(ProtocolError::Framing(constants::ERR_PACKET_TRUNCATED));
        }
        let size = end - payload_start;

        if size > header_type.max_payload() {
            warn!(size, ?header_type, "Payload does not fit the length header");
            self.state = FrameState::Poisoned;
            return Err(ProtocolError::OversizedPacket(size));
        }

        self.buffer.set_position(header_position)?;
        let patched = match header_type {
            PacketHeaderType::FixedLength => Ok(()),
            PacketHeaderType::VariableLengthByte => {
                self.buffer.push_byte(size as i32, Transformation::None)
            }
            PacketHeaderType::VariableLengthShort => {
                self.buffer
                    .push_short(size as i32, DataOrder::BigEndian, Transformation::None)
            }
        };
        self.buffer.set_position(end)?;
        patched?;

        self.state = FrameState::Closed;
        debug!(?header_type, size, total = end - start, "Packet closed");
        Ok(())
    }

    /// Close the packet if still open and return its bytes
    pub fn finish(mut self) -> Result<Bytes> {
        match self.state {
            FrameState::Open { .. } => self.close_packet()?,
            FrameState::Closed => {}
            _ => return Err(self.state_error()),
        }
        Ok(self.buffer.freeze())
    }
}
