//! # packet-buffer
//!
//! Binary serialization for legacy client/server game protocols.
//!
//! - Multi-width integer packing (1, 2, 3, 4 and 8 bytes) with big, little and
//!   word-swapped byte orders
//! - Self-inverse byte transforms on the least significant byte
//! - Bit-level packing that never disturbs neighbouring fields
//! - Packet framing with obfuscated opcodes and backpatched length headers
//!
//! ## Example
//! ```rust
//! use packet_buffer::*;
//!
//! let (mut client, server) = SeededStream::pair(0x5EED);
//!
//! let mut packet = OutboundPacketBuffer::new(&mut client);
//! packet.open_packet(Some(4), PacketHeaderType::VariableLengthByte)?;
//! let writer = packet.writer()?;
//! writer.push_short(1337, DataOrder::LittleEndian, Transformation::Add)?;
//! writer.push_string("player")?;
//! let mut wire = bytes::BytesMut::from(&packet.finish()?[..]);
//!
//! let sizes = [(4, PacketLength::VariableByte)].into_iter().collect();
//! let mut decoder = PacketDecoder::new(server, sizes);
//! let mut inbound = decoder.decode_packet(&mut wire)?.expect("complete packet");
//!
//! assert_eq!(inbound.opcode, 4);
//! let reader = &mut inbound.payload;
//! assert_eq!(
//!     reader.read_short(Signedness::Unsigned, DataOrder::LittleEndian, Transformation::Add)?,
//!     1337
//! );
//! assert_eq!(reader.read_string()?, "player");
//! # Ok::<(), ProtocolError>(())
//! ```
//!
//! ## Concurrency
//! Buffers are single-owner and synchronous. The opcode stream must be drawn
//! in the same order on both peers; see [`protocol::stream`].

pub mod config;
pub mod core;
pub mod error;
pub mod protocol;
pub mod utils;

pub use crate::core::bits::{BitReader, BitWriter};
pub use crate::core::reader::ReadableByteBuffer;
pub use crate::core::transform::{DataOrder, Signedness, Transformation, BIT_MASK};
pub use crate::core::writer::{GrowthPolicy, WritableByteBuffer};
pub use config::CodecConfig;
pub use error::{ProtocolError, Result};
pub use protocol::codec::FrameEncoder;
pub use protocol::inbound::{InboundPacket, PacketDecoder, PacketLength, PacketSizeTable};
pub use protocol::outbound::{OutboundPacketBuffer, PacketHeaderType};
pub use protocol::stream::{OpcodeStream, SeededStream};
