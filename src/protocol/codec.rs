//! Tokio codec adapters.
//!
//! [`PacketDecoder`] plugs into `FramedRead` directly. [`FrameEncoder`] writes
//! packets produced by [`OutboundPacketBuffer::finish`] into a `FramedWrite`
//! sink; they are already framed, so it only checks the size limit.
//!
//! [`OutboundPacketBuffer::finish`]: crate::protocol::outbound::OutboundPacketBuffer::finish

use crate::config::MAX_BUFFER_CAPACITY;
use crate::error::{ProtocolError, Result};
use crate::protocol::inbound::{InboundPacket, PacketDecoder};
use crate::protocol::stream::OpcodeStream;
use bytes::{Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

impl<S: OpcodeStream> Decoder for PacketDecoder<S> {
    type Item = InboundPacket;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<InboundPacket>> {
        self.decode_packet(src)
    }
}

/// Encoder for finished packets
#[derive(Debug, Clone, Copy)]
pub struct FrameEncoder {
    max_frame_size: usize,
}

impl Default for FrameEncoder {
    fn default() -> Self {
        Self::new(MAX_BUFFER_CAPACITY)
    }
}

impl FrameEncoder {
    pub fn new(max_frame_size: usize) -> Self {
        Self { max_frame_size }
    }
}

impl Encoder<Bytes> for FrameEncoder {
    type Error = ProtocolError;

    fn encode(&mut self, frame: Bytes, dst: &mut BytesMut) -> Result<()> {
        if frame.len() > self.max_frame_size {
            return Err(ProtocolError::OversizedPacket(frame.len()));
        }
        dst.extend_from_slice(&frame);
        Ok(())
    }
}
