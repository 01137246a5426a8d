//! Integration tests for packet framing: opcode obfuscation, length
//! backpatching and the inbound mirror.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use bytes::BytesMut;
use packet_buffer::error::constants;
use packet_buffer::{
    DataOrder, OpcodeStream, OutboundPacketBuffer, PacketDecoder, PacketHeaderType, PacketLength,
    PacketSizeTable, ProtocolError, SeededStream, Signedness, Transformation,
};

/// Stream that hands out a fixed script of values
struct Script(std::vec::IntoIter<u32>);

impl Script {
    fn new(values: &[u32]) -> Self {
        Self(values.to_vec().into_iter())
    }
}

impl OpcodeStream for Script {
    fn next_value(&mut self) -> u32 {
        self.0.next().expect("script exhausted")
    }
}

#[test]
fn test_opcode_offset_from_stream() {
    let mut packet = OutboundPacketBuffer::new(Script::new(&[200]));
    packet.open_packet(Some(10), PacketHeaderType::FixedLength).unwrap();
    let bytes = packet.finish().unwrap();
    assert_eq!(&bytes[..], &[210]);
}

#[test]
fn test_variable_byte_header_counts_payload_only() {
    let mut packet = OutboundPacketBuffer::new(Script::new(&[0]));
    packet.open_packet(Some(1), PacketHeaderType::VariableLengthByte).unwrap();
    packet
        .writer()
        .unwrap()
        .push_bytes(&[0x10, 0x20, 0x30, 0x40, 0x50])
        .unwrap();

    let bytes = packet.finish().unwrap();
    assert_eq!(&bytes[..], &[1, 5, 0x10, 0x20, 0x30, 0x40, 0x50]);
}

#[test]
fn test_variable_byte_header_without_opcode() {
    let mut packet = OutboundPacketBuffer::new(Script::new(&[]));
    packet.open_packet(None, PacketHeaderType::VariableLengthByte).unwrap();
    packet.writer().unwrap().push_bytes(&[1, 2, 3, 4, 5]).unwrap();

    let bytes = packet.finish().unwrap();
    assert_eq!(bytes[0], 5);
    assert_eq!(&bytes[1..], &[1, 2, 3, 4, 5]);
}

#[test]
fn test_variable_short_header() {
    let mut packet = OutboundPacketBuffer::new(Script::new(&[1]));
    packet.open_packet(Some(0xFF), PacketHeaderType::VariableLengthShort).unwrap();
    let writer = packet.writer().unwrap();
    writer
        .push_int(0xCAFEBABE, DataOrder::LittleEndian, true, Transformation::Add)
        .unwrap();
    writer.push_string("abc").unwrap();

    let bytes = packet.finish().unwrap();
    assert_eq!(bytes[0], 0x00);
    assert_eq!(&bytes[1..3], &[0x00, 0x08]);
    assert_eq!(bytes.len(), 11);
}

#[test]
fn test_empty_variable_packet() {
    let mut packet = OutboundPacketBuffer::new(Script::new(&[0]));
    packet.open_packet(Some(9), PacketHeaderType::VariableLengthShort).unwrap();
    assert_eq!(&packet.finish().unwrap()[..], &[9, 0, 0]);
}

#[test]
fn test_packet_state_reporting() {
    let mut packet = OutboundPacketBuffer::new(Script::new(&[0]));
    assert!(!packet.is_open());
    assert_eq!(packet.start_position(), None);

    packet.open_packet(Some(1), PacketHeaderType::VariableLengthByte).unwrap();
    assert!(packet.is_open());
    assert_eq!(packet.start_position(), Some(0));
    assert_eq!(packet.header_type(), Some(PacketHeaderType::VariableLengthByte));

    packet.close_packet().unwrap();
    assert!(packet.is_closed());
    assert_eq!(packet.header_type(), None);
}

#[test]
fn test_finish_unopened_is_framing_error() {
    let packet = OutboundPacketBuffer::new(Script::new(&[]));
    match packet.finish() {
        Err(ProtocolError::Framing(reason)) => assert_eq!(reason, constants::ERR_PACKET_NOT_OPEN),
        other => panic!("Unexpected result: {other:?}"),
    }
}

#[test]
fn test_close_twice_is_framing_error() {
    let mut packet = OutboundPacketBuffer::new(Script::new(&[]));
    packet.open_packet(None, PacketHeaderType::FixedLength).unwrap();
    packet.close_packet().unwrap();
    assert!(matches!(
        packet.close_packet(),
        Err(ProtocolError::Framing(constants::ERR_PACKET_CLOSED))
    ));
}

#[test]
fn test_reopen_does_not_draw_from_stream() {
    let mut stream = SeededStream::new(3);
    let mut packet = OutboundPacketBuffer::new(&mut stream);
    packet.open_packet(Some(1), PacketHeaderType::FixedLength).unwrap();
    assert!(packet.open_packet(Some(2), PacketHeaderType::FixedLength).is_err());
    drop(packet);
    assert_eq!(stream.draws(), 1);
}

#[test]
fn test_session_of_packets_round_trips() {
    let (mut client, server) = SeededStream::pair(0xDEC0DE);
    let sizes: PacketSizeTable = [
        (0, PacketLength::Fixed(3)),
        (41, PacketLength::VariableByte),
        (185, PacketLength::VariableShort),
    ]
    .into_iter()
    .collect();

    let mut wire = BytesMut::new();

    let mut movement = OutboundPacketBuffer::new(&mut client);
    movement.open_packet(Some(0), PacketHeaderType::FixedLength).unwrap();
    let writer = movement.writer().unwrap();
    writer.push_bits(10, 700).unwrap().push_bits(10, 3).unwrap().push_bits(4, 9).unwrap();
    wire.extend_from_slice(&movement.finish().unwrap());

    let mut chat = OutboundPacketBuffer::new(&mut client);
    chat.open_packet(Some(41), PacketHeaderType::VariableLengthByte).unwrap();
    let writer = chat.writer().unwrap();
    writer.push_byte(2, Transformation::Subtract).unwrap();
    writer.push_string("hello world").unwrap();
    wire.extend_from_slice(&chat.finish().unwrap());

    let mut region = OutboundPacketBuffer::new(&mut client);
    region.open_packet(Some(185), PacketHeaderType::VariableLengthShort).unwrap();
    let writer = region.writer().unwrap();
    for tile in 0..200u32 {
        writer
            .push_tribyte(tile as i32 * 31, DataOrder::LittleEndian, Transformation::Negate)
            .unwrap();
    }
    wire.extend_from_slice(&region.finish().unwrap());

    let mut decoder = PacketDecoder::new(server, sizes);

    let mut movement = decoder.decode_packet(&mut wire).unwrap().unwrap();
    assert_eq!(movement.opcode, 0);
    let mut bits = movement.payload.bit_reader();
    assert_eq!(bits.read_bits(10).unwrap(), 700);
    assert_eq!(bits.read_bits(10).unwrap(), 3);
    assert_eq!(bits.read_bits(4).unwrap(), 9);

    let mut chat = decoder.decode_packet(&mut wire).unwrap().unwrap();
    assert_eq!(chat.opcode, 41);
    assert_eq!(
        chat.payload.read_byte(Signedness::Unsigned, Transformation::Subtract).unwrap(),
        2
    );
    assert_eq!(chat.payload.read_string().unwrap(), "hello world");

    let mut region = decoder.decode_packet(&mut wire).unwrap().unwrap();
    assert_eq!(region.opcode, 185);
    for tile in 0..200 {
        assert_eq!(
            region
                .payload
                .read_tribyte(Signedness::Unsigned, DataOrder::LittleEndian, Transformation::Negate)
                .unwrap(),
            tile * 31
        );
    }

    assert!(wire.is_empty());
    assert!(decoder.decode_packet(&mut wire).unwrap().is_none());
}

#[test]
fn test_desynchronized_streams_garble_opcodes() {
    let mut client = SeededStream::new(1);
    let server = SeededStream::new(2);

    let mut packet = OutboundPacketBuffer::new(&mut client);
    packet.open_packet(Some(5), PacketHeaderType::FixedLength).unwrap();
    let mut wire = BytesMut::from(&packet.finish().unwrap()[..]);

    // Every opcode is known, so a wrong offset still decodes, just not to 5.
    let sizes: PacketSizeTable = (0..=u8::MAX).map(|op| (op, PacketLength::Fixed(0))).collect();
    let mut decoder = PacketDecoder::new(server, sizes);
    let decoded = decoder.decode_packet(&mut wire).unwrap().unwrap();

    let mut expected = SeededStream::new(1);
    let mut wrong = SeededStream::new(2);
    let shift = (expected.next_value() as u8).wrapping_sub(wrong.next_value() as u8);
    assert_eq!(decoded.opcode, 5u8.wrapping_add(shift));
}
