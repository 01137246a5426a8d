//! Decoding packets from an async byte stream through `FramedRead`.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use bytes::Bytes;
use futures::SinkExt;
use packet_buffer::{
    DataOrder, FrameEncoder, OutboundPacketBuffer, PacketDecoder, PacketHeaderType, PacketLength,
    PacketSizeTable, ProtocolError, SeededStream, Transformation,
};
use tokio::io::AsyncWriteExt;
use tokio_stream::StreamExt;
use tokio_util::codec::{FramedRead, FramedWrite};

fn sizes() -> PacketSizeTable {
    [(1, PacketLength::Fixed(4)), (2, PacketLength::VariableShort)]
        .into_iter()
        .collect()
}

fn build_packets(stream: &mut SeededStream, count: u32) -> Vec<Bytes> {
    (0..count)
        .map(|i| {
            let mut packet = OutboundPacketBuffer::new(&mut *stream);
            if i % 2 == 0 {
                packet.open_packet(Some(1), PacketHeaderType::FixedLength).unwrap();
                packet
                    .writer()
                    .unwrap()
                    .push_int(i, DataOrder::BigEndian, true, Transformation::Add)
                    .unwrap();
            } else {
                packet.open_packet(Some(2), PacketHeaderType::VariableLengthShort).unwrap();
                packet
                    .writer()
                    .unwrap()
                    .push_string(&format!("packet {i}"))
                    .unwrap();
            }
            packet.finish().unwrap()
        })
        .collect()
}

#[tokio::test]
async fn test_framed_read_over_split_writes() {
    let (mut tx, rx) = SeededStream::pair(2024);
    let packets = build_packets(&mut tx, 20);

    let (mut client, server) = tokio::io::duplex(7);
    let writer = tokio::spawn(async move {
        for packet in packets {
            // Dribble bytes so packets arrive in fragments.
            for chunk in packet.chunks(3) {
                client.write_all(chunk).await.unwrap();
            }
        }
    });

    let mut framed = FramedRead::new(server, PacketDecoder::new(rx, sizes()));
    for i in 0..20u32 {
        let mut packet = framed.next().await.expect("packet").expect("decoded");
        if i % 2 == 0 {
            assert_eq!(packet.opcode, 1);
            assert_eq!(
                packet
                    .payload
                    .read_int(DataOrder::BigEndian, true, Transformation::Add)
                    .unwrap(),
                i
            );
        } else {
            assert_eq!(packet.opcode, 2);
            assert_eq!(packet.payload.read_string().unwrap(), format!("packet {i}"));
        }
    }

    writer.await.unwrap();
    assert!(framed.next().await.is_none());
}

#[tokio::test]
async fn test_framed_write_then_read() {
    let (mut tx, rx) = SeededStream::pair(7);
    let packets = build_packets(&mut tx, 6);

    let mut sink = FramedWrite::new(Vec::new(), FrameEncoder::default());
    for packet in packets {
        sink.send(packet).await.unwrap();
    }
    let wire = sink.into_inner();

    let mut framed = FramedRead::new(&wire[..], PacketDecoder::new(rx, sizes()));
    let mut opcodes = Vec::new();
    while let Some(packet) = framed.next().await {
        opcodes.push(packet.unwrap().opcode);
    }
    assert_eq!(opcodes, vec![1, 2, 1, 2, 1, 2]);
}

#[tokio::test]
async fn test_unknown_opcode_surfaces_as_error() {
    let wire: &[u8] = &[0x00, 0x01, 0x02];
    let decoder = PacketDecoder::new(SeededStream::new(0), PacketSizeTable::new());
    let mut framed = FramedRead::new(wire, decoder);
    let result = framed.next().await.expect("an item");
    assert!(matches!(result, Err(ProtocolError::UnknownOpcode(_))));
}

#[tokio::test]
async fn test_truncated_stream_is_io_error() {
    let (mut tx, rx) = SeededStream::pair(11);
    let packets = build_packets(&mut tx, 2);
    let mut bytes = packets[0].to_vec();
    bytes.extend_from_slice(&packets[1][..packets[1].len() - 1]);

    let mut framed = FramedRead::new(&bytes[..], PacketDecoder::new(rx, sizes()));
    let first = framed.next().await.expect("first").expect("decoded");
    assert_eq!(first.opcode, 1);

    let second = framed.next().await.expect("an item");
    assert!(matches!(second, Err(ProtocolError::Io(_))));
}
