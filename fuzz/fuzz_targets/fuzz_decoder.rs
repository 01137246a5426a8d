#![no_main]

use bytes::BytesMut;
use libfuzzer_sys::fuzz_target;
use packet_buffer::{PacketDecoder, PacketLength, PacketSizeTable, SeededStream};

fuzz_target!(|data: &[u8]| {
    // Arbitrary wire bytes must never panic the decoder, only error out
    let sizes: PacketSizeTable = (0..=u8::MAX)
        .map(|opcode| {
            let length = match opcode % 3 {
                0 => PacketLength::Fixed(usize::from(opcode)),
                1 => PacketLength::VariableByte,
                _ => PacketLength::VariableShort,
            };
            (opcode, length)
        })
        .collect();

    let mut decoder = PacketDecoder::new(SeededStream::new(0), sizes);
    let mut src = BytesMut::from(data);
    while let Ok(Some(_)) = decoder.decode_packet(&mut src) {}
});
