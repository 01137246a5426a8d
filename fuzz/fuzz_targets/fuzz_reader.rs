#![no_main]

use libfuzzer_sys::fuzz_target;
use packet_buffer::{DataOrder, ReadableByteBuffer, Signedness, Transformation};

fuzz_target!(|data: &[u8]| {
    // Every reader must report underflow instead of reading past the end
    let mut reader = ReadableByteBuffer::from_slice(data);
    let _ = reader.read_byte(Signedness::Signed, Transformation::Negate);
    let _ = reader.read_short(Signedness::Unsigned, DataOrder::LittleEndian, Transformation::Add);
    let _ = reader.read_tribyte(Signedness::Signed, DataOrder::BigEndian, Transformation::Subtract);
    let _ = reader.read_int(DataOrder::LittleEndian, true, Transformation::None);
    let _ = reader.read_long(DataOrder::BigEndian, Transformation::Add);
    let _ = reader.read_string();
    let _ = reader.read_bits(17);
    let _ = reader.read_bits(32);
});
