use bitstream::{BitError, BitReader, BitWriter};

#[test]
fn payload_with_partial_trailing_byte() {
    let mut writer = BitWriter::new();
    writer.write_bits(0b1_0110, 5).unwrap();
    writer.write_bytes(&[0xDE, 0xAD]);
    writer.write_bits(0b011, 3).unwrap();
    let bits = writer.bits_written();
    let bytes = writer.finish();

    let mut reader = BitReader::with_bit_len(&bytes, bits);
    assert_eq!(reader.read_bits(5).unwrap(), 0b1_0110);
    assert_eq!(reader.read_bits_to_vec(19).unwrap(), vec![0xDE, 0xAD, 0b011]);
    assert!(!reader.has_more());
    assert!(matches!(
        reader.read_bit(),
        Err(BitError::EndOfBuffer { position: 24, .. })
    ));
}

#[test]
fn varints_roundtrip_unaligned() {
    let mut writer = BitWriter::new();
    writer.write_bit(false);
    writer.write_varu32(16383);
    writer.write_varu64(u64::MAX);
    writer.write_vars64(i64::MIN);
    let bytes = writer.finish();

    let mut reader = BitReader::new(&bytes);
    assert!(!reader.read_bit().unwrap());
    assert_eq!(reader.read_varu32().unwrap(), 16383);
    assert_eq!(reader.read_varu64().unwrap(), u64::MAX);
    assert_eq!(reader.read_vars64().unwrap(), i64::MIN);
}

#[test]
fn strings_roundtrip() {
    let mut writer = BitWriter::new();
    writer.write_bits(3, 2).unwrap();
    writer.write_cstring("models/player.mdl");
    writer.write_bytes(b"abc");
    let bytes = writer.finish();

    let mut reader = BitReader::new(&bytes);
    assert_eq!(reader.read_bits(2).unwrap(), 3);
    assert_eq!(
        reader.read_cstring(1024).unwrap(),
        b"models/player.mdl".to_vec()
    );
    assert_eq!(reader.read_string(3).unwrap(), "abc");
}
