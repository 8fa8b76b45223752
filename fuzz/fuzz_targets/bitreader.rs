#![no_main]

use bitstream::BitReader;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut reader = BitReader::new(data);
    let mut idx = 0usize;

    // Input bytes drive a bounded sequence of reads over the same buffer.
    while idx < data.len() && idx < 1024 {
        let op = data[idx] % 7;
        let arg = u32::from(data[idx]);
        idx += 1;

        match op {
            0 => {
                let _ = reader.read_bit();
            }
            1 => {
                let _ = reader.read_bits(arg % 33);
            }
            2 => {
                let _ = reader.read_signed(arg % 33);
            }
            3 => {
                let _ = reader.read_cstring(64);
            }
            4 => {
                let _ = reader.read_varu32();
            }
            5 => {
                let _ = reader.read_vars64();
            }
            _ => {
                let _ = reader.read_bits_to_vec(arg as usize);
            }
        }
    }
});
