use alloc::{string::String, vec::Vec};

use quickcheck::QuickCheck;

use crate::{
    ErrorAction, Registry,
    tests::utils::{decode_partitioned, encode_in_chunks, partition_lengths},
};

/// Property: decoding a byte stream must not depend on how the stream is cut
/// into `convert` calls or on the size of the output window. Runs under
/// replacing actions so arbitrary byte soup stays total.
#[test]
fn decode_partition_invariance_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(bytes: Vec<u8>, splits: Vec<usize>, out_seed: usize) -> bool {
        let out_capacity = 1 + out_seed % 8;
        let partition = partition_lengths(bytes.len(), &splits);
        ["UTF-8", "UTF-16", "UTF-16BE", "windows-1252"]
            .iter()
            .all(|name| {
                let encoding = Registry::global().resolve(name).unwrap();
                let one_shot = encoding.decode_lossy(&bytes);
                let mut decoder = encoding.new_decoder();
                decoder
                    .on_malformed_input(ErrorAction::Replace)
                    .on_unmappable_character(ErrorAction::Replace);
                let chunked =
                    decode_partitioned(&mut decoder, &bytes, &partition, out_capacity).unwrap();
                chunked == one_shot
            })
    }

    #[cfg(not(miri))]
    let tests = if is_ci::cached() { 10_000 } else { 1_000 };
    #[cfg(miri)]
    let tests = 10;

    QuickCheck::new()
        .tests(tests)
        .quickcheck(prop as fn(Vec<u8>, Vec<usize>, usize) -> bool);
}

/// Property: the encoder mirror of partition invariance, including the
/// one-time byte-order mark of the marked UTF-16 encoder.
#[test]
fn encode_partition_invariance_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(text: String, chunk_seed: usize, out_seed: usize) -> bool {
        let chunk_len = 1 + chunk_seed % 5;
        let out_capacity = 1 + out_seed % 8;
        ["UTF-8", "UTF-16", "UTF-16LE", "ISO-8859-15"]
            .iter()
            .all(|name| {
                let encoding = Registry::global().resolve(name).unwrap();
                let one_shot = encoding.encode_lossy(&text);
                let mut encoder = encoding.new_encoder();
                encoder
                    .on_malformed_input(ErrorAction::Replace)
                    .on_unmappable_character(ErrorAction::Replace);
                let chunked =
                    encode_in_chunks(&mut encoder, &text, chunk_len, out_capacity).unwrap();
                chunked == one_shot
            })
    }

    #[cfg(not(miri))]
    let tests = if is_ci::cached() { 10_000 } else { 1_000 };
    #[cfg(miri)]
    let tests = 10;

    QuickCheck::new()
        .tests(tests)
        .quickcheck(prop as fn(String, usize, usize) -> bool);
}
