#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use recoder::{CoderStatus, ErrorAction, ReadCursor, Registry, WriteCursor};

#[derive(Debug, Arbitrary)]
struct Plan {
    encoding: u8,
    bytes: Vec<u8>,
    cuts: Vec<u8>,
    window: u8,
}

const NAMES: &[&str] = &[
    "UTF-8",
    "UTF-16",
    "UTF-16BE",
    "UTF-16LE",
    "US-ASCII",
    "ISO-8859-1",
    "ISO-8859-15",
    "windows-1252",
    "windows-874",
    "KOI8-R",
];

/// Streams `bytes` through a replacing decoder, cut wherever `cuts` says and
/// drained through a window of `window` characters.
fn decode_chunked(name: &str, bytes: &[u8], cuts: &[u8], window: usize) -> String {
    let encoding = Registry::global().resolve(name).unwrap();
    let mut decoder = encoding.new_decoder();
    decoder
        .on_malformed_input(ErrorAction::Replace)
        .on_unmappable_character(ErrorAction::Replace);

    let mut out = vec!['\0'; window];
    let mut decoded = String::new();
    let mut start = 0usize;
    let mut cut_iter = cuts.iter();
    loop {
        let take = match cut_iter.next() {
            Some(&c) => (c as usize).min(bytes.len() - start),
            None => bytes.len() - start,
        };
        let end = start + take;
        let end_of_input = end == bytes.len();
        let mut src = ReadCursor::new(&bytes[start..end]);
        loop {
            let mut dst = WriteCursor::new(&mut out);
            let status = decoder.convert(&mut src, &mut dst, end_of_input);
            decoded.extend(&out[..dst.position()]);
            match status {
                CoderStatus::Underflow => break,
                CoderStatus::Overflow => {}
                status => panic!("replacing decoder surfaced {status:?}"),
            }
        }
        assert!(!src.has_remaining(), "underflow must consume the chunk");
        start = end;
        if end_of_input {
            break;
        }
    }
    loop {
        let mut dst = WriteCursor::new(&mut out);
        let status = decoder.flush(&mut dst);
        decoded.extend(&out[..dst.position()]);
        match status {
            CoderStatus::Underflow => return decoded,
            CoderStatus::Overflow => {}
            status => panic!("flush surfaced {status:?}"),
        }
    }
}

fuzz_target!(|plan: Plan| {
    let name = NAMES[plan.encoding as usize % NAMES.len()];
    let window = 1 + plan.window as usize % 16;
    let chunked = decode_chunked(name, &plan.bytes, &plan.cuts, window);

    // However the stream is cut, the result matches the one-shot decode.
    let encoding = Registry::global().resolve(name).unwrap();
    assert_eq!(chunked, encoding.decode_lossy(&plan.bytes));

    // Whatever came out re-encodes without error in a Unicode encoding.
    let utf8 = Registry::global().resolve("UTF-8").unwrap();
    let bytes = utf8.new_encoder().convert_all(&chunked).unwrap();
    assert_eq!(utf8.new_decoder().convert_all(&bytes).unwrap(), chunked);
});
