#![allow(missing_docs)]

use recoder::{CoderStatus, Decoder, Encoder, ReadCursor, WriteCursor};

/// Mixed-script fixture covering one- to four-byte UTF-8 units.
pub const POLYGLOT: &str = "Na\u{ef}ve caf\u{e9} \u{2014} \u{43f}\u{440}\u{438}\u{432}\u{435}\u{442} \u{3053}\u{3093}\u{306b}\u{3061}\u{306f} \u{1f30d}\u{20ac}";

/// Streams `bytes` through `decoder` in chunks of `chunk_len`, draining an
/// output window of `out_capacity` characters between calls, exactly as a
/// caller reading from a socket would.
pub fn decode_stream(
    decoder: &mut Decoder,
    bytes: &[u8],
    chunk_len: usize,
    out_capacity: usize,
) -> Result<String, CoderStatus> {
    let mut window = vec!['\0'; out_capacity];
    let mut decoded = String::new();
    let chunks: Vec<&[u8]> = if bytes.is_empty() {
        vec![&[]]
    } else {
        bytes.chunks(chunk_len).collect()
    };
    for (i, chunk) in chunks.iter().enumerate() {
        let end_of_input = i + 1 == chunks.len();
        let mut src = ReadCursor::new(chunk);
        loop {
            let mut dst = WriteCursor::new(&mut window);
            let status = decoder.convert(&mut src, &mut dst, end_of_input);
            let written = dst.position();
            decoded.extend(&window[..written]);
            match status {
                CoderStatus::Underflow => break,
                CoderStatus::Overflow => {}
                status => return Err(status),
            }
        }
    }
    loop {
        let mut dst = WriteCursor::new(&mut window);
        let status = decoder.flush(&mut dst);
        let written = dst.position();
        decoded.extend(&window[..written]);
        if status.is_underflow() {
            return Ok(decoded);
        }
    }
}

/// The encoder mirror of [`decode_stream`].
pub fn encode_stream(
    encoder: &mut Encoder,
    text: &str,
    chunk_len: usize,
    out_capacity: usize,
) -> Result<Vec<u8>, CoderStatus> {
    let chars: Vec<char> = text.chars().collect();
    let mut window = vec![0u8; out_capacity];
    let mut encoded = Vec::new();
    let chunks: Vec<&[char]> = if chars.is_empty() {
        vec![&[]]
    } else {
        chars.chunks(chunk_len).collect()
    };
    for (i, chunk) in chunks.iter().enumerate() {
        let end_of_input = i + 1 == chunks.len();
        let mut src = ReadCursor::new(chunk);
        loop {
            let mut dst = WriteCursor::new(&mut window);
            let status = encoder.convert(&mut src, &mut dst, end_of_input);
            let written = dst.position();
            encoded.extend_from_slice(&window[..written]);
            match status {
                CoderStatus::Underflow => break,
                CoderStatus::Overflow => {}
                status => return Err(status),
            }
        }
    }
    loop {
        let mut dst = WriteCursor::new(&mut window);
        let status = encoder.flush(&mut dst);
        let written = dst.position();
        encoded.extend_from_slice(&window[..written]);
        if status.is_underflow() {
            return Ok(encoded);
        }
    }
}
