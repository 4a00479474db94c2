//! Shared chunked-conversion drivers for the streaming tests.
//!
//! Each driver runs the full `convert → flush` protocol, draining the output
//! window between calls, so tests exercise the same loop a caller would
//! write. Statuses that survive the configured actions come back as `Err`.

use alloc::{string::String, vec, vec::Vec};

use crate::{CoderStatus, Decoder, Encoder, ReadCursor, WriteCursor};

/// Runs one conversion call and asserts the cursor geometry rules: positions
/// never rewind, limits and capacities never move.
pub fn convert_checked<I: Copy, O: Copy>(
    src: &mut ReadCursor<'_, I>,
    dst: &mut WriteCursor<'_, O>,
    convert: impl FnOnce(&mut ReadCursor<'_, I>, &mut WriteCursor<'_, O>) -> CoderStatus,
) -> CoderStatus {
    let (src_pos, src_geom) = (src.position(), (src.limit(), src.capacity()));
    let (dst_pos, dst_geom) = (dst.position(), (dst.limit(), dst.capacity()));
    let status = convert(src, dst);
    assert!(src.position() >= src_pos, "input position must not rewind");
    assert!(dst.position() >= dst_pos, "output position must not rewind");
    assert_eq!((src.limit(), src.capacity()), src_geom, "input window moved");
    assert_eq!((dst.limit(), dst.capacity()), dst_geom, "output window moved");
    status
}

/// The output-only mirror of [`convert_checked`], for `flush`.
pub fn flush_checked<O: Copy>(
    dst: &mut WriteCursor<'_, O>,
    flush: impl FnOnce(&mut WriteCursor<'_, O>) -> CoderStatus,
) -> CoderStatus {
    let (pos, geom) = (dst.position(), (dst.limit(), dst.capacity()));
    let status = flush(dst);
    assert!(dst.position() >= pos, "output position must not rewind");
    assert_eq!((dst.limit(), dst.capacity()), geom, "output window moved");
    status
}

/// Splits `len` elements into chunk lengths derived from `splits`, for the
/// quickcheck properties: every chunk is at least one element and the
/// partition covers the input exactly.
pub fn partition_lengths(len: usize, splits: &[usize]) -> Vec<usize> {
    let mut lengths = Vec::new();
    let mut remaining = len;
    for &s in splits {
        if remaining == 0 {
            break;
        }
        let take = 1 + (s % remaining);
        lengths.push(take);
        remaining -= take;
    }
    if remaining > 0 {
        lengths.push(remaining);
    }
    lengths
}

/// Streams `bytes` through `decoder` in the given partition, draining into
/// an output window of `out_capacity` characters between calls.
pub fn decode_partitioned(
    decoder: &mut Decoder,
    bytes: &[u8],
    partition: &[usize],
    out_capacity: usize,
) -> Result<String, CoderStatus> {
    let mut buf = vec!['\0'; out_capacity];
    let mut decoded = String::new();
    let mut start = 0;
    let chunk_count = partition.len().max(1);
    for i in 0..chunk_count {
        let end_of_input = i + 1 == chunk_count;
        let chunk = partition
            .get(i)
            .map_or(&bytes[0..0], |&len| &bytes[start..start + len]);
        start += chunk.len();
        let mut src = ReadCursor::new(chunk);
        loop {
            let mut dst = WriteCursor::new(&mut buf);
            let status =
                convert_checked(&mut src, &mut dst, |s, d| decoder.convert(s, d, end_of_input));
            let written = dst.position();
            decoded.extend(&buf[..written]);
            match status {
                CoderStatus::Underflow => {
                    assert!(!src.has_remaining(), "underflow must consume all input");
                    break;
                }
                CoderStatus::Overflow => {}
                status => return Err(status),
            }
        }
    }
    loop {
        let mut dst = WriteCursor::new(&mut buf);
        let status = flush_checked(&mut dst, |d| decoder.flush(d));
        let written = dst.position();
        decoded.extend(&buf[..written]);
        if status.is_underflow() {
            return Ok(decoded);
        }
        assert!(status.is_overflow(), "flush signals only buffer state");
    }
}

/// [`decode_partitioned`] over equal-sized chunks.
pub fn decode_in_chunks(
    decoder: &mut Decoder,
    bytes: &[u8],
    chunk_len: usize,
    out_capacity: usize,
) -> Result<String, CoderStatus> {
    let partition: Vec<usize> = bytes.chunks(chunk_len).map(<[u8]>::len).collect();
    decode_partitioned(decoder, bytes, &partition, out_capacity)
}

/// Streams `text` through `encoder` in chunks of `chunk_len` characters,
/// draining into an output window of `out_capacity` bytes between calls.
pub fn encode_in_chunks(
    encoder: &mut Encoder,
    text: &str,
    chunk_len: usize,
    out_capacity: usize,
) -> Result<Vec<u8>, CoderStatus> {
    let chars: Vec<char> = text.chars().collect();
    let mut buf = vec![0u8; out_capacity];
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
            let mut dst = WriteCursor::new(&mut buf);
            let status =
                convert_checked(&mut src, &mut dst, |s, d| encoder.convert(s, d, end_of_input));
            let written = dst.position();
            encoded.extend_from_slice(&buf[..written]);
            match status {
                CoderStatus::Underflow => {
                    assert!(!src.has_remaining(), "underflow must consume all input");
                    break;
                }
                CoderStatus::Overflow => {}
                status => return Err(status),
            }
        }
    }
    loop {
        let mut dst = WriteCursor::new(&mut buf);
        let status = flush_checked(&mut dst, |d| encoder.flush(d));
        let written = dst.position();
        encoded.extend_from_slice(&buf[..written]);
        if status.is_underflow() {
            return Ok(encoded);
        }
        assert!(status.is_overflow(), "flush signals only buffer state");
    }
}
