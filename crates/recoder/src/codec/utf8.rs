//! UTF-8 transcoding.

use alloc::boxed::Box;
use core::ops::ControlFlow;

use super::{Codec, DecodeStep, EncodeStep, Ratios};
use crate::{
    cursor::{ReadCursor, WriteCursor},
    status::CoderStatus,
};

/// The UTF-8 encoding scheme.
///
/// Malformed input is reported in maximal-subpart runs: a bad lead byte or a
/// continuation byte outside its valid range ends the run immediately, so one
/// error never swallows the next well-formed sequence. Surrogate code points
/// and overlong forms are malformed.
#[derive(Debug, Clone, Copy, Default)]
pub struct Utf8Codec;

impl Codec for Utf8Codec {
    fn decode_ratios(&self) -> Ratios {
        Ratios {
            average: 1.0,
            maximum: 1.0,
        }
    }

    fn encode_ratios(&self) -> Ratios {
        Ratios {
            average: 1.1,
            maximum: 4.0,
        }
    }

    fn new_decode_step(&self) -> Box<dyn DecodeStep> {
        Box::new(Utf8Decode)
    }

    fn new_encode_step(&self) -> Box<dyn EncodeStep> {
        Box::new(Utf8Encode)
    }
}

/// Whether `bytes` is a proper prefix of some well-formed sequence, i.e. the
/// next byte could still complete it.
fn is_partial_prefix(bytes: &[u8]) -> bool {
    let Some((&lead, tail)) = bytes.split_first() else {
        return false;
    };
    let (need, first) = match lead {
        0xC2..=0xDF => (1, 0x80..=0xBF),
        0xE0 => (2, 0xA0..=0xBF),
        0xE1..=0xEC | 0xEE..=0xEF => (2, 0x80..=0xBF),
        0xED => (2, 0x80..=0x9F),
        0xF0 => (3, 0x90..=0xBF),
        0xF1..=0xF3 => (3, 0x80..=0xBF),
        0xF4 => (3, 0x80..=0x8F),
        _ => return false,
    };
    tail.len() < need
        && tail.iter().enumerate().all(|(i, &b)| {
            if i == 0 {
                first.contains(&b)
            } else {
                matches!(b, 0x80..=0xBF)
            }
        })
}

struct Utf8Decode;

impl DecodeStep for Utf8Decode {
    fn step(
        &mut self,
        src: &mut ReadCursor<'_, u8>,
        dst: &mut WriteCursor<'_, char>,
    ) -> ControlFlow<CoderStatus> {
        let rest = src.remaining_slice();
        if rest.is_empty() {
            return ControlFlow::Break(CoderStatus::Underflow);
        }
        let (ch, len) = bstr::decode_utf8(rest);
        match ch {
            Some(c) => {
                if !dst.put(c) {
                    return ControlFlow::Break(CoderStatus::Overflow);
                }
                src.advance(len);
                ControlFlow::Continue(())
            }
            // `decode_utf8` reports a truncated suffix with the same shape
            // as a malformed run; only a run that the next byte could still
            // extend into a valid sequence is underflow.
            None if len == rest.len() && is_partial_prefix(rest) => {
                ControlFlow::Break(CoderStatus::Underflow)
            }
            None => ControlFlow::Break(CoderStatus::Malformed(len)),
        }
    }
}

struct Utf8Encode;

impl EncodeStep for Utf8Encode {
    fn step(
        &mut self,
        src: &mut ReadCursor<'_, char>,
        dst: &mut WriteCursor<'_, u8>,
    ) -> ControlFlow<CoderStatus> {
        let Some(c) = src.peek() else {
            return ControlFlow::Break(CoderStatus::Underflow);
        };
        let mut unit = [0u8; 4];
        if !dst.put_all(c.encode_utf8(&mut unit).as_bytes()) {
            return ControlFlow::Break(CoderStatus::Overflow);
        }
        src.advance(1);
        ControlFlow::Continue(())
    }
}
