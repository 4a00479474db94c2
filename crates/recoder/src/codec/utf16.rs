//! UTF-16 transcoding in both byte orders, with optional byte-order-mark
//! handling.

use alloc::boxed::Box;
use core::ops::ControlFlow;

use super::{Codec, DecodeStep, EncodeStep, Ratios};
use crate::{
    cursor::{ReadCursor, WriteCursor},
    status::CoderStatus,
};

const MARK: u16 = 0xFEFF;
const SWAPPED_MARK: u16 = 0xFFFE;

/// Serialized order of the two bytes in a 16-bit code unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Most significant byte first.
    Big,
    /// Least significant byte first.
    Little,
}

impl ByteOrder {
    fn read_unit(self, bytes: [u8; 2]) -> u16 {
        match self {
            ByteOrder::Big => u16::from_be_bytes(bytes),
            ByteOrder::Little => u16::from_le_bytes(bytes),
        }
    }

    fn write_unit(self, unit: u16) -> [u8; 2] {
        match self {
            ByteOrder::Big => unit.to_be_bytes(),
            ByteOrder::Little => unit.to_le_bytes(),
        }
    }
}

fn is_high_surrogate(unit: u16) -> bool {
    matches!(unit, 0xD800..=0xDBFF)
}

fn is_low_surrogate(unit: u16) -> bool {
    matches!(unit, 0xDC00..=0xDFFF)
}

fn combine(high: u16, low: u16) -> char {
    let scalar = 0x10000 + ((u32::from(high) - 0xD800) << 10) + (u32::from(low) - 0xDC00);
    match char::from_u32(scalar) {
        Some(c) => c,
        None => unreachable!("surrogate pair out of the supplementary range"),
    }
}

/// The UTF-16 encoding scheme.
///
/// A malformed run is always one 16-bit unit: a lone low surrogate, a high
/// surrogate not followed by a low one, or the byte-swapped mark value
/// `0xFFFE`, which cannot occur inside a well-formed stream. A `U+FEFF`
/// after the stream start is an ordinary character and passes through.
#[derive(Debug, Clone, Copy)]
pub struct Utf16Codec {
    order: ByteOrder,
    mark: bool,
}

impl Utf16Codec {
    /// Big-endian, no byte-order-mark handling.
    #[must_use]
    pub fn big_endian() -> Self {
        Utf16Codec {
            order: ByteOrder::Big,
            mark: false,
        }
    }

    /// Little-endian, no byte-order-mark handling.
    #[must_use]
    pub fn little_endian() -> Self {
        Utf16Codec {
            order: ByteOrder::Little,
            mark: false,
        }
    }

    /// Byte-order-mark handling: the decoder honors a leading mark to pick
    /// its order (big-endian when none is present) and the encoder writes a
    /// big-endian mark before its first unit. `reset` re-arms both.
    #[must_use]
    pub fn with_mark() -> Self {
        Utf16Codec {
            order: ByteOrder::Big,
            mark: true,
        }
    }
}

impl Codec for Utf16Codec {
    fn decode_ratios(&self) -> Ratios {
        Ratios {
            average: 0.5,
            maximum: 1.0,
        }
    }

    fn encode_ratios(&self) -> Ratios {
        Ratios {
            average: 2.0,
            // Worst case is a surrogate pair, plus the mark in front of it.
            maximum: if self.mark { 6.0 } else { 4.0 },
        }
    }

    fn new_decode_step(&self) -> Box<dyn DecodeStep> {
        Box::new(Utf16Decode::new(*self))
    }

    fn new_encode_step(&self) -> Box<dyn EncodeStep> {
        Box::new(Utf16Encode::new(*self))
    }

    fn encode_replacement(&self) -> &[u8] {
        match self.order {
            ByteOrder::Big => &[0xFF, 0xFD],
            ByteOrder::Little => &[0xFD, 0xFF],
        }
    }
}

struct Utf16Decode {
    codec: Utf16Codec,
    /// `None` while byte-order detection is still pending.
    order: Option<ByteOrder>,
}

impl Utf16Decode {
    fn new(codec: Utf16Codec) -> Self {
        Utf16Decode {
            order: (!codec.mark).then_some(codec.order),
            codec,
        }
    }
}

impl DecodeStep for Utf16Decode {
    fn step(
        &mut self,
        src: &mut ReadCursor<'_, u8>,
        dst: &mut WriteCursor<'_, char>,
    ) -> ControlFlow<CoderStatus> {
        let rest = src.remaining_slice();
        if rest.len() < 2 {
            return ControlFlow::Break(CoderStatus::Underflow);
        }
        let order = match self.order {
            Some(order) => order,
            None => match (rest[0], rest[1]) {
                (0xFE, 0xFF) => {
                    self.order = Some(ByteOrder::Big);
                    src.advance(2);
                    return ControlFlow::Continue(());
                }
                (0xFF, 0xFE) => {
                    self.order = Some(ByteOrder::Little);
                    src.advance(2);
                    return ControlFlow::Continue(());
                }
                _ => {
                    self.order = Some(ByteOrder::Big);
                    ByteOrder::Big
                }
            },
        };
        let unit = order.read_unit([rest[0], rest[1]]);
        if unit == SWAPPED_MARK || is_low_surrogate(unit) {
            return ControlFlow::Break(CoderStatus::Malformed(2));
        }
        if is_high_surrogate(unit) {
            if rest.len() < 4 {
                return ControlFlow::Break(CoderStatus::Underflow);
            }
            let second = order.read_unit([rest[2], rest[3]]);
            if !is_low_surrogate(second) {
                return ControlFlow::Break(CoderStatus::Malformed(2));
            }
            if !dst.put(combine(unit, second)) {
                return ControlFlow::Break(CoderStatus::Overflow);
            }
            src.advance(4);
            return ControlFlow::Continue(());
        }
        let c = match char::from_u32(u32::from(unit)) {
            Some(c) => c,
            None => unreachable!("a non-surrogate unit is a scalar value"),
        };
        if !dst.put(c) {
            return ControlFlow::Break(CoderStatus::Overflow);
        }
        src.advance(2);
        ControlFlow::Continue(())
    }

    fn reset(&mut self) {
        self.order = (!self.codec.mark).then_some(self.codec.order);
    }
}

struct Utf16Encode {
    codec: Utf16Codec,
    pending_mark: bool,
}

impl Utf16Encode {
    fn new(codec: Utf16Codec) -> Self {
        Utf16Encode {
            pending_mark: codec.mark,
            codec,
        }
    }
}

impl EncodeStep for Utf16Encode {
    fn step(
        &mut self,
        src: &mut ReadCursor<'_, char>,
        dst: &mut WriteCursor<'_, u8>,
    ) -> ControlFlow<CoderStatus> {
        let Some(c) = src.peek() else {
            return ControlFlow::Break(CoderStatus::Underflow);
        };
        let order = self.codec.order;
        let mut bytes = [0u8; 6];
        let mut len = 0;
        if self.pending_mark {
            bytes[..2].copy_from_slice(&order.write_unit(MARK));
            len = 2;
        }
        let mut units = [0u16; 2];
        for unit in c.encode_utf16(&mut units) {
            bytes[len..len + 2].copy_from_slice(&order.write_unit(*unit));
            len += 2;
        }
        // The mark travels with the first unit, all or nothing, so a retry
        // after Overflow never emits it twice.
        if !dst.put_all(&bytes[..len]) {
            return ControlFlow::Break(CoderStatus::Overflow);
        }
        self.pending_mark = false;
        src.advance(1);
        ControlFlow::Continue(())
    }

    fn reset(&mut self) {
        self.pending_mark = self.codec.mark;
    }
}
