//! Table-driven single-byte transcoding and US-ASCII.
//!
//! Every table shares ASCII transparency below `0x80`; the upper half maps
//! through a 128-entry table whose `0xFFFD` entries mark bytes the encoding
//! leaves undefined.

use alloc::{boxed::Box, collections::BTreeMap};
use core::ops::ControlFlow;

use super::{Codec, DecodeStep, EncodeStep, Ratios};
use crate::{
    cursor::{ReadCursor, WriteCursor},
    status::CoderStatus,
};

/// Table entry for a byte with no assigned character.
pub const HOLE: u16 = 0xFFFD;

const SINGLE_BYTE_RATIOS: Ratios = Ratios {
    average: 1.0,
    maximum: 1.0,
};

#[allow(clippy::cast_possible_truncation)]
const fn latin1_upper() -> [u16; 128] {
    let mut t = [0u16; 128];
    let mut i = 0;
    while i < 128 {
        t[i] = 0x80 + i as u16;
        i += 1;
    }
    t
}

const fn windows_1252_upper() -> [u16; 128] {
    let mut t = latin1_upper();
    let row = [
        0x20AC, HOLE, 0x201A, 0x0192, 0x201E, 0x2026, 0x2020, 0x2021, //
        0x02C6, 0x2030, 0x0160, 0x2039, 0x0152, HOLE, 0x017D, HOLE, //
        HOLE, 0x2018, 0x2019, 0x201C, 0x201D, 0x2022, 0x2013, 0x2014, //
        0x02DC, 0x2122, 0x0161, 0x203A, 0x0153, HOLE, 0x017E, 0x0178,
    ];
    let mut i = 0;
    while i < row.len() {
        t[i] = row[i];
        i += 1;
    }
    t
}

const fn latin9_upper() -> [u16; 128] {
    let mut t = latin1_upper();
    t[0x24] = 0x20AC;
    t[0x26] = 0x0160;
    t[0x28] = 0x0161;
    t[0x34] = 0x017D;
    t[0x38] = 0x017E;
    t[0x3C] = 0x0152;
    t[0x3D] = 0x0153;
    t[0x3E] = 0x0178;
    t
}

#[allow(clippy::cast_possible_truncation)]
const fn windows_874_upper() -> [u16; 128] {
    let mut t = latin1_upper();
    t[0x00] = 0x20AC;
    t[0x05] = 0x2026;
    let mid = [0x2018, 0x2019, 0x201C, 0x201D, 0x2022, 0x2013, 0x2014];
    let mut i = 0;
    while i < mid.len() {
        t[0x11 + i] = mid[i];
        i += 1;
    }
    let mut b = 0xA1;
    while b <= 0xDA {
        t[b - 0x80] = 0x0E01 + (b - 0xA1) as u16;
        b += 1;
    }
    let mut b = 0xDB;
    while b <= 0xDE {
        t[b - 0x80] = HOLE;
        b += 1;
    }
    let mut b = 0xDF;
    while b <= 0xFB {
        t[b - 0x80] = 0x0E3F + (b - 0xDF) as u16;
        b += 1;
    }
    let mut b = 0xFC;
    while b <= 0xFF {
        t[b - 0x80] = HOLE;
        b += 1;
    }
    t
}

static LATIN1_UPPER: [u16; 128] = latin1_upper();
static LATIN9_UPPER: [u16; 128] = latin9_upper();
static WINDOWS_1252_UPPER: [u16; 128] = windows_1252_upper();
static WINDOWS_874_UPPER: [u16; 128] = windows_874_upper();

#[rustfmt::skip]
static KOI8_R_UPPER: [u16; 128] = [
    0x2500, 0x2502, 0x250C, 0x2510, 0x2514, 0x2518, 0x251C, 0x2524,
    0x252C, 0x2534, 0x253C, 0x2580, 0x2584, 0x2588, 0x258C, 0x2590,
    0x2591, 0x2592, 0x2593, 0x2320, 0x25A0, 0x2219, 0x221A, 0x2248,
    0x2264, 0x2265, 0x00A0, 0x2321, 0x00B0, 0x00B2, 0x00B7, 0x00F7,
    0x2550, 0x2551, 0x2552, 0x0451, 0x2553, 0x2554, 0x2555, 0x2556,
    0x2557, 0x2558, 0x2559, 0x255A, 0x255B, 0x255C, 0x255D, 0x255E,
    0x255F, 0x2560, 0x2561, 0x0401, 0x2562, 0x2563, 0x2564, 0x2565,
    0x2566, 0x2567, 0x2568, 0x2569, 0x256A, 0x256B, 0x256C, 0x00A9,
    0x044E, 0x0430, 0x0431, 0x0446, 0x0434, 0x0435, 0x0444, 0x0433,
    0x0445, 0x0438, 0x0439, 0x043A, 0x043B, 0x043C, 0x043D, 0x043E,
    0x043F, 0x044F, 0x0440, 0x0441, 0x0442, 0x0443, 0x0436, 0x0432,
    0x044C, 0x044B, 0x0437, 0x0448, 0x044D, 0x0449, 0x0447, 0x044A,
    0x042E, 0x0410, 0x0411, 0x0426, 0x0414, 0x0415, 0x0424, 0x0413,
    0x0425, 0x0418, 0x0419, 0x041A, 0x041B, 0x041C, 0x041D, 0x041E,
    0x041F, 0x042F, 0x0420, 0x0421, 0x0422, 0x0423, 0x0416, 0x0412,
    0x042C, 0x042B, 0x0417, 0x0428, 0x042D, 0x0429, 0x0427, 0x042A,
];

/// A table-driven eight-bit encoding.
///
/// Decoding a byte with a [`HOLE`] entry is `Unmappable(1)`; encoding a
/// character absent from the table is likewise `Unmappable(1)`.
#[derive(Debug)]
pub struct SingleByteCodec {
    upper: &'static [u16; 128],
    reverse: BTreeMap<char, u8>,
}

impl SingleByteCodec {
    /// Builds a codec from the table for bytes `0x80..=0xFF`. When two
    /// entries hold the same character, encoding picks the lower byte.
    #[must_use]
    pub fn new(upper: &'static [u16; 128]) -> Self {
        let mut reverse = BTreeMap::new();
        for (byte, &unit) in (0x80..=0xFF_u8).zip(upper.iter()) {
            if unit == HOLE {
                continue;
            }
            let Some(c) = char::from_u32(u32::from(unit)) else {
                unreachable!("single-byte tables hold scalar values");
            };
            reverse.entry(c).or_insert(byte);
        }
        SingleByteCodec { upper, reverse }
    }

    /// ISO-8859-1.
    #[must_use]
    pub fn latin1() -> Self {
        Self::new(&LATIN1_UPPER)
    }

    /// ISO-8859-15.
    #[must_use]
    pub fn latin9() -> Self {
        Self::new(&LATIN9_UPPER)
    }

    /// windows-1252.
    #[must_use]
    pub fn windows_1252() -> Self {
        Self::new(&WINDOWS_1252_UPPER)
    }

    /// windows-874.
    #[must_use]
    pub fn windows_874() -> Self {
        Self::new(&WINDOWS_874_UPPER)
    }

    /// KOI8-R.
    #[must_use]
    pub fn koi8_r() -> Self {
        Self::new(&KOI8_R_UPPER)
    }
}

impl Codec for SingleByteCodec {
    fn decode_ratios(&self) -> Ratios {
        SINGLE_BYTE_RATIOS
    }

    fn encode_ratios(&self) -> Ratios {
        SINGLE_BYTE_RATIOS
    }

    fn new_decode_step(&self) -> Box<dyn DecodeStep> {
        Box::new(SingleByteDecode { upper: self.upper })
    }

    fn new_encode_step(&self) -> Box<dyn EncodeStep> {
        Box::new(SingleByteEncode {
            reverse: self.reverse.clone(),
        })
    }
}

struct SingleByteDecode {
    upper: &'static [u16; 128],
}

impl DecodeStep for SingleByteDecode {
    fn step(
        &mut self,
        src: &mut ReadCursor<'_, u8>,
        dst: &mut WriteCursor<'_, char>,
    ) -> ControlFlow<CoderStatus> {
        let Some(b) = src.peek() else {
            return ControlFlow::Break(CoderStatus::Underflow);
        };
        let c = if b < 0x80 {
            char::from(b)
        } else {
            let unit = self.upper[usize::from(b - 0x80)];
            if unit == HOLE {
                return ControlFlow::Break(CoderStatus::Unmappable(1));
            }
            match char::from_u32(u32::from(unit)) {
                Some(c) => c,
                None => unreachable!("single-byte tables hold scalar values"),
            }
        };
        if !dst.put(c) {
            return ControlFlow::Break(CoderStatus::Overflow);
        }
        src.advance(1);
        ControlFlow::Continue(())
    }
}

struct SingleByteEncode {
    reverse: BTreeMap<char, u8>,
}

impl EncodeStep for SingleByteEncode {
    fn step(
        &mut self,
        src: &mut ReadCursor<'_, char>,
        dst: &mut WriteCursor<'_, u8>,
    ) -> ControlFlow<CoderStatus> {
        let Some(c) = src.peek() else {
            return ControlFlow::Break(CoderStatus::Underflow);
        };
        let b = match u8::try_from(c) {
            Ok(b) if b < 0x80 => b,
            _ => match self.reverse.get(&c) {
                Some(&b) => b,
                None => return ControlFlow::Break(CoderStatus::Unmappable(1)),
            },
        };
        if !dst.put(b) {
            return ControlFlow::Break(CoderStatus::Overflow);
        }
        src.advance(1);
        ControlFlow::Continue(())
    }
}

/// US-ASCII. Bytes at or above `0x80` are malformed on decode, matching the
/// seven-bit definition of the encoding rather than treating them as holes.
#[derive(Debug, Clone, Copy, Default)]
pub struct AsciiCodec;

impl Codec for AsciiCodec {
    fn decode_ratios(&self) -> Ratios {
        SINGLE_BYTE_RATIOS
    }

    fn encode_ratios(&self) -> Ratios {
        SINGLE_BYTE_RATIOS
    }

    fn new_decode_step(&self) -> Box<dyn DecodeStep> {
        Box::new(AsciiDecode)
    }

    fn new_encode_step(&self) -> Box<dyn EncodeStep> {
        Box::new(AsciiEncode)
    }
}

struct AsciiDecode;

impl DecodeStep for AsciiDecode {
    fn step(
        &mut self,
        src: &mut ReadCursor<'_, u8>,
        dst: &mut WriteCursor<'_, char>,
    ) -> ControlFlow<CoderStatus> {
        let Some(b) = src.peek() else {
            return ControlFlow::Break(CoderStatus::Underflow);
        };
        if b >= 0x80 {
            return ControlFlow::Break(CoderStatus::Malformed(1));
        }
        if !dst.put(char::from(b)) {
            return ControlFlow::Break(CoderStatus::Overflow);
        }
        src.advance(1);
        ControlFlow::Continue(())
    }
}

struct AsciiEncode;

impl EncodeStep for AsciiEncode {
    fn step(
        &mut self,
        src: &mut ReadCursor<'_, char>,
        dst: &mut WriteCursor<'_, u8>,
    ) -> ControlFlow<CoderStatus> {
        let Some(c) = src.peek() else {
            return ControlFlow::Break(CoderStatus::Underflow);
        };
        match u8::try_from(c) {
            Ok(b) if b < 0x80 => {
                if !dst.put(b) {
                    return ControlFlow::Break(CoderStatus::Overflow);
                }
                src.advance(1);
                ControlFlow::Continue(())
            }
            _ => ControlFlow::Break(CoderStatus::Unmappable(1)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_one(codec: &dyn Codec, byte: u8) -> Result<char, CoderStatus> {
        let mut step = codec.new_decode_step();
        let input = [byte];
        let mut src = ReadCursor::new(&input);
        let mut out = ['\0'; 1];
        let mut dst = WriteCursor::new(&mut out);
        match step.step(&mut src, &mut dst) {
            ControlFlow::Continue(()) => Ok(out[0]),
            ControlFlow::Break(status) => Err(status),
        }
    }

    fn encode_one(codec: &dyn Codec, c: char) -> Result<u8, CoderStatus> {
        let mut step = codec.new_encode_step();
        let input = [c];
        let mut src = ReadCursor::new(&input);
        let mut out = [0u8; 1];
        let mut dst = WriteCursor::new(&mut out);
        match step.step(&mut src, &mut dst) {
            ControlFlow::Continue(()) => Ok(out[0]),
            ControlFlow::Break(status) => Err(status),
        }
    }

    #[test]
    fn ascii_range_is_transparent_everywhere() {
        for codec in [
            SingleByteCodec::latin1(),
            SingleByteCodec::latin9(),
            SingleByteCodec::windows_1252(),
            SingleByteCodec::windows_874(),
            SingleByteCodec::koi8_r(),
        ] {
            assert_eq!(decode_one(&codec, b'a'), Ok('a'));
            assert_eq!(encode_one(&codec, '~'), Ok(b'~'));
        }
    }

    #[test]
    fn latin1_is_the_identity() {
        assert_eq!(decode_one(&SingleByteCodec::latin1(), 0xE9), Ok('\u{e9}'));
        assert_eq!(decode_one(&SingleByteCodec::latin1(), 0x80), Ok('\u{80}'));
        assert_eq!(encode_one(&SingleByteCodec::latin1(), '\u{ff}'), Ok(0xFF));
    }

    #[test]
    fn latin9_substitutions() {
        let codec = SingleByteCodec::latin9();
        assert_eq!(decode_one(&codec, 0xA4), Ok('\u{20ac}'));
        assert_eq!(decode_one(&codec, 0xBE), Ok('\u{178}'));
        assert_eq!(encode_one(&codec, '\u{20ac}'), Ok(0xA4));
        // The currency sign lost its slot to the euro.
        assert_eq!(
            encode_one(&codec, '\u{a4}'),
            Err(CoderStatus::Unmappable(1))
        );
    }

    #[test]
    fn windows_1252_quotes_and_holes() {
        let codec = SingleByteCodec::windows_1252();
        assert_eq!(decode_one(&codec, 0x80), Ok('\u{20ac}'));
        assert_eq!(decode_one(&codec, 0x93), Ok('\u{201c}'));
        assert_eq!(decode_one(&codec, 0x81), Err(CoderStatus::Unmappable(1)));
        assert_eq!(decode_one(&codec, 0x9D), Err(CoderStatus::Unmappable(1)));
        assert_eq!(encode_one(&codec, '\u{2122}'), Ok(0x99));
    }

    #[test]
    fn windows_874_thai_block() {
        let codec = SingleByteCodec::windows_874();
        assert_eq!(decode_one(&codec, 0xA1), Ok('\u{e01}'));
        assert_eq!(decode_one(&codec, 0xDF), Ok('\u{e3f}'));
        assert_eq!(decode_one(&codec, 0xDB), Err(CoderStatus::Unmappable(1)));
        assert_eq!(decode_one(&codec, 0xFC), Err(CoderStatus::Unmappable(1)));
        assert_eq!(encode_one(&codec, '\u{e01}'), Ok(0xA1));
    }

    #[test]
    fn koi8_r_cyrillic_and_pseudographics() {
        let codec = SingleByteCodec::koi8_r();
        assert_eq!(decode_one(&codec, 0xC1), Ok('\u{430}'));
        assert_eq!(decode_one(&codec, 0xE1), Ok('\u{410}'));
        assert_eq!(decode_one(&codec, 0x80), Ok('\u{2500}'));
        assert_eq!(decode_one(&codec, 0xA3), Ok('\u{451}'));
        assert_eq!(encode_one(&codec, '\u{42e}'), Ok(0xE0));
        assert_eq!(encode_one(&codec, '\u{e9}'), Err(CoderStatus::Unmappable(1)));
    }

    #[test]
    fn ascii_rejects_high_bytes_as_malformed() {
        assert_eq!(decode_one(&AsciiCodec, 0x80), Err(CoderStatus::Malformed(1)));
        assert_eq!(decode_one(&AsciiCodec, 0x41), Ok('A'));
        assert_eq!(
            encode_one(&AsciiCodec, '\u{e9}'),
            Err(CoderStatus::Unmappable(1))
        );
    }
}
