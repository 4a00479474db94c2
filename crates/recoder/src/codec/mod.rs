//! Pluggable per-encoding transcoding backends.
//!
//! A [`Codec`] is registered once per encoding descriptor and shared; the
//! step objects it manufactures are owned by one coder and may hold mutable
//! state (byte-order detection, pending byte-order marks). The engine drives
//! a step one unit at a time and owns everything else: carry-over of partial
//! units, error-action policy, replacement sequences, and the protocol state
//! machine.

mod single_byte;
mod utf16;
mod utf8;

pub use single_byte::{AsciiCodec, SingleByteCodec};
pub use utf16::{ByteOrder, Utf16Codec};
pub use utf8::Utf8Codec;

use alloc::boxed::Box;
use core::ops::ControlFlow;

use crate::{
    cursor::{ReadCursor, WriteCursor},
    status::CoderStatus,
};

/// Sizing ratios for one conversion direction: output units per input unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ratios {
    /// Expected output units per input unit; sizes one-shot buffers.
    pub average: f32,
    /// Worst-case output units per input unit; bounds replacement lengths.
    pub maximum: f32,
}

/// One unit of byte→character transcoding.
///
/// `step` converts at most one character worth of input:
///
/// - `Continue(())` — one unit was consumed and its output (possibly
///   nothing, for units like a byte-order mark) written;
/// - `Break(Underflow)` — the input holds no complete unit at the current
///   position; nothing was consumed. The remaining bytes are a unit prefix
///   that the engine carries across calls; a single unit may span at most
///   eight bytes.
/// - `Break(Overflow)` — the output cannot hold the unit's character;
///   nothing was consumed;
/// - `Break(Malformed(n))` / `Break(Unmappable(n))` — an offending run of
///   `n` bytes starts at the input position; nothing was consumed.
pub trait DecodeStep: Send {
    /// Transcodes at most one character.
    fn step(
        &mut self,
        src: &mut ReadCursor<'_, u8>,
        dst: &mut WriteCursor<'_, char>,
    ) -> ControlFlow<CoderStatus>;

    /// Emits output withheld until end of input. `Underflow` means flushing
    /// is complete; `Overflow` means call again with more space.
    fn flush(&mut self, dst: &mut WriteCursor<'_, char>) -> CoderStatus {
        let _ = dst;
        CoderStatus::Underflow
    }

    /// Returns to the freshly-constructed state.
    fn reset(&mut self) {}
}

/// One unit of character→byte transcoding; the mirror of [`DecodeStep`].
///
/// Since every input `char` is a complete unit, `Break(Underflow)` only
/// occurs on an empty input window and encode steps need no carry.
pub trait EncodeStep: Send {
    /// Transcodes at most one character.
    fn step(
        &mut self,
        src: &mut ReadCursor<'_, char>,
        dst: &mut WriteCursor<'_, u8>,
    ) -> ControlFlow<CoderStatus>;

    /// Emits output withheld until end of input. `Underflow` means flushing
    /// is complete; `Overflow` means call again with more space.
    fn flush(&mut self, dst: &mut WriteCursor<'_, u8>) -> CoderStatus {
        let _ = dst;
        CoderStatus::Underflow
    }

    /// Returns to the freshly-constructed state.
    fn reset(&mut self) {}
}

/// Factory and static metadata for one encoding's transcoding algorithm.
pub trait Codec: Send + Sync {
    /// Ratios of the byte→character direction.
    fn decode_ratios(&self) -> Ratios;

    /// Ratios of the character→byte direction.
    fn encode_ratios(&self) -> Ratios;

    /// A fresh decode state machine.
    fn new_decode_step(&self) -> Box<dyn DecodeStep>;

    /// A fresh encode state machine.
    fn new_encode_step(&self) -> Box<dyn EncodeStep>;

    /// The encoding's preferred encoded substitution character, used as the
    /// default encoder replacement.
    fn encode_replacement(&self) -> &[u8] {
        b"?"
    }
}
