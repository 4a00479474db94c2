//! Streaming byte to character conversion.

use alloc::{boxed::Box, string::String, vec::Vec};
use core::{fmt, ops::ControlFlow};

use crate::{
    codec::{Codec, DecodeStep, Ratios},
    coder::{CoderState, ErrorAction, check_ratios, check_replacement_len},
    cursor::{ReadCursor, WriteCursor},
    error::{CodingError, ReplacementError},
    status::CoderStatus,
};

const DEFAULT_REPLACEMENT: &str = "\u{FFFD}";

/// Most bytes a single transcoding unit may span.
const CARRY_MAX: usize = 8;

/// Bytes of an incomplete transcoding unit held across `convert` calls, so
/// that a unit split over two input buffers never forces the caller to
/// compact or re-present bytes it already handed over.
struct Carry {
    buf: [u8; CARRY_MAX],
    len: usize,
}

impl Carry {
    fn new() -> Self {
        Carry {
            buf: [0; CARRY_MAX],
            len: 0,
        }
    }

    fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn len(&self) -> usize {
        self.len
    }

    fn bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    fn push(&mut self, b: u8) {
        assert!(
            self.len < CARRY_MAX,
            "transcoding unit exceeds {CARRY_MAX} bytes"
        );
        self.buf[self.len] = b;
        self.len += 1;
    }

    fn drop_front(&mut self, n: usize) {
        debug_assert!(n <= self.len);
        self.buf.copy_within(n..self.len, 0);
        self.len -= n;
    }

    fn clear(&mut self) {
        self.len = 0;
    }
}

/// A streaming converter from bytes in one encoding to characters.
///
/// A decoder is cheap to construct, owns all of its conversion state, and
/// must not be shared between threads mid-sequence; create one per stream.
/// The expected call sequence is any number of
/// [`convert`](Decoder::convert) calls with `end_of_input = false`, one
/// with `true`, then [`flush`](Decoder::flush). [`reset`](Decoder::reset)
/// makes the instance ready for a new stream at any point.
///
/// # Examples
///
/// ```
/// use recoder::{ReadCursor, Registry, WriteCursor};
///
/// let encoding = Registry::global().resolve("UTF-8").unwrap();
/// let mut decoder = encoding.new_decoder();
/// let mut out = ['\0'; 4];
/// let mut src = ReadCursor::new(&[0xC3, 0xA9]);
/// let mut dst = WriteCursor::new(&mut out);
/// let status = decoder.convert(&mut src, &mut dst, true);
/// assert!(status.is_underflow());
/// assert_eq!(out[0], 'é');
/// ```
pub struct Decoder {
    step: Box<dyn DecodeStep>,
    average_chars_per_byte: f32,
    max_chars_per_byte: f32,
    malformed_action: ErrorAction,
    unmappable_action: ErrorAction,
    replacement: String,
    carry: Carry,
    state: CoderState,
}

impl Decoder {
    pub(crate) fn new(codec: &dyn Codec) -> Self {
        let Ratios { average, maximum } = codec.decode_ratios();
        check_ratios(average, maximum);
        Decoder {
            step: codec.new_decode_step(),
            average_chars_per_byte: average,
            max_chars_per_byte: maximum,
            malformed_action: ErrorAction::default(),
            unmappable_action: ErrorAction::default(),
            replacement: String::from(DEFAULT_REPLACEMENT),
            carry: Carry::new(),
            state: CoderState::Reset,
        }
    }

    /// Expected characters produced per input byte.
    #[must_use]
    pub fn average_chars_per_byte(&self) -> f32 {
        self.average_chars_per_byte
    }

    /// Most characters a single input byte can produce; bounds the
    /// replacement length.
    #[must_use]
    pub fn max_chars_per_byte(&self) -> f32 {
        self.max_chars_per_byte
    }

    /// Action taken on malformed input.
    #[must_use]
    pub fn malformed_input_action(&self) -> ErrorAction {
        self.malformed_action
    }

    /// Action taken on bytes with no character in this encoding.
    #[must_use]
    pub fn unmappable_character_action(&self) -> ErrorAction {
        self.unmappable_action
    }

    /// The sequence written for an offending run under
    /// [`ErrorAction::Replace`].
    #[must_use]
    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    /// Sets the action for malformed input.
    pub fn on_malformed_input(&mut self, action: ErrorAction) -> &mut Self {
        self.malformed_action = action;
        self
    }

    /// Sets the action for unmappable bytes.
    pub fn on_unmappable_character(&mut self, action: ErrorAction) -> &mut Self {
        self.unmappable_action = action;
        self
    }

    /// Replaces the sequence used by [`ErrorAction::Replace`].
    ///
    /// # Errors
    ///
    /// Rejects an empty replacement and one longer than
    /// [`max_chars_per_byte`](Decoder::max_chars_per_byte) characters.
    pub fn replace_with(&mut self, replacement: String) -> Result<&mut Self, ReplacementError> {
        check_replacement_len(replacement.chars().count(), self.max_chars_per_byte)?;
        self.replacement = replacement;
        Ok(self)
    }

    /// Discards all conversion state, making the decoder ready for a new
    /// stream. Valid in any state.
    pub fn reset(&mut self) -> &mut Self {
        self.step.reset();
        self.carry.clear();
        self.state = CoderState::Reset;
        self
    }

    /// Converts bytes from `src` into characters in `dst`.
    ///
    /// Underflow means every byte was consumed; a trailing incomplete unit
    /// has been taken into internal carry unless `end_of_input`, in which
    /// case it is malformed. Overflow means `dst` ran out of space and the
    /// call should be repeated with more. Malformed and unmappable runs are
    /// handled per the configured actions; under
    /// [`ErrorAction::Report`] the run starts at `src.position()` when it
    /// lies in the current input, and is retained internally when it began
    /// in a previous call's carry, so converting again reports it again.
    ///
    /// # Panics
    ///
    /// Panics when called after [`flush`](Decoder::flush) without an
    /// intervening [`reset`](Decoder::reset), or with `end_of_input` unset
    /// after a call that had it set.
    pub fn convert(
        &mut self,
        src: &mut ReadCursor<'_, u8>,
        dst: &mut WriteCursor<'_, char>,
        end_of_input: bool,
    ) -> CoderStatus {
        self.state.begin_convert(end_of_input);
        if let Some(status) = self.drain_carry(src, dst, end_of_input) {
            return status;
        }
        loop {
            match self.step.step(src, dst) {
                ControlFlow::Continue(()) => {}
                ControlFlow::Break(CoderStatus::Underflow) => {
                    if !src.has_remaining() {
                        return CoderStatus::Underflow;
                    }
                    if end_of_input {
                        // No byte can ever complete the trailing unit.
                        let status = CoderStatus::Malformed(src.remaining());
                        if let Some(stop) = self.recover(status, src, dst) {
                            return stop;
                        }
                    } else {
                        while let Some(b) = src.read() {
                            self.carry.push(b);
                        }
                        return CoderStatus::Underflow;
                    }
                }
                ControlFlow::Break(CoderStatus::Overflow) => return CoderStatus::Overflow,
                ControlFlow::Break(status) => {
                    if let Some(stop) = self.recover(status, src, dst) {
                        return stop;
                    }
                }
            }
        }
    }

    /// Lets the backend emit any output it withheld until end of stream.
    ///
    /// Legal after the final [`convert`](Decoder::convert) call, the one
    /// with `end_of_input` set. Returns Overflow until `dst` can hold
    /// everything, then Underflow; once flushed, further calls are
    /// Underflow no-ops.
    ///
    /// # Panics
    ///
    /// Panics when no converted stream is pending.
    pub fn flush(&mut self, dst: &mut WriteCursor<'_, char>) -> CoderStatus {
        if !self.state.begin_flush() {
            return CoderStatus::Underflow;
        }
        let status = self.step.flush(dst);
        if status == CoderStatus::Underflow {
            self.state = CoderState::Flushed;
        }
        status
    }

    /// Decodes all of `input` in one call, resetting first and flushing
    /// after.
    ///
    /// # Errors
    ///
    /// Returns the first malformed or unmappable run that survives the
    /// configured actions; the decoder is reset and reusable afterwards.
    ///
    /// # Panics
    ///
    /// Panics when a streaming sequence is in progress on this instance.
    pub fn convert_all(&mut self, input: &[u8]) -> Result<String, CodingError> {
        self.state.begin_convert_all();
        self.reset();
        if input.is_empty() {
            return Ok(String::new());
        }
        #[allow(
            clippy::cast_precision_loss,
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss
        )]
        let mut capacity = (input.len() as f32 * self.average_chars_per_byte) as usize;
        let mut buf: Vec<char> = alloc::vec!['\0'; capacity];
        let mut src = ReadCursor::new(input);
        let mut written = 0;
        loop {
            let mut dst = WriteCursor::new(&mut buf);
            dst.set_position(written);
            let mut status = if src.has_remaining() {
                self.convert(&mut src, &mut dst, true)
            } else {
                CoderStatus::Underflow
            };
            if status.is_underflow() {
                status = self.flush(&mut dst);
            }
            written = dst.position();
            match status {
                CoderStatus::Underflow => break,
                CoderStatus::Overflow => {
                    capacity = 2 * capacity + 1;
                    buf.resize(capacity, '\0');
                }
                status => {
                    self.reset();
                    return Err(status.to_error());
                }
            }
        }
        Ok(buf[..written].iter().collect())
    }

    /// Completes or disposes of a unit prefix carried over from a previous
    /// call by probing it together with one byte of lookahead at a time.
    /// `None` means the carry is empty and the main loop may run.
    fn drain_carry(
        &mut self,
        src: &mut ReadCursor<'_, u8>,
        dst: &mut WriteCursor<'_, char>,
        end_of_input: bool,
    ) -> Option<CoderStatus> {
        while !self.carry.is_empty() {
            if !dst.has_remaining() {
                return Some(CoderStatus::Overflow);
            }
            let carry_len = self.carry.len();
            let mut probe_buf = [0u8; CARRY_MAX + 1];
            probe_buf[..carry_len].copy_from_slice(self.carry.bytes());
            let peeked = src.peek();
            let probe_len = match peeked {
                Some(b) => {
                    probe_buf[carry_len] = b;
                    carry_len + 1
                }
                None => carry_len,
            };
            let mut probe = ReadCursor::new(&probe_buf[..probe_len]);
            let mut unit = ['\0'; 1];
            let mut unit_dst = WriteCursor::new(&mut unit);
            match self.step.step(&mut probe, &mut unit_dst) {
                ControlFlow::Continue(()) => {
                    // A completed unit consumes the whole probe: the carry
                    // held a proper prefix and one byte finished it.
                    debug_assert_eq!(probe.position(), probe_len);
                    if peeked.is_some() {
                        src.advance(1);
                    }
                    if unit_dst.position() > 0 {
                        let wrote = dst.put(unit[0]);
                        debug_assert!(wrote, "a unit writes at most one character");
                    }
                    self.carry.clear();
                }
                ControlFlow::Break(CoderStatus::Underflow) => match peeked {
                    Some(b) => {
                        self.carry.push(b);
                        src.advance(1);
                    }
                    None if end_of_input => {
                        let n = self.carry.len();
                        let status = CoderStatus::Malformed(n);
                        if let Some(stop) = self.recover_carry(status, n, dst) {
                            return Some(stop);
                        }
                    }
                    None => return Some(CoderStatus::Underflow),
                },
                ControlFlow::Break(CoderStatus::Overflow) => {
                    unreachable!("the unit destination had space for one character")
                }
                ControlFlow::Break(status) => {
                    let run = status.length();
                    if run > carry_len {
                        // The run ends in the current input; pull those
                        // bytes in so it can be disposed of as a whole.
                        for _ in carry_len..run {
                            match src.read() {
                                Some(b) => self.carry.push(b),
                                None => unreachable!("error run exceeds the probe"),
                            }
                        }
                    }
                    if let Some(stop) = self.recover_carry(status, run, dst) {
                        return Some(stop);
                    }
                }
            }
        }
        None
    }

    /// Applies the configured action to an error run starting at
    /// `src.position()`. `None` means the run was disposed of locally and
    /// conversion continues.
    fn recover(
        &mut self,
        status: CoderStatus,
        src: &mut ReadCursor<'_, u8>,
        dst: &mut WriteCursor<'_, char>,
    ) -> Option<CoderStatus> {
        match self.action_for(status) {
            ErrorAction::Report => Some(status),
            ErrorAction::Ignore => {
                src.advance(status.length());
                None
            }
            ErrorAction::Replace => {
                if dst.put_str(&self.replacement) {
                    src.advance(status.length());
                    None
                } else {
                    Some(CoderStatus::Overflow)
                }
            }
        }
    }

    /// Applies the configured action to an error run of `n` bytes at the
    /// front of the carry. Under Report the run stays put, so a later call
    /// converts it under a new action or reports it again; under Replace it
    /// is dropped only once the replacement fits.
    fn recover_carry(
        &mut self,
        status: CoderStatus,
        n: usize,
        dst: &mut WriteCursor<'_, char>,
    ) -> Option<CoderStatus> {
        match self.action_for(status) {
            ErrorAction::Report => Some(status),
            ErrorAction::Ignore => {
                self.carry.drop_front(n);
                None
            }
            ErrorAction::Replace => {
                if dst.put_str(&self.replacement) {
                    self.carry.drop_front(n);
                    None
                } else {
                    Some(CoderStatus::Overflow)
                }
            }
        }
    }

    fn action_for(&self, status: CoderStatus) -> ErrorAction {
        debug_assert!(status.is_error());
        if status.is_malformed() {
            self.malformed_action
        } else {
            self.unmappable_action
        }
    }
}

impl fmt::Debug for Decoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decoder")
            .field("state", &self.state)
            .field("malformed_action", &self.malformed_action)
            .field("unmappable_action", &self.unmappable_action)
            .field("replacement", &self.replacement)
            .field("carry", &self.carry.bytes())
            .finish_non_exhaustive()
    }
}
