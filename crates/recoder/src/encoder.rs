//! Streaming character to byte conversion.

use alloc::{boxed::Box, vec::Vec};
use core::{fmt, ops::ControlFlow};

use crate::{
    codec::{Codec, DecodeStep, EncodeStep, Ratios},
    coder::{CoderState, ErrorAction, check_ratios, check_replacement_len},
    cursor::{ReadCursor, WriteCursor},
    error::{CodingError, ReplacementError},
    status::CoderStatus,
};

/// A streaming converter from characters to bytes in one encoding.
///
/// The protocol mirrors [`Decoder`](crate::Decoder): any number of
/// [`convert`](Encoder::convert) calls, the last with `end_of_input` set,
/// then [`flush`](Encoder::flush). Since every `char` is a complete
/// transcoding unit, an encoder never carries partial input between calls.
///
/// # Examples
///
/// ```
/// use recoder::{ReadCursor, Registry, WriteCursor};
///
/// let encoding = Registry::global().resolve("UTF-16BE").unwrap();
/// let mut encoder = encoding.new_encoder();
/// let input: Vec<char> = "hi".chars().collect();
/// let mut out = [0u8; 8];
/// let mut src = ReadCursor::new(&input);
/// let mut dst = WriteCursor::new(&mut out);
/// let status = encoder.convert(&mut src, &mut dst, true);
/// assert!(status.is_underflow());
/// let written = dst.position();
/// assert_eq!(&out[..written], &[0x00, b'h', 0x00, b'i']);
/// ```
pub struct Encoder {
    step: Box<dyn EncodeStep>,
    /// Fresh decode state of the same encoding, used to vet replacement
    /// byte sequences.
    probe: Box<dyn DecodeStep>,
    average_bytes_per_char: f32,
    max_bytes_per_char: f32,
    malformed_action: ErrorAction,
    unmappable_action: ErrorAction,
    replacement: Vec<u8>,
    state: CoderState,
}

impl Encoder {
    pub(crate) fn new(codec: &dyn Codec) -> Self {
        let Ratios { average, maximum } = codec.encode_ratios();
        check_ratios(average, maximum);
        Encoder {
            step: codec.new_encode_step(),
            probe: codec.new_decode_step(),
            average_bytes_per_char: average,
            max_bytes_per_char: maximum,
            malformed_action: ErrorAction::default(),
            unmappable_action: ErrorAction::default(),
            replacement: codec.encode_replacement().to_vec(),
            state: CoderState::Reset,
        }
    }

    /// Expected bytes produced per input character.
    #[must_use]
    pub fn average_bytes_per_char(&self) -> f32 {
        self.average_bytes_per_char
    }

    /// Most bytes a single character can produce; bounds the replacement
    /// length.
    #[must_use]
    pub fn max_bytes_per_char(&self) -> f32 {
        self.max_bytes_per_char
    }

    /// Action taken on malformed input.
    #[must_use]
    pub fn malformed_input_action(&self) -> ErrorAction {
        self.malformed_action
    }

    /// Action taken on characters this encoding cannot represent.
    #[must_use]
    pub fn unmappable_character_action(&self) -> ErrorAction {
        self.unmappable_action
    }

    /// The sequence written for an offending run under
    /// [`ErrorAction::Replace`].
    #[must_use]
    pub fn replacement(&self) -> &[u8] {
        &self.replacement
    }

    /// Sets the action for malformed input.
    pub fn on_malformed_input(&mut self, action: ErrorAction) -> &mut Self {
        self.malformed_action = action;
        self
    }

    /// Sets the action for unmappable characters.
    pub fn on_unmappable_character(&mut self, action: ErrorAction) -> &mut Self {
        self.unmappable_action = action;
        self
    }

    /// Replaces the sequence used by [`ErrorAction::Replace`].
    ///
    /// # Errors
    ///
    /// Rejects an empty replacement, one longer than
    /// [`max_bytes_per_char`](Encoder::max_bytes_per_char) bytes, and one
    /// that does not decode cleanly in this encoding.
    pub fn replace_with(&mut self, replacement: Vec<u8>) -> Result<&mut Self, ReplacementError> {
        check_replacement_len(replacement.len(), self.max_bytes_per_char)?;
        if !self.replacement_is_legal(&replacement) {
            return Err(ReplacementError::Illegal);
        }
        self.replacement = replacement;
        Ok(self)
    }

    /// Discards all conversion state, making the encoder ready for a new
    /// stream. Valid in any state.
    pub fn reset(&mut self) -> &mut Self {
        self.step.reset();
        self.state = CoderState::Reset;
        self
    }

    /// Converts characters from `src` into bytes in `dst`.
    ///
    /// Underflow means every character was consumed; Overflow means `dst`
    /// ran out of space and the call should be repeated with more.
    /// Unmappable runs are handled per the configured action; under
    /// [`ErrorAction::Report`] the run starts at `src.position()`.
    ///
    /// # Panics
    ///
    /// Panics when called after [`flush`](Encoder::flush) without an
    /// intervening [`reset`](Encoder::reset), or with `end_of_input` unset
    /// after a call that had it set.
    pub fn convert(
        &mut self,
        src: &mut ReadCursor<'_, char>,
        dst: &mut WriteCursor<'_, u8>,
        end_of_input: bool,
    ) -> CoderStatus {
        self.state.begin_convert(end_of_input);
        loop {
            match self.step.step(src, dst) {
                ControlFlow::Continue(()) => {}
                ControlFlow::Break(CoderStatus::Underflow) => {
                    debug_assert!(!src.has_remaining(), "a character is a complete unit");
                    return CoderStatus::Underflow;
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
    /// Legal after the final [`convert`](Encoder::convert) call, the one
    /// with `end_of_input` set. Returns Overflow until `dst` can hold
    /// everything, then Underflow; once flushed, further calls are
    /// Underflow no-ops.
    ///
    /// # Panics
    ///
    /// Panics when no converted stream is pending.
    pub fn flush(&mut self, dst: &mut WriteCursor<'_, u8>) -> CoderStatus {
        if !self.state.begin_flush() {
            return CoderStatus::Underflow;
        }
        let status = self.step.flush(dst);
        if status == CoderStatus::Underflow {
            self.state = CoderState::Flushed;
        }
        status
    }

    /// Encodes all of `input` in one call, resetting first and flushing
    /// after.
    ///
    /// # Errors
    ///
    /// Returns the first unmappable run that survives the configured
    /// actions; the encoder is reset and reusable afterwards.
    ///
    /// # Panics
    ///
    /// Panics when a streaming sequence is in progress on this instance.
    pub fn convert_all(&mut self, input: &str) -> Result<Vec<u8>, CodingError> {
        self.state.begin_convert_all();
        self.reset();
        let chars: Vec<char> = input.chars().collect();
        match self.one_shot(&chars) {
            Ok(bytes) => Ok(bytes),
            Err(e) => {
                self.reset();
                Err(e)
            }
        }
    }

    /// Whether this encoding can represent `c`.
    ///
    /// The streaming configuration is untouched: the trial runs under
    /// temporarily forced [`ErrorAction::Report`] actions and the encoder
    /// is reset afterwards.
    ///
    /// # Panics
    ///
    /// Panics while a streaming sequence is in progress.
    pub fn can_encode_char(&mut self, c: char) -> bool {
        self.can_encode(&[c])
    }

    /// Whether this encoding can represent every character of `s`. The
    /// empty string is trivially encodable, in any state.
    ///
    /// # Panics
    ///
    /// Panics while a streaming sequence is in progress, unless `s` is
    /// empty.
    pub fn can_encode_str(&mut self, s: &str) -> bool {
        let chars: Vec<char> = s.chars().collect();
        self.can_encode(&chars)
    }

    fn can_encode(&mut self, chars: &[char]) -> bool {
        // Nothing is always encodable, even while a stream is open.
        if chars.is_empty() {
            return true;
        }
        if self.state == CoderState::Flushed {
            self.reset();
        }
        assert!(
            self.state == CoderState::Reset,
            "can_encode is illegal while a streaming sequence is in progress ({:?} state)",
            self.state
        );
        let restore = (self.malformed_action, self.unmappable_action);
        self.malformed_action = ErrorAction::Report;
        self.unmappable_action = ErrorAction::Report;
        let ok = self.one_shot(chars).is_ok();
        self.malformed_action = restore.0;
        self.unmappable_action = restore.1;
        self.reset();
        ok
    }

    /// Drives a whole streaming sequence over `chars` into a grown-to-fit
    /// buffer. Assumes a freshly reset state.
    fn one_shot(&mut self, chars: &[char]) -> Result<Vec<u8>, CodingError> {
        if chars.is_empty() {
            return Ok(Vec::new());
        }
        #[allow(
            clippy::cast_precision_loss,
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss
        )]
        let mut capacity = (chars.len() as f32 * self.average_bytes_per_char) as usize;
        let mut buf: Vec<u8> = alloc::vec![0; capacity];
        let mut src = ReadCursor::new(chars);
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
                    buf.resize(capacity, 0);
                }
                status => return Err(status.to_error()),
            }
        }
        buf.truncate(written);
        Ok(buf)
    }

    /// A replacement must itself be well-formed output: it has to decode
    /// without error in this encoding.
    fn replacement_is_legal(&mut self, candidate: &[u8]) -> bool {
        self.probe.reset();
        let mut src = ReadCursor::new(candidate);
        loop {
            let mut unit = ['\0'; 1];
            let mut dst = WriteCursor::new(&mut unit);
            match self.probe.step(&mut src, &mut dst) {
                ControlFlow::Continue(()) => {}
                ControlFlow::Break(CoderStatus::Underflow) => return !src.has_remaining(),
                ControlFlow::Break(_) => return false,
            }
        }
    }

    /// Applies the configured action to an error run starting at
    /// `src.position()`. `None` means the run was disposed of locally and
    /// conversion continues.
    fn recover(
        &mut self,
        status: CoderStatus,
        src: &mut ReadCursor<'_, char>,
        dst: &mut WriteCursor<'_, u8>,
    ) -> Option<CoderStatus> {
        let action = if status.is_malformed() {
            self.malformed_action
        } else {
            self.unmappable_action
        };
        match action {
            ErrorAction::Report => Some(status),
            ErrorAction::Ignore => {
                src.advance(status.length());
                None
            }
            ErrorAction::Replace => {
                if dst.put_all(&self.replacement) {
                    src.advance(status.length());
                    None
                } else {
                    Some(CoderStatus::Overflow)
                }
            }
        }
    }
}

impl fmt::Debug for Encoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Encoder")
            .field("state", &self.state)
            .field("malformed_action", &self.malformed_action)
            .field("unmappable_action", &self.unmappable_action)
            .field("replacement", &self.replacement)
            .finish_non_exhaustive()
    }
}
