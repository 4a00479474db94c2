//! Shared streaming-protocol scaffolding for [`Decoder`](crate::Decoder)
//! and [`Encoder`](crate::Encoder).

use crate::error::ReplacementError;

/// What a coder does with a run of malformed or unmappable input.
///
/// The action for malformed input and the action for unmappable characters
/// are configured independently via
/// [`on_malformed_input`](crate::Decoder::on_malformed_input) and
/// [`on_unmappable_character`](crate::Decoder::on_unmappable_character).
///
/// # Default
///
/// `Report`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorAction {
    /// Stop converting and return the error status, leaving the input
    /// cursor at the start of the offending run.
    #[default]
    Report,
    /// Skip the offending run and continue without producing output.
    Ignore,
    /// Skip the offending run, write the configured replacement sequence,
    /// and continue.
    Replace,
}

/// Protocol position of a coder: `Reset → Coding → End → Flushed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CoderState {
    Reset,
    Coding,
    End,
    Flushed,
}

impl CoderState {
    /// Validates a `convert` call and records the new position.
    ///
    /// Legal from `Reset` and `Coding`; from `End` only when the caller
    /// signals end-of-input again (draining a previous Overflow).
    pub(crate) fn begin_convert(&mut self, end_of_input: bool) {
        let legal = matches!(self, CoderState::Reset | CoderState::Coding)
            || (end_of_input && *self == CoderState::End);
        assert!(legal, "convert is illegal in the {self:?} state");
        *self = if end_of_input {
            CoderState::End
        } else {
            CoderState::Coding
        };
    }

    /// Validates a `flush` call. `true` means the backend flush must run;
    /// `false` means the coder is already flushed and the call is an
    /// idempotent no-op.
    pub(crate) fn begin_flush(self) -> bool {
        match self {
            CoderState::End => true,
            CoderState::Flushed => false,
            state => panic!("flush is illegal in the {state:?} state"),
        }
    }

    /// Rejects a one-shot facade call while a streaming sequence is in
    /// progress.
    pub(crate) fn begin_convert_all(self) {
        assert!(
            matches!(self, CoderState::Reset | CoderState::Flushed),
            "convert_all is illegal while a streaming sequence is in progress ({self:?} state)"
        );
    }
}

/// Validates constructor ratios: both positive, average not above maximum.
pub(crate) fn check_ratios(average: f32, maximum: f32) {
    assert!(
        average > 0.0 && maximum > 0.0 && average <= maximum,
        "invalid coder ratios: average {average}, maximum {maximum}"
    );
}

/// Length rules shared by both `replace_with` implementations.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn check_replacement_len(len: usize, max: f32) -> Result<(), ReplacementError> {
    if len == 0 {
        return Err(ReplacementError::Empty);
    }
    if len as f32 > max {
        return Err(ReplacementError::TooLong { len, max });
    }
    Ok(())
}
