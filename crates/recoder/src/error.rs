//! Error types for configuration failures and the one-shot facades.

use alloc::string::String;

use thiserror::Error;

/// Checked error produced by [`CoderStatus::to_error`] and the one-shot
/// `convert_all` facades.
///
/// The content kinds carry the length of the offending input run; the
/// buffer-state kinds correspond to a terminal `Underflow`/`Overflow` that a
/// facade chose to surface as an error.
///
/// [`CoderStatus::to_error`]: crate::CoderStatus::to_error
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodingError {
    /// More input was required.
    #[error("input underflow: more input is required")]
    Underflow,
    /// More output space was required.
    #[error("output overflow: more output space is required")]
    Overflow,
    /// Input that is not well-formed in the source encoding.
    #[error("malformed input of length {0}")]
    MalformedInput(usize),
    /// Well-formed input with no representation in the target encoding.
    #[error("unmappable character of length {0}")]
    UnmappableCharacter(usize),
}

/// Failure to resolve an encoding name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The name violates the encoding-name character rule, so no lookup was
    /// attempted.
    #[error("illegal encoding name {0:?}")]
    IllegalName(String),
    /// The name is well-formed but no registered encoding answers to it.
    #[error("unsupported encoding {0:?}")]
    Unsupported(String),
}

/// Failure to register an encoding descriptor.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegisterError {
    /// A canonical name or alias violates the encoding-name character rule.
    #[error("illegal encoding name {0:?}")]
    IllegalName(String),
    /// A canonical name or alias is already taken by another descriptor.
    #[error("encoding name {0:?} is already registered")]
    Duplicate(String),
}

/// Rejection of a candidate replacement sequence.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReplacementError {
    /// Replacements must contain at least one unit.
    #[error("replacement must not be empty")]
    Empty,
    /// Replacements may not exceed the coder's maximum output units per
    /// input unit.
    #[error("replacement of {len} units exceeds the maximum of {max} per input unit")]
    TooLong {
        /// Units in the rejected sequence.
        len: usize,
        /// The coder's maximum ratio.
        max: f32,
    },
    /// An encoder replacement must decode cleanly in its own encoding.
    #[error("replacement is not legal in the target encoding")]
    Illegal,
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn messages_name_the_offender() {
        assert_eq!(
            CodingError::MalformedInput(2).to_string(),
            "malformed input of length 2"
        );
        assert_eq!(
            ResolveError::Unsupported("x-nope".to_string()).to_string(),
            "unsupported encoding \"x-nope\""
        );
        assert_eq!(
            ReplacementError::Empty.to_string(),
            "replacement must not be empty"
        );
    }
}
