//! Step outcomes of the streaming conversion protocol.

use crate::error::CodingError;

/// Result of one `convert` or `flush` call.
///
/// `Underflow` and `Overflow` are steady-state signals, not errors: they
/// tell the caller to supply more input or drain the output. The two error
/// variants report a run of offending input elements whose handling is
/// governed by the configured [`ErrorAction`](crate::ErrorAction); they only
/// reach the caller under the `Report` action.
#[must_use = "a conversion status says whether to feed, drain, or fail"]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoderStatus {
    /// All input consumed; more may be supplied.
    Underflow,
    /// The output cursor is full; drain it and call again.
    Overflow,
    /// A run of input elements that is not well-formed in the source
    /// encoding. The length is at least 1.
    Malformed(usize),
    /// A well-formed run with no representation in the target encoding.
    /// The length is at least 1.
    Unmappable(usize),
}

impl CoderStatus {
    /// `true` for [`CoderStatus::Underflow`].
    #[must_use]
    pub fn is_underflow(self) -> bool {
        self == CoderStatus::Underflow
    }

    /// `true` for [`CoderStatus::Overflow`].
    #[must_use]
    pub fn is_overflow(self) -> bool {
        self == CoderStatus::Overflow
    }

    /// `true` for either error variant.
    #[must_use]
    pub fn is_error(self) -> bool {
        matches!(self, CoderStatus::Malformed(_) | CoderStatus::Unmappable(_))
    }

    /// `true` for [`CoderStatus::Malformed`].
    #[must_use]
    pub fn is_malformed(self) -> bool {
        matches!(self, CoderStatus::Malformed(_))
    }

    /// `true` for [`CoderStatus::Unmappable`].
    #[must_use]
    pub fn is_unmappable(self) -> bool {
        matches!(self, CoderStatus::Unmappable(_))
    }

    /// Length of the offending input run.
    ///
    /// # Panics
    ///
    /// Panics when called on `Underflow` or `Overflow`; the length is only
    /// defined for the error variants.
    #[must_use]
    pub fn length(self) -> usize {
        match self {
            CoderStatus::Malformed(n) | CoderStatus::Unmappable(n) => n,
            status => panic!("{status:?} has no error length"),
        }
    }

    /// Maps the status onto the checked error type: buffer-state kinds for
    /// `Underflow`/`Overflow`, content kinds carrying the run length for the
    /// error variants.
    ///
    /// This is a convenience for facades; the streaming loop inspects the
    /// status value directly.
    #[must_use]
    pub fn to_error(self) -> CodingError {
        match self {
            CoderStatus::Underflow => CodingError::Underflow,
            CoderStatus::Overflow => CodingError::Overflow,
            CoderStatus::Malformed(n) => CodingError::MalformedInput(n),
            CoderStatus::Unmappable(n) => CodingError::UnmappableCharacter(n),
        }
    }
}
