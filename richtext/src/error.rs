// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.
//!
//! There are exactly two kinds of failure. A [`ValidationError`] means the
//! caller asked for something that cannot be done (a position past the end
//! of the text, a location that belongs to another model); the model is left
//! untouched. An [`InternalFault`] means an invariant of the model itself
//! was found broken. Faults are programming errors: they carry a diagnostic
//! message and are not expected to be handled by normal control flow.

use alloc::string::String;

use thiserror::Error;

/// Result alias used throughout this crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Any error produced by a rich text operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// An internal invariant was violated.
    #[error("internal error: {0}")]
    Internal(#[from] InternalFault),
    /// The caller supplied invalid input.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl Error {
    /// Returns `true` if this is an [`InternalFault`].
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(_))
    }

    /// Returns the validation error, if this is one.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(e) => Some(e),
            Self::Internal(_) => None,
        }
    }
}

/// A broken invariant inside the text model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct InternalFault {
    message: String,
}

impl InternalFault {
    pub(crate) fn new(message: String) -> Self {
        log::error!("rich text invariant violated: {message}");
        Self { message }
    }

    /// The diagnostic message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Invalid caller input. The operation was rejected before any mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ValidationError {
    /// A character position outside of the text.
    #[error("position {pos} out of range for text of {len} characters")]
    PositionOutOfRange {
        /// The requested position.
        pos: usize,
        /// The number of characters in the text.
        len: usize,
    },
    /// A location handle that is not (or no longer) attached to this text.
    #[error("cursor location is not attached to this text")]
    UnknownLocation,
    /// The text was accessed from a thread other than the one that owns it.
    #[error("rich text accessed from a thread that does not own it")]
    WrongThread,
}

/// Returns an [`InternalFault`] from the enclosing function unless `$cond` holds.
macro_rules! internal_assert {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err($crate::error::Error::Internal(
                $crate::error::InternalFault::new(alloc::format!($($arg)+)),
            ));
        }
    };
}

/// Builds an [`Error::Internal`] with a formatted message.
macro_rules! internal_fault {
    ($($arg:tt)+) => {
        $crate::error::Error::Internal($crate::error::InternalFault::new(alloc::format!($($arg)+)))
    };
}

pub(crate) use internal_assert;
pub(crate) use internal_fault;

#[cfg(test)]
mod tests {
    use super::{Error, InternalFault, ValidationError};
    use alloc::format;
    use alloc::string::ToString;

    #[test]
    fn display_messages() {
        let e = Error::from(ValidationError::PositionOutOfRange { pos: 7, len: 6 });
        let msg = format!("{e}");
        assert!(msg.contains("position 7"));
        assert!(msg.contains("6 characters"));
        assert!(!e.is_internal());

        let e = Error::from(InternalFault::new("empty fragment".to_string()));
        assert!(e.is_internal());
        assert_eq!(format!("{e}"), "internal error: empty fragment");
        assert!(e.as_validation().is_none());
    }

    #[test]
    fn internal_assert_returns_fault() {
        fn check(n: usize) -> super::Result<usize> {
            internal_assert!(n > 0, "value {n} must be positive");
            Ok(n)
        }
        assert_eq!(check(3), Ok(3));
        match check(0) {
            Err(Error::Internal(fault)) => assert_eq!(fault.message(), "value 0 must be positive"),
            other => panic!("expected internal fault, got {other:?}"),
        }
    }
}
