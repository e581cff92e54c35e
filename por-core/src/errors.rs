// Symphonia
// Copyright (c) 2019-2022 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `errors` module defines the common error type shared by every layer of the Portable
//! file codec.

use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::result;

/// The sign of a value involved in a numeric error, when known.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Sign {
    Positive,
    Negative,
}

/// A line/column/byte-offset triple identifying where in a line-framed stream an error occurred.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Position {
    pub line: u64,
    pub column: u64,
    pub offset: u64,
}

/// `PorError` enumerates every error a Portable file reader or writer can surface.
#[derive(Debug)]
pub enum PorError {
    /// A malformed number or cell was encountered.
    Syntax { message: String, position: Option<Position> },
    /// A parsed number's magnitude is larger than `double` can represent.
    Overflow { sign: Sign },
    /// A parsed number's magnitude is smaller than `double` can represent.
    Underflow { sign: Sign },
    /// The exponent digit sequence overflowed the 32-bit counter used to hold it.
    ExponentSize,
    /// The mantissa digit sequence overflowed the accumulator used to fold it.
    MantissaSize,
    /// A digit scratch buffer was exhausted.
    Buffer { limit: usize },
    /// A physical line exceeded the configured line length and `allow_longer_lines` is off.
    LineTooLong { position: Position },
    /// A string cell's declared length exceeded the configured maximum.
    StringTooLong { requested: u32, max: u32 },
    /// A `*` sysmiss marker appeared where a plain non-negative integer was required.
    UnexpectedSysmiss { position: Option<Position> },
    /// The underlying stream ended before a construct was fully read.
    UnexpectedEof,
    /// A column type vector contained an unrecognised tag.
    InvalidCellType { tag: String },
    /// A precondition on a constructor's arguments was violated (e.g. a radix setup).
    Precondition { message: String },
    /// An I/O error occurred while reading from or writing to the underlying stream.
    Io(io::Error),
    /// An invariant that should be impossible to violate was violated; indicates a bug.
    Internal(&'static str),
}

impl fmt::Display for PorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PorError::Syntax { message, position } => match position {
                Some(p) => write!(f, "syntax error: {} (line {}, column {})", message, p.line, p.column),
                None => write!(f, "syntax error: {}", message),
            },
            PorError::Overflow { sign } => {
                write!(f, "numeric overflow ({} value exceeds double range)", sign_str(*sign))
            }
            PorError::Underflow { sign } => {
                write!(f, "numeric underflow ({} value below double range)", sign_str(*sign))
            }
            PorError::ExponentSize => write!(f, "exponent digit sequence too large"),
            PorError::MantissaSize => write!(f, "mantissa digit sequence too large"),
            PorError::Buffer { limit } => write!(f, "digit scratch buffer exhausted (limit {})", limit),
            PorError::LineTooLong { position } => {
                write!(f, "line too long at line {}, column {}", position.line, position.column)
            }
            PorError::StringTooLong { requested, max } => {
                write!(f, "string length {} exceeds maximum {}", requested, max)
            }
            PorError::UnexpectedSysmiss { position } => match position {
                Some(p) => write!(f, "unexpected sysmiss marker (line {}, column {})", p.line, p.column),
                None => write!(f, "unexpected sysmiss marker"),
            },
            PorError::UnexpectedEof => write!(f, "unexpected end of stream"),
            PorError::InvalidCellType { tag } => write!(f, "invalid cell type: {}", tag),
            PorError::Precondition { message } => write!(f, "precondition violated: {}", message),
            PorError::Io(err) => write!(f, "io error: {}", err),
            PorError::Internal(message) => write!(f, "internal error: {}", message),
        }
    }
}

fn sign_str(sign: Sign) -> &'static str {
    match sign {
        Sign::Positive => "positive",
        Sign::Negative => "negative",
    }
}

impl StdError for PorError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            PorError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for PorError {
    fn from(err: io::Error) -> PorError {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => PorError::UnexpectedEof,
            _ => PorError::Io(err),
        }
    }
}

pub type Result<T> = result::Result<T, PorError>;

/// Convenience function to create a syntax error with no known position.
pub fn syntax_error<T>(message: impl Into<String>) -> Result<T> {
    Err(PorError::Syntax { message: message.into(), position: None })
}

/// Convenience function to create a syntax error at a known position.
pub fn syntax_error_at<T>(message: impl Into<String>, position: Position) -> Result<T> {
    Err(PorError::Syntax { message: message.into(), position: Some(position) })
}

/// Convenience function to create an overflow error.
pub fn overflow_error<T>(sign: Sign) -> Result<T> {
    Err(PorError::Overflow { sign })
}

/// Convenience function to create an underflow error.
pub fn underflow_error<T>(sign: Sign) -> Result<T> {
    Err(PorError::Underflow { sign })
}

/// Convenience function to create a precondition error.
pub fn precondition_error<T>(message: impl Into<String>) -> Result<T> {
    Err(PorError::Precondition { message: message.into() })
}

/// Convenience function to create an internal (programming) error.
pub fn internal_error<T>(message: &'static str) -> Result<T> {
    Err(PorError::Internal(message))
}
