//! Crate-wide error type.
//!
//! Every failure aborts the container currently being encoded or decoded and
//! propagates to the caller unchanged.  Nothing in this crate retries, skips,
//! or returns a truncated container.

use std::io;
use std::str::Utf8Error;
use thiserror::Error;

/// Which header kind a framing error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderKind {
    /// Prefix of a variable-length container (sequence, map, string).
    Length,
    /// Prefix of a fixed-arity structure (pair).
    Object,
}

impl std::fmt::Display for HeaderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HeaderKind::Length => f.write_str("length"),
            HeaderKind::Object => f.write_str("object"),
        }
    }
}

#[derive(Error, Debug)]
pub enum PackError {
    /// A header decoded to a negative value other than the null sentinel.
    #[error("Malformed {kind} header: {value}")]
    MalformedHeader { kind: HeaderKind, value: i32 },

    #[error("Unexpected end of input: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEndOfInput { needed: usize, remaining: usize },

    #[error("Arity mismatch: expected {expected} members, stream declares {actual}")]
    ArityMismatch { expected: usize, actual: usize },

    /// A sequence source yielded a different number of items than the count
    /// already written to its length header.
    #[error("Count mismatch: header declares {declared} elements, source yielded {actual}")]
    CountMismatch { declared: usize, actual: usize },

    #[error("Length {len} does not fit in a 32-bit header")]
    LengthOverflow { len: usize },

    /// A null header was decoded into a type that cannot represent null.
    #[error("Unexpected null for non-nullable type {type_name}")]
    UnexpectedNull { type_name: &'static str },

    #[error("Duplicate key while decoding {type_name}")]
    DuplicateKey { type_name: &'static str },

    #[error("No formatter registered for {type_name}")]
    FormatterNotRegistered { type_name: &'static str },

    #[error("Invalid bool byte: {0:#04x}")]
    InvalidBool(u8),

    #[error("Invalid char scalar: {0:#x}")]
    InvalidChar(u32),

    #[error("Invalid UTF-8: {0}")]
    InvalidUtf8(#[from] Utf8Error),

    /// Error surfaced by a user-supplied formatter.
    #[error(transparent)]
    Custom(Box<dyn std::error::Error + Send + Sync>),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl PackError {
    pub(crate) fn unexpected_null<T: ?Sized>() -> Self {
        PackError::UnexpectedNull { type_name: std::any::type_name::<T>() }
    }

    pub(crate) fn not_registered<T: ?Sized>() -> Self {
        PackError::FormatterNotRegistered { type_name: std::any::type_name::<T>() }
    }

    pub(crate) fn duplicate_key<T: ?Sized>() -> Self {
        PackError::DuplicateKey { type_name: std::any::type_name::<T>() }
    }

    /// Wrap an arbitrary error raised inside a user formatter.
    pub fn custom<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        PackError::Custom(err.into())
    }
}

pub type Result<T> = std::result::Result<T, PackError>;
