use alloc::string::String;

use thiserror::Error;

use crate::{StructureKind, Token, TokenPattern, lexer::SourceError};

/// Any failure surfaced by [`Session::run`](crate::Session::run) or returned
/// from a binding callback.
#[derive(Error, Debug, PartialEq)]
pub enum Error {
    /// A binding could not be registered.
    #[error(transparent)]
    Bind(#[from] BindError),
    /// The token stream did not match what the scan required.
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// A failure while consuming the token stream, with the position of the
/// offending token.
#[derive(Error, Debug, PartialEq)]
#[error("{source} at {line}:{column}")]
pub struct DecodeError {
    pub(crate) source: ErrorSource,
    /// 1-based line of the offending token.
    pub line: usize,
    /// 1-based column (in characters) of the offending token.
    pub column: usize,
}

impl DecodeError {
    pub(crate) fn new(source: ErrorSource, line: usize, column: usize) -> Self {
        Self {
            source,
            line,
            column,
        }
    }

    /// What went wrong.
    #[must_use]
    pub fn kind(&self) -> &ErrorSource {
        &self.source
    }
}

/// The cause of a [`DecodeError`].
#[derive(Error, Debug, PartialEq)]
pub enum ErrorSource {
    /// The input is not lexically valid JSON.
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),
    /// A required token pattern was absent.
    #[error("expected {expected}, found {found}")]
    UnexpectedToken {
        /// What the scan required at this point.
        expected: TokenPattern,
        /// What the input contained.
        found: Token,
    },
    /// A container was closed by the wrong bracket.
    #[error("expected end of {expected}, found end of {found}")]
    MismatchedCloser {
        /// Kind of the innermost open container.
        expected: StructureKind,
        /// Kind implied by the closing token.
        found: StructureKind,
    },
    /// Containers are nested deeper than `ParserOptions::max_depth`.
    #[error("nesting depth exceeds the limit of {0}")]
    DepthLimitExceeded(usize),
    /// A number matched the expected pattern but does not fit the bound type.
    #[error("number {0} is out of range for the bound type")]
    NumberOutOfRange(String),
    /// The underlying byte source failed.
    #[error("input error: {0}")]
    Source(#[from] SourceError),
    /// Raised by a binding callback.
    #[error("{0}")]
    Custom(String),
}

/// Lexical errors.
#[derive(Debug, Error, PartialEq)]
pub enum SyntaxError {
    #[error("invalid character '{0}'")]
    InvalidCharacter(char),
    #[error("invalid UTF-8 sequence")]
    InvalidUtf8,
    #[error("control character U+{0:04X} in string")]
    ControlCharacter(u32),
    #[error("invalid escape character '{0}'")]
    InvalidEscapeChar(char),
    #[error("invalid unicode escape sequence at character: '{0}'")]
    InvalidUnicodeEscapeChar(char),
    #[error("invalid unicode escape sequence \\u{0:X}")]
    InvalidUnicodeEscapeSequence(u32),
    #[error("unexpected end of input")]
    UnexpectedEndOfInput,
}

/// Misuse of the registration API. Raised before any scan takes place.
#[derive(Error, Debug, PartialEq)]
pub enum BindError {
    /// Another binding already ends at this path.
    #[error("path `{path}` is already bound")]
    AlreadyBound {
        /// The rejected path.
        path: String,
    },
    /// A prefix of the path is already bound to a leaf.
    #[error("path `{path}` continues through a bound value at element {depth}")]
    ThroughLeaf {
        /// The rejected path.
        path: String,
        /// Index of the element that would descend below the leaf.
        depth: usize,
    },
    /// The path addresses an array where an object is registered, or the
    /// other way around.
    #[error("path `{path}` addresses an {requested} at element {depth}, but an {existing} is registered there")]
    KindConflict {
        /// The rejected path.
        path: String,
        /// Index of the conflicting element.
        depth: usize,
        /// Kind already registered at this level.
        existing: StructureKind,
        /// Kind implied by the path element.
        requested: StructureKind,
    },
    /// An index element cannot address any array element: it was negative,
    /// or too large for `usize`.
    #[error("path `{path}` has an out-of-range index at element {depth}")]
    IndexOutOfRange {
        /// The rejected path.
        path: String,
        /// Index of the offending element.
        depth: usize,
    },
    /// Only incomplete nodes can be promoted.
    #[error("cannot promote a complete {0} node")]
    PromoteComplete(StructureKind),
    /// The textual path could not be parsed.
    #[error("invalid path `{path}` at offset {offset}")]
    InvalidPath {
        /// The rejected input.
        path: String,
        /// Byte offset of the first invalid character.
        offset: usize,
    },
}
