//! Byte sources feeding the lexer.
//!
//! The lexer pulls one byte at a time and never needs more than one byte of
//! lookahead, so a source only has to support `peek_byte` and `next_byte`.

use alloc::string::String;

use thiserror::Error;

/// Failure reported by a [`Source`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct SourceError(pub String);

/// A pull-based byte stream.
pub trait Source {
    /// Returns the next byte without consuming it, or `None` at the end of
    /// input.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying stream fails.
    fn peek_byte(&mut self) -> Result<Option<u8>, SourceError>;

    /// Consumes and returns the next byte, or `None` at the end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying stream fails.
    fn next_byte(&mut self) -> Result<Option<u8>, SourceError>;
}

/// A source over an in-memory byte slice.
#[derive(Debug, Clone)]
pub struct SliceSource<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> SliceSource<'a> {
    /// Creates a source reading `bytes` from the start.
    #[must_use]
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// The bytes not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> &'a [u8] {
        &self.bytes[self.pos..]
    }
}

impl Source for SliceSource<'_> {
    #[inline]
    fn peek_byte(&mut self) -> Result<Option<u8>, SourceError> {
        Ok(self.bytes.get(self.pos).copied())
    }

    #[inline]
    fn next_byte(&mut self) -> Result<Option<u8>, SourceError> {
        let b = self.bytes.get(self.pos).copied();
        if b.is_some() {
            self.pos += 1;
        }
        Ok(b)
    }
}

#[cfg(feature = "std")]
pub use reader::ReaderSource;

#[cfg(feature = "std")]
mod reader {
    use alloc::string::ToString;
    use std::io::{self, BufRead};

    use super::{Source, SourceError};

    /// A source over any buffered reader (file, socket, stdin).
    #[derive(Debug)]
    pub struct ReaderSource<R> {
        inner: R,
    }

    impl<R: BufRead> ReaderSource<R> {
        /// Wraps a buffered reader.
        pub fn new(inner: R) -> Self {
            Self { inner }
        }

        /// Returns the wrapped reader.
        pub fn into_inner(self) -> R {
            self.inner
        }

        fn fill(&mut self) -> Result<Option<u8>, SourceError> {
            loop {
                match self.inner.fill_buf() {
                    Ok(buf) => return Ok(buf.first().copied()),
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                    Err(e) => return Err(SourceError(e.to_string())),
                }
            }
        }
    }

    impl<R: BufRead> Source for ReaderSource<R> {
        fn peek_byte(&mut self) -> Result<Option<u8>, SourceError> {
            self.fill()
        }

        fn next_byte(&mut self) -> Result<Option<u8>, SourceError> {
            let b = self.fill()?;
            if b.is_some() {
                self.inner.consume(1);
            }
            Ok(b)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_source_peeks_then_consumes() {
        let mut s = SliceSource::new(b"ab");
        assert_eq!(s.peek_byte().unwrap(), Some(b'a'));
        assert_eq!(s.next_byte().unwrap(), Some(b'a'));
        assert_eq!(s.remaining(), b"b");
        assert_eq!(s.next_byte().unwrap(), Some(b'b'));
        assert_eq!(s.next_byte().unwrap(), None);
        assert_eq!(s.peek_byte().unwrap(), None);
    }

    #[cfg(feature = "std")]
    #[test]
    fn reader_source_matches_slice_source() {
        let mut r = ReaderSource::new(std::io::BufReader::with_capacity(1, &b"xyz"[..]));
        let mut out = alloc::vec::Vec::new();
        while let Some(b) = r.next_byte().unwrap() {
            out.push(b);
        }
        assert_eq!(out, b"xyz");
    }
}
