//! Pull-based JSON tokenizer.
//!
//! The lexer turns a byte [`Source`] into [`Token`]s on demand. It keeps one
//! token of lookahead and a single scratch buffer for the payload of the most
//! recent string or number.
//!
//! A string's body is read only when the token is consumed. While the lexer
//! is discarding (during a skip), string bodies and number digits are
//! validated but never stored, so skipping costs memory proportional to the
//! nesting depth alone.
//!
//! Payload accessors ([`Lexer::string`], [`Lexer::number_text`],
//! [`Lexer::boolean`]) describe the token most recently consumed with
//! [`Lexer::expect`]. Peeking a number overwrites the payload, so read it
//! before looking further ahead.

mod escape_buffer;
mod literal_buffer;
mod source;

#[cfg(test)]
mod tests;

use alloc::string::String;
use core::mem;

use escape_buffer::{UnicodeEscapeBuffer, combine, is_high_surrogate};
use literal_buffer::{ExpectedLiteralBuffer, ExpectedLiteralValue, Step};
#[cfg(feature = "std")]
pub use source::ReaderSource;
pub use source::{SliceSource, Source, SourceError};

use crate::{
    DecodeError, ErrorSource, ParserOptions, Scalar, Session, StructureKind, SyntaxError, Token,
    TokenPattern, structure::StructureStack,
};

/// A JSON tokenizer over a byte source, shared by a session and every nested
/// session spawned from its callbacks.
#[derive(Debug)]
pub struct Lexer<S> {
    source: S,
    options: ParserOptions,
    lookahead: Option<Token>,
    scratch: String,
    boolean: bool,
    // The lookahead is a string whose body has not been read yet.
    pending_string: bool,
    discarding: bool,

    // Position of the next unread byte.
    line: usize,
    column: usize,
    // Position of the last byte read; syntax errors point here.
    mark: (usize, usize),
    // Start of the lookahead token, or of the last consumed one.
    token_line: usize,
    token_column: usize,

    depth: usize,
    consumed: usize,
}

impl<'a> Lexer<SliceSource<'a>> {
    /// Creates a lexer over an in-memory document.
    #[must_use]
    pub fn from_slice(bytes: &'a [u8]) -> Self {
        Self::new(SliceSource::new(bytes), ParserOptions::default())
    }

    /// Creates a lexer over an in-memory document with custom options.
    #[must_use]
    pub fn from_slice_with_options(bytes: &'a [u8], options: ParserOptions) -> Self {
        Self::new(SliceSource::new(bytes), options)
    }
}

#[cfg(feature = "std")]
impl<R: std::io::BufRead> Lexer<ReaderSource<R>> {
    /// Creates a lexer over a buffered reader.
    pub fn from_reader(reader: R) -> Self {
        Self::new(ReaderSource::new(reader), ParserOptions::default())
    }

    /// Creates a lexer over a buffered reader with custom options.
    pub fn from_reader_with_options(reader: R, options: ParserOptions) -> Self {
        Self::new(ReaderSource::new(reader), options)
    }
}

impl<S: Source> Lexer<S> {
    /// Creates a lexer over `source`.
    pub fn new(source: S, options: ParserOptions) -> Self {
        Self {
            source,
            options,
            lookahead: None,
            scratch: String::new(),
            boolean: false,
            pending_string: false,
            discarding: false,
            line: 1,
            column: 1,
            mark: (1, 1),
            token_line: 1,
            token_column: 1,
            depth: 0,
            consumed: 0,
        }
    }

    /// The options this lexer was created with.
    #[must_use]
    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// 1-based `(line, column)` of the lookahead token, or of the last
    /// consumed one when nothing has been peeked since.
    #[must_use]
    pub fn position(&self) -> (usize, usize) {
        (self.token_line, self.token_column)
    }

    /// Number of containers currently open in the input.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of tokens consumed so far.
    #[must_use]
    pub fn tokens_consumed(&self) -> usize {
        self.consumed
    }

    /// Returns the underlying source. A peeked token is dropped with the
    /// lexer and the source resumes after it, except that only the opening
    /// quote of a peeked string has been read.
    pub fn into_source(self) -> S {
        self.source
    }

    /// Opens a fresh session positioned at the current token.
    pub fn session<'cb>(&mut self) -> Session<'_, 'cb, S> {
        Session::new(self)
    }

    /// Returns the next token without consuming it.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not lexically valid.
    pub fn peek(&mut self) -> Result<Token, DecodeError> {
        if let Some(token) = self.lookahead {
            return Ok(token);
        }
        let token = self.lex()?;
        self.lookahead = Some(token);
        Ok(token)
    }

    /// Consumes the next token, which must be matched by `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorSource::UnexpectedToken`] if the token does not match,
    /// [`ErrorSource::DepthLimitExceeded`] if it opens one container too
    /// many, or the lexical error that prevented reading it.
    pub fn expect(&mut self, pattern: TokenPattern) -> Result<Token, DecodeError> {
        let token = self.expect_peek(pattern)?;
        self.lookahead = None;
        self.consumed += 1;
        if mem::take(&mut self.pending_string) {
            self.lex_string()?;
        }
        match token {
            Token::BeginArray | Token::BeginObject => {
                self.depth += 1;
                if let Some(limit) = self.options.max_depth {
                    if self.depth > limit {
                        return Err(self.error_at_token(ErrorSource::DepthLimitExceeded(limit)));
                    }
                }
            }
            Token::EndArray | Token::EndObject => self.depth = self.depth.saturating_sub(1),
            _ => {}
        }
        Ok(token)
    }

    /// Checks that the next token is matched by `pattern` without consuming
    /// it.
    ///
    /// # Errors
    ///
    /// Same as [`expect`](Self::expect), minus the depth check.
    pub fn expect_peek(&mut self, pattern: TokenPattern) -> Result<Token, DecodeError> {
        let found = self.peek()?;
        if pattern.matches(found) {
            Ok(found)
        } else {
            Err(self.error_at_token(ErrorSource::UnexpectedToken {
                expected: pattern,
                found,
            }))
        }
    }

    /// Text of the last string token, or lexeme of the last number token.
    #[must_use]
    pub fn string(&self) -> &str {
        &self.scratch
    }

    /// Moves the payload of the last string or number token out of the lexer.
    pub fn take_string(&mut self) -> String {
        mem::take(&mut self.scratch)
    }

    /// Lexeme of the last number token, exactly as it appeared in the input.
    #[must_use]
    pub fn number_text(&self) -> &str {
        &self.scratch
    }

    /// Value of the last boolean token.
    #[must_use]
    pub fn boolean(&self) -> bool {
        self.boolean
    }

    /// Consumes the next value and converts it to `T`.
    ///
    /// # Errors
    ///
    /// Returns an error if the next token is not matched by `T::PATTERN`, or
    /// if it does not fit `T`.
    pub fn decode<T: Scalar>(&mut self) -> Result<T, DecodeError> {
        let token = self.expect(T::PATTERN)?;
        T::from_token(self, token).map_err(|source| self.error_at_token(source))
    }

    /// Consumes one complete value without interpreting it.
    ///
    /// Memory use is proportional to the nesting depth of the value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is malformed.
    pub fn skip_value(&mut self) -> Result<(), DecodeError> {
        let discarding = mem::replace(&mut self.discarding, true);
        let skipped = self.skip_one();
        self.discarding = discarding;
        skipped
    }

    fn skip_one(&mut self) -> Result<(), DecodeError> {
        let mut stack = StructureStack::default();
        loop {
            let token = self.expect(TokenPattern::VALUE)?;
            if let Some(kind) = StructureKind::opened_by(token) {
                stack.push(kind);
                if !self.peek()?.is(TokenPattern::END) {
                    self.skip_key(kind)?;
                    continue;
                }
            }
            loop {
                if stack.is_empty() {
                    return Ok(());
                }
                let token = self.expect(TokenPattern::END | TokenPattern::ELEMENT_DELIMITER)?;
                if token == Token::ElementDelimiter {
                    break;
                }
                stack
                    .pop_closer(token)
                    .map_err(|source| self.error_at_token(source))?;
            }
            if let Some(kind) = stack.top() {
                self.skip_key(kind)?;
            }
        }
    }

    fn skip_key(&mut self, kind: StructureKind) -> Result<(), DecodeError> {
        if kind == StructureKind::Object {
            self.expect(TokenPattern::STRING)?;
            self.expect(TokenPattern::NAME_DELIMITER)?;
        }
        Ok(())
    }

    /// Returns `true` if only whitespace remains.
    ///
    /// # Errors
    ///
    /// Returns an error if the remaining input is not lexically valid.
    pub fn at_end(&mut self) -> Result<bool, DecodeError> {
        Ok(self.peek()? == Token::Eof)
    }

    /// Checks that the input holds nothing but whitespace after the value
    /// just scanned. With `allow_multiple_json_values`, further values are
    /// left for later sessions.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorSource::UnexpectedToken`] on trailing content.
    pub fn finish(&mut self) -> Result<(), DecodeError> {
        if self.options.allow_multiple_json_values {
            return Ok(());
        }
        self.expect_peek(TokenPattern::EOF).map(|_| ())
    }

    /// While set, string bodies and number digits are checked but not kept,
    /// and the payload accessors return an empty string.
    pub(crate) fn set_discarding(&mut self, discarding: bool) {
        self.discarding = discarding;
    }

    pub(crate) fn error_at_token(&self, source: ErrorSource) -> DecodeError {
        DecodeError::new(source, self.token_line, self.token_column)
    }

    fn syntax(&self, err: SyntaxError) -> DecodeError {
        DecodeError::new(err.into(), self.mark.0, self.mark.1)
    }

    // --------------------------------------------------------------------------------------------
    // Bytes
    // --------------------------------------------------------------------------------------------

    fn peek_byte(&mut self) -> Result<Option<u8>, DecodeError> {
        self.source
            .peek_byte()
            .map_err(|e| DecodeError::new(e.into(), self.line, self.column))
    }

    fn bump(&mut self) -> Result<Option<u8>, DecodeError> {
        let b = self
            .source
            .next_byte()
            .map_err(|e| DecodeError::new(e.into(), self.line, self.column))?;
        match b {
            Some(b'\n') => {
                self.mark = (self.line, self.column);
                self.line += 1;
                self.column = 1;
            }
            // UTF-8 continuation bytes belong to the previous character.
            Some(b) if b & 0xC0 == 0x80 => {}
            Some(_) => {
                self.mark = (self.line, self.column);
                self.column += 1;
            }
            None => self.mark = (self.line, self.column),
        }
        Ok(b)
    }

    fn bump_or_eof(&mut self) -> Result<u8, DecodeError> {
        self.bump()?
            .ok_or_else(|| self.syntax(SyntaxError::UnexpectedEndOfInput))
    }

    /// Reads the continuation bytes of a multi-byte character whose leading
    /// byte was just consumed.
    fn finish_char(&mut self, lead: u8) -> Result<char, DecodeError> {
        let len = match lead {
            0xC2..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF4 => 4,
            _ => return Err(self.syntax(SyntaxError::InvalidUtf8)),
        };
        let mut buf = [lead, 0, 0, 0];
        for slot in &mut buf[1..len] {
            match self.peek_byte()? {
                Some(b) if b & 0xC0 == 0x80 => {
                    self.bump()?;
                    *slot = b;
                }
                _ => return Err(self.syntax(SyntaxError::InvalidUtf8)),
            }
        }
        match bstr::decode_utf8(&buf[..len]) {
            (Some(ch), n) if n == len => Ok(ch),
            _ => Err(self.syntax(SyntaxError::InvalidUtf8)),
        }
    }

    fn unexpected_byte(&mut self, b: u8) -> DecodeError {
        if b.is_ascii() {
            return self.syntax(SyntaxError::InvalidCharacter(char::from(b)));
        }
        match self.finish_char(b) {
            Ok(ch) => self.syntax(SyntaxError::InvalidCharacter(ch)),
            Err(e) => e,
        }
    }

    fn skip_whitespace(&mut self) -> Result<(), DecodeError> {
        loop {
            match self.peek_byte()? {
                Some(b' ' | b'\t' | b'\n' | b'\r') => {
                    self.bump()?;
                }
                Some(b) if !b.is_ascii() && self.options.allow_unicode_whitespace => {
                    self.bump()?;
                    let ch = self.finish_char(b)?;
                    if !ch.is_whitespace() {
                        return Err(self.syntax(SyntaxError::InvalidCharacter(ch)));
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    // --------------------------------------------------------------------------------------------
    // Tokens
    // --------------------------------------------------------------------------------------------

    fn lex(&mut self) -> Result<Token, DecodeError> {
        self.skip_whitespace()?;
        self.token_line = self.line;
        self.token_column = self.column;

        let Some(b) = self.bump()? else {
            return Ok(Token::Eof);
        };
        Ok(match b {
            b'{' => Token::BeginObject,
            b'}' => Token::EndObject,
            b'[' => Token::BeginArray,
            b']' => Token::EndArray,
            b':' => Token::NameDelimiter,
            b',' => Token::ElementDelimiter,
            b'"' => {
                self.pending_string = true;
                Token::String
            }
            b'-' | b'0'..=b'9' => self.lex_number(b)?,
            b't' | b'f' | b'n' => self.lex_literal(b)?,
            _ => return Err(self.unexpected_byte(b)),
        })
    }

    fn lex_string(&mut self) -> Result<(), DecodeError> {
        self.scratch.clear();
        let mut escape = UnicodeEscapeBuffer::new();
        loop {
            match self.bump_or_eof()? {
                b'"' => return Ok(()),
                b'\\' => {
                    let ch = self.lex_escape(&mut escape)?;
                    self.keep(ch);
                }
                b @ 0x00..=0x1F => {
                    return Err(self.syntax(SyntaxError::ControlCharacter(u32::from(b))));
                }
                b @ 0x20..=0x7F => self.keep(char::from(b)),
                b => {
                    let ch = self.finish_char(b)?;
                    self.keep(ch);
                }
            }
        }
    }

    fn keep(&mut self, ch: char) {
        if !self.discarding {
            self.scratch.push(ch);
        }
    }

    fn lex_escape(&mut self, escape: &mut UnicodeEscapeBuffer) -> Result<char, DecodeError> {
        Ok(match self.bump_or_eof()? {
            b'"' => '"',
            b'\\' => '\\',
            b'/' => '/',
            b'b' => '\u{0008}',
            b'f' => '\u{000C}',
            b'n' => '\n',
            b'r' => '\r',
            b't' => '\t',
            b'u' => {
                let high = self.lex_code_unit(escape)?;
                let low = if is_high_surrogate(high) {
                    if self.bump_or_eof()? != b'\\' || self.bump_or_eof()? != b'u' {
                        return Err(self.syntax(SyntaxError::InvalidUnicodeEscapeSequence(
                            u32::from(high),
                        )));
                    }
                    Some(self.lex_code_unit(escape)?)
                } else {
                    None
                };
                combine(high, low).map_err(|e| self.syntax(e))?
            }
            b if b.is_ascii() => {
                return Err(self.syntax(SyntaxError::InvalidEscapeChar(char::from(b))));
            }
            b => return Err(self.unexpected_byte(b)),
        })
    }

    fn lex_code_unit(&mut self, escape: &mut UnicodeEscapeBuffer) -> Result<u16, DecodeError> {
        loop {
            let b = self.bump_or_eof()?;
            if let Some(unit) = escape.feed(b).map_err(|e| self.syntax(e))? {
                return Ok(unit);
            }
        }
    }

    fn lex_number(&mut self, first: u8) -> Result<Token, DecodeError> {
        self.scratch.clear();
        self.keep(char::from(first));
        let mut token = Token::UnsignedNumber;

        let lead = if first == b'-' {
            token = Token::SignedNumber;
            self.require_digit()?
        } else {
            first
        };
        // A leading zero stands alone.
        if lead != b'0' {
            self.digits()?;
        }
        if self.peek_byte()? == Some(b'.') {
            self.bump()?;
            self.keep('.');
            token = Token::FloatNumber;
            self.require_digit()?;
            self.digits()?;
        }
        if let Some(e @ (b'e' | b'E')) = self.peek_byte()? {
            self.bump()?;
            self.keep(char::from(e));
            token = Token::FloatNumber;
            if let Some(sign @ (b'+' | b'-')) = self.peek_byte()? {
                self.bump()?;
                self.keep(char::from(sign));
            }
            self.require_digit()?;
            self.digits()?;
        }
        Ok(token)
    }

    fn require_digit(&mut self) -> Result<u8, DecodeError> {
        match self.bump_or_eof()? {
            d @ b'0'..=b'9' => {
                self.keep(char::from(d));
                Ok(d)
            }
            b => Err(self.unexpected_byte(b)),
        }
    }

    fn digits(&mut self) -> Result<(), DecodeError> {
        while let Some(d @ b'0'..=b'9') = self.peek_byte()? {
            self.bump()?;
            self.keep(char::from(d));
        }
        Ok(())
    }

    fn lex_literal(&mut self, first: u8) -> Result<Token, DecodeError> {
        let mut literal = ExpectedLiteralBuffer::new(first);
        loop {
            let b = self.bump_or_eof()?;
            match literal.step(b) {
                Step::NeedMore => {}
                Step::Done(ExpectedLiteralValue::Null) => return Ok(Token::Null),
                Step::Done(ExpectedLiteralValue::True) => {
                    self.boolean = true;
                    return Ok(Token::Boolean);
                }
                Step::Done(ExpectedLiteralValue::False) => {
                    self.boolean = false;
                    return Ok(Token::Boolean);
                }
                Step::Reject => return Err(self.unexpected_byte(b)),
            }
        }
    }
}
