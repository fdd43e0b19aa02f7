//! Token kinds produced by the lexer and the patterns used to expect them.

use core::fmt;

use bitflags::bitflags;

/// A discrete JSON token kind.
///
/// Payloads (string text, number lexemes, boolean value) are not carried by
/// the token itself; they are read from the [`Lexer`](crate::Lexer) right
/// after the token was consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    /// `true` or `false`.
    Boolean,
    /// `null`.
    Null,
    /// A number without sign, fraction or exponent.
    UnsignedNumber,
    /// A negative number without fraction or exponent.
    SignedNumber,
    /// A number with a fraction or an exponent.
    FloatNumber,
    /// A string literal.
    String,
    /// `[`
    BeginArray,
    /// `]`
    EndArray,
    /// `{`
    BeginObject,
    /// `}`
    EndObject,
    /// `:`
    NameDelimiter,
    /// `,`
    ElementDelimiter,
    /// End of input.
    Eof,
}

impl Token {
    const ALL: [Token; 13] = [
        Token::Boolean,
        Token::Null,
        Token::UnsignedNumber,
        Token::SignedNumber,
        Token::FloatNumber,
        Token::String,
        Token::BeginArray,
        Token::EndArray,
        Token::BeginObject,
        Token::EndObject,
        Token::NameDelimiter,
        Token::ElementDelimiter,
        Token::Eof,
    ];

    /// The single-bit pattern matching exactly this token.
    #[must_use]
    pub fn pattern(self) -> TokenPattern {
        match self {
            Token::Boolean => TokenPattern::BOOLEAN,
            Token::Null => TokenPattern::NULL,
            Token::UnsignedNumber => TokenPattern::UNSIGNED_NUMBER,
            Token::SignedNumber => TokenPattern::SIGNED_NUMBER,
            Token::FloatNumber => TokenPattern::FLOAT_NUMBER,
            Token::String => TokenPattern::STRING,
            Token::BeginArray => TokenPattern::BEGIN_ARRAY,
            Token::EndArray => TokenPattern::END_ARRAY,
            Token::BeginObject => TokenPattern::BEGIN_OBJECT,
            Token::EndObject => TokenPattern::END_OBJECT,
            Token::NameDelimiter => TokenPattern::NAME_DELIMITER,
            Token::ElementDelimiter => TokenPattern::ELEMENT_DELIMITER,
            Token::Eof => TokenPattern::EOF,
        }
    }

    /// Returns `true` if the token is matched by `pattern`.
    #[must_use]
    pub fn is(self, pattern: TokenPattern) -> bool {
        pattern.intersects(self.pattern())
    }

    fn name(self) -> &'static str {
        match self {
            Token::Boolean => "boolean",
            Token::Null => "null",
            Token::UnsignedNumber => "unsigned number",
            Token::SignedNumber => "signed number",
            Token::FloatNumber => "float number",
            Token::String => "string",
            Token::BeginArray => "'['",
            Token::EndArray => "']'",
            Token::BeginObject => "'{'",
            Token::EndObject => "'}'",
            Token::NameDelimiter => "':'",
            Token::ElementDelimiter => "','",
            Token::Eof => "end of input",
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

bitflags! {
    /// A set of token kinds, used for lookahead and expectation checks.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TokenPattern: u16 {
        /// [`Token::Boolean`]
        const BOOLEAN = 1 << 0;
        /// [`Token::Null`]
        const NULL = 1 << 1;
        /// [`Token::UnsignedNumber`]
        const UNSIGNED_NUMBER = 1 << 2;
        /// [`Token::SignedNumber`]
        const SIGNED_NUMBER = 1 << 3;
        /// [`Token::FloatNumber`]
        const FLOAT_NUMBER = 1 << 4;
        /// [`Token::String`]
        const STRING = 1 << 5;
        /// [`Token::BeginArray`]
        const BEGIN_ARRAY = 1 << 6;
        /// [`Token::EndArray`]
        const END_ARRAY = 1 << 7;
        /// [`Token::BeginObject`]
        const BEGIN_OBJECT = 1 << 8;
        /// [`Token::EndObject`]
        const END_OBJECT = 1 << 9;
        /// [`Token::NameDelimiter`]
        const NAME_DELIMITER = 1 << 10;
        /// [`Token::ElementDelimiter`]
        const ELEMENT_DELIMITER = 1 << 11;
        /// [`Token::Eof`]
        const EOF = 1 << 12;

        /// Any container opener.
        const BEGIN = Self::BEGIN_ARRAY.bits() | Self::BEGIN_OBJECT.bits();
        /// Any container closer.
        const END = Self::END_ARRAY.bits() | Self::END_OBJECT.bits();
        /// Numbers that fit an unsigned destination.
        const UNSIGNED_INTEGER = Self::UNSIGNED_NUMBER.bits();
        /// Numbers that fit a signed destination.
        const SIGNED_INTEGER = Self::UNSIGNED_INTEGER.bits() | Self::SIGNED_NUMBER.bits();
        /// Every number token.
        const NUMBER = Self::SIGNED_INTEGER.bits() | Self::FLOAT_NUMBER.bits();
        /// Every token that is a complete value on its own.
        const SCALAR = Self::BOOLEAN.bits() | Self::NULL.bits() | Self::NUMBER.bits() | Self::STRING.bits();
        /// Every token that can start a value.
        const VALUE = Self::BEGIN.bits() | Self::SCALAR.bits();
    }
}

impl TokenPattern {
    /// Returns `true` if `token` is a member of this pattern.
    #[must_use]
    pub fn matches(self, token: Token) -> bool {
        token.is(self)
    }
}

impl fmt::Display for TokenPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut members = Token::ALL.iter().filter(|t| self.matches(**t));
        let Some(first) = members.next() else {
            return f.write_str("nothing");
        };
        first.fmt(f)?;
        for token in members {
            write!(f, " or {token}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn number_patterns_nest() {
        assert!(TokenPattern::NUMBER.matches(Token::UnsignedNumber));
        assert!(TokenPattern::SIGNED_INTEGER.matches(Token::UnsignedNumber));
        assert!(!TokenPattern::UNSIGNED_INTEGER.matches(Token::SignedNumber));
        assert!(!TokenPattern::SIGNED_INTEGER.matches(Token::FloatNumber));
    }

    #[test]
    fn value_excludes_punctuation() {
        for token in [
            Token::EndArray,
            Token::EndObject,
            Token::NameDelimiter,
            Token::ElementDelimiter,
            Token::Eof,
        ] {
            assert!(!TokenPattern::VALUE.matches(token), "{token}");
        }
    }

    #[test]
    fn pattern_display_lists_members() {
        assert_eq!(TokenPattern::END.to_string(), "']' or '}'");
        assert_eq!(TokenPattern::empty().to_string(), "nothing");
    }
}
