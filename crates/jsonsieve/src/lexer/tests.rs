use alloc::{format, string::String, vec::Vec};

use rstest::rstest;

use super::*;

fn tokens(input: &[u8]) -> Vec<Token> {
    let mut lexer = Lexer::from_slice(input);
    let mut out = Vec::new();
    loop {
        let token = lexer.expect(TokenPattern::all()).unwrap();
        out.push(token);
        if token == Token::Eof {
            return out;
        }
    }
}

fn first_error(input: &[u8]) -> DecodeError {
    let mut lexer = Lexer::from_slice(input);
    loop {
        match lexer.expect(TokenPattern::all()) {
            Ok(Token::Eof) => panic!("no error in {:?}", String::from_utf8_lossy(input)),
            Ok(_) => {}
            Err(e) => return e,
        }
    }
}

#[test]
fn lexes_every_token_kind() {
    assert_eq!(
        tokens(br#" {"a" : [1, -2, 3.5e1, true, false, null]} "#),
        [
            Token::BeginObject,
            Token::String,
            Token::NameDelimiter,
            Token::BeginArray,
            Token::UnsignedNumber,
            Token::ElementDelimiter,
            Token::SignedNumber,
            Token::ElementDelimiter,
            Token::FloatNumber,
            Token::ElementDelimiter,
            Token::Boolean,
            Token::ElementDelimiter,
            Token::Boolean,
            Token::ElementDelimiter,
            Token::Null,
            Token::EndArray,
            Token::EndObject,
            Token::Eof,
        ]
    );
}

#[rstest]
#[case("0", Token::UnsignedNumber)]
#[case("12", Token::UnsignedNumber)]
#[case("-0", Token::SignedNumber)]
#[case("-17", Token::SignedNumber)]
#[case("1.5", Token::FloatNumber)]
#[case("1e3", Token::FloatNumber)]
#[case("-1E-3", Token::FloatNumber)]
#[case("2e+8", Token::FloatNumber)]
fn classifies_numbers(#[case] input: &str, #[case] expected: Token) {
    let mut lexer = Lexer::from_slice(input.as_bytes());
    assert_eq!(lexer.expect(TokenPattern::NUMBER).unwrap(), expected);
    assert_eq!(lexer.number_text(), input);
    assert!(lexer.at_end().unwrap());
}

#[test]
fn leading_zero_ends_the_number() {
    let mut lexer = Lexer::from_slice(b"01");
    assert_eq!(lexer.expect(TokenPattern::NUMBER).unwrap(), Token::UnsignedNumber);
    assert_eq!(lexer.number_text(), "0");
    assert_eq!(lexer.peek().unwrap(), Token::UnsignedNumber);
}

#[rstest]
#[case(r#""plain""#, "plain")]
#[case(r#""a\"b\\c\/d""#, "a\"b\\c/d")]
#[case(r#""\b\f\n\r\t""#, "\u{8}\u{c}\n\r\t")]
#[case(r#""\u00e9\u00E9""#, "éé")]
#[case(r#""\ud83d\ude00""#, "😀")]
#[case("\"h\u{e9}llo \u{1F600}\"", "héllo 😀")]
fn decodes_strings(#[case] input: &str, #[case] expected: &str) {
    let mut lexer = Lexer::from_slice(input.as_bytes());
    lexer.expect(TokenPattern::STRING).unwrap();
    assert_eq!(lexer.string(), expected);
    assert_eq!(lexer.take_string(), expected);
}

#[test]
fn literals_set_the_boolean_payload() {
    let mut lexer = Lexer::from_slice(b"true false");
    lexer.expect(TokenPattern::BOOLEAN).unwrap();
    assert!(lexer.boolean());
    lexer.expect(TokenPattern::BOOLEAN).unwrap();
    assert!(!lexer.boolean());
}

#[rstest]
#[case(b"\"ab", SyntaxError::UnexpectedEndOfInput, 1, 4)]
#[case(b"[1.]", SyntaxError::InvalidCharacter(']'), 1, 4)]
#[case(b"tru ", SyntaxError::InvalidCharacter(' '), 1, 4)]
#[case(b"nul", SyntaxError::UnexpectedEndOfInput, 1, 4)]
#[case(b"\"\\x\"", SyntaxError::InvalidEscapeChar('x'), 1, 3)]
#[case(b"\"\\u00g0\"", SyntaxError::InvalidUnicodeEscapeChar('g'), 1, 6)]
#[case(b"\"\\ud83dx\"", SyntaxError::InvalidUnicodeEscapeSequence(0xD83D), 1, 8)]
#[case(b"\"\\ude00\"", SyntaxError::InvalidUnicodeEscapeSequence(0xDE00), 1, 7)]
#[case(b"\"a\nb\"", SyntaxError::ControlCharacter(0x0A), 1, 3)]
#[case(b"{\n  @", SyntaxError::InvalidCharacter('@'), 2, 3)]
#[case("[\"é\", @]".as_bytes(), SyntaxError::InvalidCharacter('@'), 1, 7)]
#[case(b"\"\xFF\"", SyntaxError::InvalidUtf8, 1, 2)]
#[case(b"-x", SyntaxError::InvalidCharacter('x'), 1, 2)]
fn reports_syntax_errors_with_positions(
    #[case] input: &[u8],
    #[case] expected: SyntaxError,
    #[case] line: usize,
    #[case] column: usize,
) {
    assert_eq!(
        first_error(input),
        DecodeError::new(ErrorSource::Syntax(expected), line, column)
    );
}

#[test]
fn unicode_whitespace_is_opt_in() {
    let input = "\u{a0}{}".as_bytes();

    let err = Lexer::from_slice(input).peek().unwrap_err();
    assert_eq!(
        err,
        DecodeError::new(SyntaxError::InvalidCharacter('\u{a0}').into(), 1, 1)
    );

    let options = ParserOptions {
        allow_unicode_whitespace: true,
        ..ParserOptions::default()
    };
    let mut lexer = Lexer::from_slice_with_options(input, options);
    assert_eq!(lexer.peek().unwrap(), Token::BeginObject);
    assert_eq!(lexer.position(), (1, 2));
}

#[test]
fn expect_reports_pattern_and_position() {
    let mut lexer = Lexer::from_slice(b"\n  [");
    let err = lexer.expect(TokenPattern::BEGIN_OBJECT).unwrap_err();
    assert_eq!(
        err,
        DecodeError::new(
            ErrorSource::UnexpectedToken {
                expected: TokenPattern::BEGIN_OBJECT,
                found: Token::BeginArray,
            },
            2,
            3
        )
    );
    // A failed expectation leaves the token in place.
    assert_eq!(lexer.expect(TokenPattern::BEGIN_ARRAY).unwrap(), Token::BeginArray);
}

#[test]
fn tracks_depth_and_consumed_tokens() {
    let mut lexer = Lexer::from_slice(b"[{}]");
    lexer.expect(TokenPattern::BEGIN).unwrap();
    lexer.expect(TokenPattern::BEGIN).unwrap();
    assert_eq!(lexer.depth(), 2);
    lexer.peek().unwrap();
    assert_eq!(lexer.tokens_consumed(), 2);
    lexer.expect(TokenPattern::END).unwrap();
    lexer.expect(TokenPattern::END).unwrap();
    assert_eq!(lexer.depth(), 0);
    assert_eq!(lexer.tokens_consumed(), 4);
}

#[test]
fn depth_limit_points_at_the_offending_opener() {
    let options = ParserOptions {
        max_depth: Some(2),
        ..ParserOptions::default()
    };
    let mut lexer = Lexer::from_slice_with_options(b"[[[1]]]", options);
    let err = lexer.skip_value().unwrap_err();
    assert_eq!(err, DecodeError::new(ErrorSource::DepthLimitExceeded(2), 1, 3));

    let mut lexer = Lexer::from_slice_with_options(b"[[1]]", options);
    lexer.skip_value().unwrap();
    assert!(lexer.at_end().unwrap());
}

#[rstest]
#[case(br#"{"a":[1,{"b":[]},{}],"c":null}"#)]
#[case(br#""just a string""#)]
#[case(b"[]")]
#[case(b"{}")]
#[case(b"[[[[]]],[[]]]")]
#[case(b"-1.25e-3")]
fn skip_value_stops_right_after_the_value(#[case] value: &[u8]) {
    let mut input = value.to_vec();
    input.extend_from_slice(b" 7");
    let mut lexer = Lexer::from_slice(&input);
    lexer.skip_value().unwrap();
    assert_eq!(lexer.depth(), 0);
    assert_eq!(lexer.expect(TokenPattern::NUMBER).unwrap(), Token::UnsignedNumber);
    assert_eq!(lexer.number_text(), "7");
}

#[rstest]
#[case(b"[1}", ErrorSource::MismatchedCloser { expected: StructureKind::Array, found: StructureKind::Object }, 1, 3)]
#[case(b"{\"a\" 1}", ErrorSource::UnexpectedToken { expected: TokenPattern::NAME_DELIMITER, found: Token::UnsignedNumber }, 1, 6)]
#[case(b"[1 2]", ErrorSource::UnexpectedToken { expected: TokenPattern::END | TokenPattern::ELEMENT_DELIMITER, found: Token::UnsignedNumber }, 1, 4)]
#[case(b"[1,]", ErrorSource::UnexpectedToken { expected: TokenPattern::VALUE, found: Token::EndArray }, 1, 4)]
fn skip_value_rejects_malformed_structure(
    #[case] input: &[u8],
    #[case] expected: ErrorSource,
    #[case] line: usize,
    #[case] column: usize,
) {
    let err = Lexer::from_slice(input).skip_value().unwrap_err();
    assert_eq!(err, DecodeError::new(expected, line, column));
}

#[test]
fn finish_rejects_trailing_values_unless_allowed() {
    let mut lexer = Lexer::from_slice(b"{} {}");
    lexer.skip_value().unwrap();
    assert_eq!(
        lexer.finish().unwrap_err(),
        DecodeError::new(
            ErrorSource::UnexpectedToken {
                expected: TokenPattern::EOF,
                found: Token::BeginObject,
            },
            1,
            4
        )
    );

    let options = ParserOptions {
        allow_multiple_json_values: true,
        ..ParserOptions::default()
    };
    let mut lexer = Lexer::from_slice_with_options(b"{} {}\n", options);
    let mut values = 0;
    while !lexer.at_end().unwrap() {
        lexer.skip_value().unwrap();
        lexer.finish().unwrap();
        values += 1;
    }
    assert_eq!(values, 2);
}

#[cfg(feature = "std")]
#[test]
fn reader_and_slice_lex_alike() {
    let input = br#"{"k": ["v", 1.5, {"n": null}]}"#;
    let mut from_slice = Lexer::from_slice(input);
    let mut from_reader = Lexer::from_reader(std::io::BufReader::with_capacity(3, &input[..]));
    loop {
        let a = from_slice.expect(TokenPattern::all()).unwrap();
        let b = from_reader.expect(TokenPattern::all()).unwrap();
        assert_eq!(a, b);
        assert_eq!(from_slice.string(), from_reader.string());
        assert_eq!(from_slice.position(), from_reader.position());
        if a == Token::Eof {
            break;
        }
    }
}

#[test]
fn skipping_does_not_buffer_payloads() {
    let big = "y".repeat(1 << 20);
    let digits = "9".repeat(1 << 20);
    let doc = format!(r#"["{big}", {{"{big}": {digits}}}, "\u00e9{big}"] "kept""#);
    let mut lexer = Lexer::from_slice(doc.as_bytes());
    lexer.skip_value().unwrap();
    assert!(lexer.string().is_empty());

    // Discarding ends with the skip.
    assert_eq!(lexer.decode::<String>().unwrap(), "kept");
    assert!(lexer.take_string().capacity() < 64);
}

#[test]
fn peeked_strings_are_read_on_consumption() {
    let mut lexer = Lexer::from_slice(br#"["bad\q"]"#);
    lexer.expect(TokenPattern::BEGIN_ARRAY).unwrap();
    assert_eq!(lexer.peek().unwrap(), Token::String);
    assert_eq!(
        lexer.expect(TokenPattern::STRING).unwrap_err(),
        DecodeError::new(SyntaxError::InvalidEscapeChar('q').into(), 1, 7)
    );
}
