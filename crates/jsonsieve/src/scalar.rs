//! Destination types for variable bindings.

use alloc::{boxed::Box, string::String, sync::Arc};

use crate::{ErrorSource, Lexer, Source, Token, TokenPattern};

/// A type a scalar JSON token can be decoded into.
///
/// The associated [`PATTERN`](Self::PATTERN) is what the lexer requires at
/// the bound position; a token outside of it fails the scan with
/// [`ErrorSource::UnexpectedToken`].
pub trait Scalar: Sized {
    /// Token kinds accepted for this type.
    const PATTERN: TokenPattern;

    /// Converts the token just consumed by `lexer`.
    ///
    /// `token` is guaranteed to be matched by [`PATTERN`](Self::PATTERN).
    ///
    /// # Errors
    ///
    /// Returns [`ErrorSource::NumberOutOfRange`] when a number does not fit.
    fn from_token<S: Source>(lexer: &mut Lexer<S>, token: Token) -> Result<Self, ErrorSource>;
}

impl Scalar for bool {
    const PATTERN: TokenPattern = TokenPattern::BOOLEAN;

    fn from_token<S: Source>(lexer: &mut Lexer<S>, _: Token) -> Result<Self, ErrorSource> {
        Ok(lexer.boolean())
    }
}

impl Scalar for String {
    const PATTERN: TokenPattern = TokenPattern::STRING;

    fn from_token<S: Source>(lexer: &mut Lexer<S>, _: Token) -> Result<Self, ErrorSource> {
        Ok(lexer.take_string())
    }
}

macro_rules! impl_scalar_for_shared_str {
    ($($t:ty),+) => {
        $(
            impl Scalar for $t {
                const PATTERN: TokenPattern = TokenPattern::STRING;

                fn from_token<S: Source>(lexer: &mut Lexer<S>, _: Token) -> Result<Self, ErrorSource> {
                    Ok(lexer.string().into())
                }
            }
        )+
    };
}

impl_scalar_for_shared_str!(Box<str>, Arc<str>);

fn out_of_range<S: Source>(lexer: &Lexer<S>) -> ErrorSource {
    ErrorSource::NumberOutOfRange(lexer.number_text().into())
}

macro_rules! impl_scalar_for_integer {
    ($pattern:ident, $wide:ty: $($t:ty),+) => {
        $(
            impl Scalar for $t {
                const PATTERN: TokenPattern = TokenPattern::$pattern;

                fn from_token<S: Source>(lexer: &mut Lexer<S>, _: Token) -> Result<Self, ErrorSource> {
                    lexer
                        .number_text()
                        .parse::<$wide>()
                        .ok()
                        .and_then(|wide| <$t>::try_from(wide).ok())
                        .ok_or_else(|| out_of_range(lexer))
                }
            }
        )+
    };
}

impl_scalar_for_integer!(UNSIGNED_INTEGER, u64: u8, u16, u32, u64, usize);
impl_scalar_for_integer!(SIGNED_INTEGER, i64: i8, i16, i32, i64, isize);

macro_rules! impl_scalar_for_float {
    ($($t:ty),+) => {
        $(
            impl Scalar for $t {
                const PATTERN: TokenPattern = TokenPattern::NUMBER;

                fn from_token<S: Source>(lexer: &mut Lexer<S>, _: Token) -> Result<Self, ErrorSource> {
                    match lexer.number_text().parse::<$t>() {
                        Ok(v) if v.is_finite() => Ok(v),
                        _ => Err(out_of_range(lexer)),
                    }
                }
            }
        )+
    };
}

impl_scalar_for_float!(f32, f64);

/// `null` decodes to `None`; anything `T` accepts decodes to `Some`.
impl<T: Scalar> Scalar for Option<T> {
    const PATTERN: TokenPattern = T::PATTERN.union(TokenPattern::NULL);

    fn from_token<S: Source>(lexer: &mut Lexer<S>, token: Token) -> Result<Self, ErrorSource> {
        if token == Token::Null {
            Ok(None)
        } else {
            T::from_token(lexer, token).map(Some)
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use rstest::rstest;

    use crate::{ErrorSource, Lexer, Token};

    #[rstest]
    #[case(b"255", Some(255u8))]
    #[case(b"256", None)]
    #[case(b"0", Some(0u8))]
    fn unsigned_range(#[case] input: &[u8], #[case] expected: Option<u8>) {
        let mut lexer = Lexer::from_slice(input);
        match (lexer.decode::<u8>(), expected) {
            (Ok(v), Some(e)) => assert_eq!(v, e),
            (Err(err), None) => {
                assert!(matches!(err.kind(), ErrorSource::NumberOutOfRange(text) if text == "256"));
            }
            (got, want) => panic!("got {got:?}, want {want:?}"),
        }
    }

    #[test]
    fn signed_pattern_rejects_floats() {
        let mut lexer = Lexer::from_slice(b"-1.5");
        let err = lexer.decode::<i32>().unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorSource::UnexpectedToken { found: Token::FloatNumber, .. }
        ));
    }

    #[test]
    fn floats_accept_integers() {
        let mut lexer = Lexer::from_slice(b"-7");
        assert!((lexer.decode::<f64>().unwrap() + 7.0).abs() < f64::EPSILON);
    }

    #[test]
    fn float_overflow_is_out_of_range() {
        let mut lexer = Lexer::from_slice(b"1e999");
        assert!(lexer.decode::<f64>().is_err());
    }

    #[test]
    fn option_accepts_null() {
        let mut lexer = Lexer::from_slice(b"null");
        assert_eq!(lexer.decode::<Option<String>>().unwrap(), None);
        let mut lexer = Lexer::from_slice(b"\"x\"");
        assert_eq!(lexer.decode::<Option<String>>().unwrap().as_deref(), Some("x"));
    }
}
