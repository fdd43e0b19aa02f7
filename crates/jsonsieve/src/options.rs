/// Configuration options for the lexer and every session scanning through it.
///
/// # Examples
///
/// ```rust
/// use jsonsieve::{Lexer, ParserOptions};
///
/// let options = ParserOptions {
///     allow_multiple_json_values: true,
///     max_depth: Some(64),
///     ..Default::default()
/// };
/// let lexer = Lexer::from_slice_with_options(br#"{} {}"#, options);
/// # drop(lexer);
/// ```
///
/// # Default
///
/// All flags default to `false` and nesting depth is unlimited.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParserOptions {
    /// Whether to allow any Unicode whitespace between tokens.
    ///
    /// By default, the lexer only recognizes the four whitespace characters
    /// defined by the JSON specification: space (U+0020), line feed (U+000A),
    /// carriage return (U+000D), and horizontal tab (U+0009).
    ///
    /// # Default
    ///
    /// `false`
    pub allow_unicode_whitespace: bool,

    /// Whether the input may hold several whitespace-delimited JSON values.
    ///
    /// When `true`, [`Lexer::finish`](crate::Lexer::finish) accepts further
    /// values after the first one, and callers can loop over documents with
    /// [`Lexer::at_end`](crate::Lexer::at_end). This supports JSON Lines and
    /// other concatenated streams.
    ///
    /// # Default
    ///
    /// `false`
    pub allow_multiple_json_values: bool,

    /// Maximum container nesting, counted across the whole input, including
    /// skipped subtrees and nested sessions.
    ///
    /// # Default
    ///
    /// `None` (unlimited)
    pub max_depth: Option<usize>,
}
