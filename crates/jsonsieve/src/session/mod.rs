//! Parser sessions: a binding tree bound to a lexer.
//!
//! A [`Session`] collects bindings, then [`run`](Session::run)s one scan over
//! the object at the lexer's current position. Callbacks receive a
//! [`Nested`] handle over the same lexer. From it they can open a nested
//! session for the value they are positioned at, which lets the binding
//! shape depend on data seen so far. Recursive schemas work the same way.

mod register;
mod scan;

use alloc::string::String;

use crate::{
    DecodeError, Error, ErrorSource, Lexer, PathElement, Scalar, Source, Token,
    tree::BindingTree,
};

/// One binding tree, scanning the object at the lexer's position.
///
/// ```rust
/// use jsonsieve::{EACH, Lexer, path};
///
/// let mut lexer = Lexer::from_slice(br#"{"a":{"b":1,"c":[10,20,30]},"d":"x"}"#);
/// let mut b = 0u64;
/// let mut c = Vec::new();
///
/// let mut session = lexer.session();
/// session.bind_variable(path!["a", "b"], &mut b)?;
/// session.bind_callback(path!["a", "c", EACH], |item| {
///     c.push(item.decode::<u64>()?);
///     Ok(())
/// })?;
/// session.run()?;
/// lexer.finish()?;
///
/// assert_eq!(b, 1);
/// assert_eq!(c, [10, 20, 30]);
/// # Ok::<(), jsonsieve::Error>(())
/// ```
pub struct Session<'l, 'cb, S> {
    lexer: &'l mut Lexer<S>,
    tree: BindingTree<'cb, S>,
}

impl<'l, 'cb, S: Source> Session<'l, 'cb, S> {
    /// Creates a session with no bindings over `lexer`.
    pub fn new(lexer: &'l mut Lexer<S>) -> Self {
        Self {
            lexer,
            tree: BindingTree::new(),
        }
    }

    /// Runs the scan: consumes the object at the lexer's position, invoking
    /// bindings on the way and skipping everything unbound.
    ///
    /// Variables written before a failure keep whatever was written; callers
    /// must not treat them as a partial result.
    ///
    /// # Errors
    ///
    /// Returns the first structural or lexical error, or the first error
    /// returned by a callback.
    #[tracing::instrument(level = "debug", skip_all, fields(nodes = self.tree.len()))]
    pub fn run(self) -> Result<(), Error> {
        let Self { lexer, mut tree } = self;
        scan::Scanner::new(&mut tree, lexer).scan()
    }
}

impl<S> core::fmt::Debug for Session<'_, '_, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Session").field("tree", &self.tree).finish_non_exhaustive()
    }
}

/// Handle given to a callback, positioned at the bound value.
///
/// The callback must consume exactly that value, through
/// [`decode`](Self::decode), [`skip`](Self::skip), a nested
/// [`session`](Self::session), or the raw [`lexer`](Self::lexer). If it
/// consumes nothing, the value is skipped on its behalf.
pub struct Nested<'l, S> {
    lexer: &'l mut Lexer<S>,
    at: Option<PathElement>,
}

impl<'l, S: Source> Nested<'l, S> {
    pub(crate) fn new(lexer: &'l mut Lexer<S>, at: Option<PathElement>) -> Self {
        Self { lexer, at }
    }

    /// The key or index that dispatched this callback.
    #[must_use]
    pub fn at(&self) -> Option<&PathElement> {
        self.at.as_ref()
    }

    /// The object key that dispatched this callback, if it sits in an object.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.at.as_ref().and_then(PathElement::as_key)
    }

    /// The array index that dispatched this callback, if it sits in an array.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        self.at.as_ref().and_then(PathElement::as_index)
    }

    /// Opens a nested session for the object at this position. Bindings
    /// registered on it may borrow locals of the callback.
    pub fn session<'cb>(&mut self) -> Session<'_, 'cb, S> {
        Session::new(self.lexer)
    }

    /// Decodes the scalar at this position.
    ///
    /// # Errors
    ///
    /// Fails if the token does not match `T::PATTERN` or does not fit `T`.
    pub fn decode<T: Scalar>(&mut self) -> Result<T, DecodeError> {
        self.lexer.decode()
    }

    /// Skips the value at this position.
    ///
    /// # Errors
    ///
    /// Fails if the value is malformed.
    pub fn skip(&mut self) -> Result<(), DecodeError> {
        self.lexer.skip_value()
    }

    /// Looks at the kind of the value without consuming it.
    ///
    /// # Errors
    ///
    /// Fails if the input is not lexically valid.
    pub fn peek(&mut self) -> Result<Token, DecodeError> {
        self.lexer.peek()
    }

    /// The shared lexer.
    pub fn lexer(&mut self) -> &mut Lexer<S> {
        self.lexer
    }

    /// Builds an error positioned at the current token, to return from the
    /// callback.
    pub fn error(&self, message: impl Into<String>) -> Error {
        self.lexer
            .error_at_token(ErrorSource::Custom(message.into()))
            .into()
    }
}
