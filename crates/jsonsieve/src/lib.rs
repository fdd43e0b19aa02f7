//! Streaming, selective JSON decoding.
//!
//! Declare the paths you care about on a [`Session`], then run it over a
//! [`Lexer`]. One forward pass consumes the document: bound values are
//! decoded straight into variables or handed to callbacks, and everything
//! else is skipped without being materialized.
//!
//! ```rust
//! use jsonsieve::{Lexer, path};
//!
//! let mut lexer = Lexer::from_slice(br#"{"name":"sieve","stats":{"stars":12,"forks":[1,2]}}"#);
//! let mut stars = 0u32;
//!
//! let mut session = lexer.session();
//! session.bind_variable(path!["stats", "stars"], &mut stars)?;
//! session.run()?;
//!
//! assert_eq!(stars, 12);
//! # Ok::<(), jsonsieve::Error>(())
//! ```
//!
//! Callbacks get a [`Nested`] handle and may open a nested session on the
//! value they are positioned at, so the set of bindings can depend on the
//! data read so far.

#![no_std]
extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

mod error;
mod lexer;
mod options;
mod path;
mod scalar;
mod session;
mod structure;
mod token;
mod tree;

pub use error::{BindError, DecodeError, Error, ErrorSource, SyntaxError};
#[cfg(feature = "std")]
pub use lexer::ReaderSource;
pub use lexer::{Lexer, SliceSource, Source, SourceError};
pub use options::ParserOptions;
#[doc(hidden)]
pub use path::PathElementFrom;
pub use path::{EACH, Index, Key, Path, PathElement, display_path, parse_path};
pub use scalar::Scalar;
pub use session::{Nested, Session};
pub use structure::StructureKind;
pub use token::{Token, TokenPattern};

#[doc(hidden)]
pub use alloc::vec;

/// Macro to build a [`Path`] from a heterogeneous list of keys, indices and
/// [`EACH`].
///
/// ```rust
/// # use jsonsieve::{EACH, PathElement, path};
/// let p = path!["items", EACH, 0];
/// assert_eq!(
///     p,
///     vec![
///         PathElement::Key("items".into()),
///         PathElement::Each,
///         PathElement::Index(0)
///     ]
/// );
/// ```
#[macro_export]
macro_rules! path {
    ( $( $elem:expr ),* $(,)? ) => {{
        #[allow(unused_imports)]
        use $crate::PathElementFrom;
        let path: $crate::Path = $crate::vec![$($crate::PathElement::from_path_element($elem)),*];
        path
    }};
}
