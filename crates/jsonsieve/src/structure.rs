//! Structure kinds and the stack of containers opened during a scan.

use alloc::vec::Vec;
use core::fmt;

use crate::{Token, error::ErrorSource};

/// The kind of a binding-tree node, or of an opened container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructureKind {
    /// A JSON array, children addressed by index.
    Array,
    /// A JSON object, children addressed by key.
    Object,
    /// A bound leaf.
    Callback,
    /// A container whose kind is not known yet (only a wildcard was
    /// registered below it).
    Incomplete,
}

impl StructureKind {
    /// The container kind opened by `token`, if it is `[` or `{`.
    #[must_use]
    pub fn opened_by(token: Token) -> Option<Self> {
        match token {
            Token::BeginArray => Some(Self::Array),
            Token::BeginObject => Some(Self::Object),
            _ => None,
        }
    }

    /// The container kind closed by `token`, if it is `]` or `}`.
    #[must_use]
    pub fn closed_by(token: Token) -> Option<Self> {
        match token {
            Token::EndArray => Some(Self::Array),
            Token::EndObject => Some(Self::Object),
            _ => None,
        }
    }

    /// Returns `true` for [`Array`](Self::Array) and [`Object`](Self::Object).
    #[must_use]
    pub fn is_container(self) -> bool {
        matches!(self, Self::Array | Self::Object)
    }
}

impl fmt::Display for StructureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Array => "array",
            Self::Object => "object",
            Self::Callback => "callback",
            Self::Incomplete => "incomplete",
        })
    }
}

/// Containers opened so far, innermost last. Only validates that every
/// closer matches its opener; it knows nothing about bindings.
#[derive(Debug, Default)]
pub(crate) struct StructureStack {
    kinds: Vec<StructureKind>,
}

impl StructureStack {
    pub fn push(&mut self, kind: StructureKind) {
        debug_assert!(kind.is_container());
        self.kinds.push(kind);
    }

    pub fn top(&self) -> Option<StructureKind> {
        self.kinds.last().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Pops the innermost container, checking it is the one `closer` ends.
    pub fn pop_closer(&mut self, closer: Token) -> Result<StructureKind, ErrorSource> {
        let Some(found) = StructureKind::closed_by(closer) else {
            return Err(ErrorSource::UnexpectedToken {
                expected: crate::TokenPattern::END,
                found: closer,
            });
        };
        match self.kinds.last() {
            Some(&expected) if expected != found => {
                Err(ErrorSource::MismatchedCloser { expected, found })
            }
            Some(_) => {
                self.kinds.pop();
                Ok(found)
            }
            None => Err(ErrorSource::UnexpectedToken {
                expected: crate::TokenPattern::EOF,
                found: closer,
            }),
        }
    }
}
