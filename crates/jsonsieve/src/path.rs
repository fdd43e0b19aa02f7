use alloc::{
    string::{String, ToString},
    sync::Arc,
    vec::Vec,
};
use core::fmt;

use crate::{BindError, StructureKind};

/// Object key type used throughout the binding tree.
pub type Key = Arc<str>;
/// Array index type.
pub type Index = usize;

/// Where integer conversions send values that are not valid indices.
/// Registration rejects it.
pub(crate) const OUT_OF_RANGE: Index = Index::MAX;

/// One step of a declared binding path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathElement {
    /// An array index.
    Index(Index),
    /// An object key.
    Key(Key),
    /// Every element or key at this level that no more specific path claims.
    Each,
}

/// The wildcard element, for use in [`path!`](crate::path).
pub const EACH: PathElement = PathElement::Each;

/// A declared binding path.
pub type Path = Vec<PathElement>;

impl PathElement {
    /// The container kind this element implies for the node it indexes into.
    #[must_use]
    pub fn structure(&self) -> StructureKind {
        match self {
            Self::Index(_) => StructureKind::Array,
            Self::Key(_) => StructureKind::Object,
            Self::Each => StructureKind::Incomplete,
        }
    }

    #[must_use]
    /// Returns the index if this element is an index, otherwise `None`.
    pub fn as_index(&self) -> Option<Index> {
        if let Self::Index(v) = self {
            Some(*v)
        } else {
            None
        }
    }

    #[must_use]
    /// Returns the key if this element is a key, otherwise `None`.
    pub fn as_key(&self) -> Option<&str> {
        if let Self::Key(v) = self {
            Some(v)
        } else {
            None
        }
    }
}

// Convenient conversions so users can write `path![0, "foo", EACH]` etc.
#[doc(hidden)]
pub trait PathElementFrom<T> {
    fn from_path_element(value: T) -> PathElement;
}

impl PathElementFrom<PathElement> for PathElement {
    fn from_path_element(value: PathElement) -> Self {
        value
    }
}

impl PathElementFrom<&str> for PathElement {
    fn from_path_element(value: &str) -> Self {
        PathElement::Key(value.into())
    }
}

impl PathElementFrom<String> for PathElement {
    fn from_path_element(value: String) -> Self {
        PathElement::Key(value.into())
    }
}

impl PathElementFrom<&String> for PathElement {
    fn from_path_element(value: &String) -> Self {
        PathElement::Key(value.as_str().into())
    }
}

impl PathElementFrom<Key> for PathElement {
    fn from_path_element(value: Key) -> Self {
        PathElement::Key(value)
    }
}

macro_rules! impl_integer_as_path_element {
    ($($t:ty),+) => {
        $(
            impl PathElementFrom<$t> for PathElement {
                fn from_path_element(value: $t) -> Self {
                    PathElement::Index(Index::try_from(value).unwrap_or(OUT_OF_RANGE))
                }
            }

            impl From<$t> for PathElement {
                fn from(value: $t) -> Self {
                    <PathElement as PathElementFrom<$t>>::from_path_element(value)
                }
            }
        )+
    };
}
impl_integer_as_path_element!(i32, i64, u8, u16, u32, u64, usize);

impl From<&str> for PathElement {
    fn from(s: &str) -> Self {
        Self::Key(s.into())
    }
}

impl fmt::Display for PathElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "[{i}]"),
            Self::Key(k) => f.write_str(k),
            Self::Each => f.write_str("*"),
        }
    }
}

/// Renders a path in the textual form accepted by [`parse_path`]:
/// keys joined by `.`, indices as `[n]`, the wildcard as `*` (or `[*]`
/// directly after another element).
#[must_use]
pub fn display_path(path: &[PathElement]) -> String {
    let mut out = String::new();
    for (i, element) in path.iter().enumerate() {
        match element {
            PathElement::Index(_) => out.push_str(&element.to_string()),
            PathElement::Each if i > 0 => out.push_str("[*]"),
            _ => {
                if i > 0 {
                    out.push('.');
                }
                out.push_str(&element.to_string());
            }
        }
    }
    if out.is_empty() {
        out.push('.');
    }
    out
}

/// Parses the textual path form: `a.b[2].c[*]`, `items.*.name`.
///
/// Keys may not contain `.`, `[` or `]`; build such paths with
/// [`path!`](crate::path) instead. A lone `.` is the empty path.
///
/// # Errors
///
/// Returns [`BindError::InvalidPath`] with the offset of the first character
/// that does not fit the grammar.
pub fn parse_path(text: &str) -> Result<Path, BindError> {
    let invalid = |offset: usize| BindError::InvalidPath {
        path: text.into(),
        offset,
    };
    let mut path = Path::new();
    if text == "." {
        return Ok(path);
    }

    let bytes = text.as_bytes();
    let mut i = 0;
    // A key is expected at the start and after every `.`.
    let mut want_key = true;
    while i < bytes.len() {
        match bytes[i] {
            b'[' => {
                let close = text[i..].find(']').map(|n| i + n).ok_or_else(|| invalid(i))?;
                let inner = &text[i + 1..close];
                if inner == "*" {
                    path.push(PathElement::Each);
                } else {
                    let index = inner.parse::<Index>().map_err(|_| invalid(i + 1))?;
                    path.push(PathElement::Index(index));
                }
                i = close + 1;
                want_key = false;
            }
            b'.' if !want_key => {
                i += 1;
                want_key = true;
            }
            _ if want_key => {
                let end = text[i..]
                    .find(['.', '['])
                    .map_or(text.len(), |n| i + n);
                let key = &text[i..end];
                if key.is_empty() || key.contains(']') {
                    return Err(invalid(i));
                }
                path.push(if key == "*" {
                    PathElement::Each
                } else {
                    PathElement::Key(key.into())
                });
                i = end;
                want_key = false;
            }
            _ => return Err(invalid(i)),
        }
    }
    if want_key {
        return Err(invalid(text.len()));
    }
    Ok(path)
}

// Custom (de)serialization so that a `Path` becomes e.g. `["items", null, 0]`
// with `null` standing for the wildcard.
#[cfg(feature = "serde")]
mod serde_impls {
    use alloc::string::String;
    use core::fmt;

    use serde::{
        Deserialize, Deserializer, Serialize, Serializer,
        de::{Error, Unexpected, Visitor},
    };

    use super::{Index, PathElement};

    impl Serialize for PathElement {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match self {
                PathElement::Key(k) => serializer.serialize_str(k),
                PathElement::Index(i) => serializer.serialize_u64(*i as u64),
                PathElement::Each => serializer.serialize_none(),
            }
        }
    }

    struct PathElementVisitor;

    impl<'de> Visitor<'de> for PathElementVisitor {
        type Value = PathElement;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string, an unsigned integer or null")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: Error,
        {
            Ok(PathElement::Key(value.into()))
        }

        fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
        where
            E: Error,
        {
            Ok(PathElement::Key(value.into()))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: Error,
        {
            Index::try_from(value)
                .map(PathElement::Index)
                .map_err(|_| Error::invalid_value(Unexpected::Unsigned(value), &"an index"))
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: Error,
        {
            Index::try_from(value)
                .map(PathElement::Index)
                .map_err(|_| Error::invalid_value(Unexpected::Signed(value), &"non-negative index"))
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: Error,
        {
            Ok(PathElement::Each)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: Error,
        {
            Ok(PathElement::Each)
        }
    }

    impl<'de> Deserialize<'de> for PathElement {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            deserializer.deserialize_any(PathElementVisitor)
        }
    }
}
