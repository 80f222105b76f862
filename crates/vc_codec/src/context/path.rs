use alloc::borrow::Cow;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

// -----------------------------------------------------------------------------
// PathSegment

/// One step from a node to one of its children.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// An object key.
    Key(Cow<'static, str>),
    /// An array position.
    Index(usize),
}

impl From<&'static str> for PathSegment {
    #[inline]
    fn from(key: &'static str) -> Self {
        Self::Key(Cow::Borrowed(key))
    }
}

impl From<String> for PathSegment {
    #[inline]
    fn from(key: String) -> Self {
        Self::Key(Cow::Owned(key))
    }
}

impl From<usize> for PathSegment {
    #[inline]
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) if is_plain(key) => write!(f, ".{key}"),
            Self::Key(key) => write!(f, "[{key:?}]"),
            Self::Index(index) => write!(f, "[{index}]"),
        }
    }
}

fn is_plain(key: &str) -> bool {
    !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// -----------------------------------------------------------------------------
// FieldPath

/// Location of a node inside an encoded tree, from the root.
///
/// Displays like `$.items[2].min`. Keys that are not plain identifiers
/// are quoted: `$["0:i32"]`.
///
/// # Examples
///
/// ```
/// use vc_codec::{FieldPath, PathSegment};
///
/// let path = FieldPath::from_segments(vec![
///     PathSegment::from("items"),
///     PathSegment::from(2_usize),
///     PathSegment::from("Vec<u8>"),
/// ]);
/// assert_eq!(path.to_string(), r#"$.items[2]["Vec<u8>"]"#);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    /// The path of the root node.
    #[inline]
    pub const fn root() -> Self {
        Self(Vec::new())
    }

    /// Builds a path from its segments, outermost first.
    #[inline]
    pub fn from_segments(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }

    #[inline]
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub(crate) fn push(&mut self, segment: PathSegment) {
        self.0.push(segment);
    }

    #[inline]
    pub(crate) fn pop(&mut self) {
        self.0.pop();
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for segment in &self.0 {
            fmt::Display::fmt(segment, f)?;
        }
        Ok(())
    }
}
