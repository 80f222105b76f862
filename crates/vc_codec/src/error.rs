use alloc::borrow::Cow;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use thiserror::Error;

use crate::context::FieldPath;

// -----------------------------------------------------------------------------
// ErrorKind

/// What went wrong at one node of an encoded tree.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ErrorKind {
    #[error("expected {expected}, found {found}")]
    KindMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("missing key `{0}`")]
    MissingKey(Cow<'static, str>),

    #[error("unknown key `{0}`")]
    UnknownKey(String),

    #[error("expected {expected} elements, found {found}")]
    LengthMismatch { expected: usize, found: usize },

    #[error("`{value}` does not fit in `{target}`")]
    OutOfRange { value: String, target: &'static str },

    #[error("`{text}` is not a valid `{target}`")]
    Malformed { text: String, target: &'static str },

    #[error("expected exactly one present alternative, found {0}")]
    NotExclusive(usize),

    #[error("duplicate element at index {0}")]
    Duplicate(usize),

    #[error("element at index {0} is out of order")]
    Unordered(usize),

    #[error("unknown type tag `{0}`")]
    UnknownTypeTag(String),

    #[error("rejected by {0} validator")]
    Rejected(&'static str),

    #[error("{0}")]
    Custom(String),
}

// -----------------------------------------------------------------------------
// CodecError

/// An [`ErrorKind`] located by the path of the offending node.
///
/// Returned by [`Codec::decode`](crate::Codec::decode) and recorded by
/// [`Context::reject`](crate::Context::reject) when a tree is refused.
///
/// # Examples
///
/// ```
/// use vc_codec::{Context, ErrorKind};
///
/// let mut ctx = Context::new();
/// let tree = serde_json::json!([1, "two"]);
/// assert!(!ctx.validate::<Vec<u8>>(&tree));
///
/// let error = &ctx.diagnostics()[0];
/// assert_eq!(error.path.to_string(), "$[1]");
/// assert!(matches!(error.kind, ErrorKind::KindMismatch { .. }));
/// ```
#[derive(Debug, Error, Clone, PartialEq)]
#[error("at `{path}`: {kind}")]
pub struct CodecError {
    pub path: FieldPath,
    pub kind: ErrorKind,
}

// -----------------------------------------------------------------------------
// ValidationError

/// A tree refused by the checked entry points.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Tag of the type the tree was checked against.
    pub type_tag: &'static str,
    /// Every diagnostic recorded while checking, in the order found.
    pub errors: Vec<CodecError>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tree is not a valid `{}`", self.type_tag)?;
        if let Some(first) = self.errors.first() {
            write!(f, " ({first}")?;
            if self.errors.len() > 1 {
                write!(f, ", and {} more", self.errors.len() - 1)?;
            }
            f.write_str(")")?;
        }
        Ok(())
    }
}

impl core::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;
    use alloc::vec;

    use super::{CodecError, ErrorKind, ValidationError};
    use crate::context::{FieldPath, PathSegment};

    #[test]
    fn codec_error_display_leads_with_path() {
        let error = CodecError {
            path: FieldPath::from_segments(vec![
                PathSegment::from("items"),
                PathSegment::from(2_usize),
            ]),
            kind: ErrorKind::LengthMismatch {
                expected: 3,
                found: 2,
            },
        };
        assert_eq!(
            error.to_string(),
            "at `$.items[2]`: expected 3 elements, found 2"
        );
    }

    #[test]
    fn validation_error_summarises() {
        let error = ValidationError {
            type_tag: "u8",
            errors: vec![
                CodecError {
                    path: FieldPath::root(),
                    kind: ErrorKind::Rejected("joint"),
                },
                CodecError {
                    path: FieldPath::root(),
                    kind: ErrorKind::Duplicate(1),
                },
            ],
        };
        assert_eq!(
            error.to_string(),
            "tree is not a valid `u8` (at `$`: rejected by joint validator, and 1 more)"
        );
    }
}
