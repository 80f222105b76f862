//! `Option<T>`, stored as an array of zero or one element.
//!
//! Absence is `[]` rather than `null`, so `Option<Option<T>>` stays
//! unambiguous: `[]`, `[[]]` and `[[x]]`.

use alloc::vec;
use alloc::vec::Vec;

use serde_json::Value;

use crate::registry::{TypeCell, concat};
use crate::{Codec, CodecError, Context, ErrorKind, TypeTag};

/// Encoded form of a present value.
#[inline]
pub(crate) fn present(inner: Value) -> Value {
    Value::Array(vec![inner])
}

/// Encoded form of an absent value.
#[inline]
pub(crate) fn absent() -> Value {
    Value::Array(Vec::new())
}

impl<T: TypeTag> TypeTag for Option<T> {
    fn type_tag() -> &'static str {
        static CELL: TypeCell = TypeCell::new();
        CELL.get_or_insert::<Self, _>(|| concat(&["Option<", T::type_tag(), ">"]))
    }
}

impl<T: Codec> Codec for Option<T> {
    fn validate(ctx: &mut Context, tree: &Value) -> bool {
        match ctx.check_array(tree).map(Vec::as_slice) {
            None => false,
            Some([]) => true,
            Some([inner]) => ctx.scoped(0, |ctx| T::validate(ctx, inner)),
            Some(array) => ctx.reject(ErrorKind::LengthMismatch {
                expected: 1,
                found: array.len(),
            }),
        }
    }

    fn encode(ctx: &mut Context, value: &Self) -> Value {
        match value {
            Some(inner) => present(T::encode(ctx, inner)),
            None => absent(),
        }
    }

    fn decode(ctx: &mut Context, tree: &Value) -> Result<Self, CodecError> {
        match ctx.as_array(tree)?.as_slice() {
            [] => Ok(None),
            [inner] => ctx.scoped(0, |ctx| T::decode(ctx, inner)).map(Some),
            array => Err(ctx.error(ErrorKind::LengthMismatch {
                expected: 1,
                found: array.len(),
            })),
        }
    }
}
