//! Bridges to `serde_json` and `serde`.
//!
//! A [`Value`] is stored as itself. [`Serde<T>`] stores any type with
//! serde implementations as serde would, for types whose shape is owned
//! by another crate.

use alloc::format;
use alloc::string::ToString;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::registry::{TypeCell, concat};
use crate::{Codec, CodecError, Context, ErrorKind, TypeTag};

// -----------------------------------------------------------------------------
// Value

crate::impl_type_tag!(Value);

impl Codec for Value {
    #[inline]
    fn validate(_: &mut Context, _: &Value) -> bool {
        true
    }

    #[inline]
    fn encode(_: &mut Context, value: &Self) -> Value {
        value.clone()
    }

    #[inline]
    fn decode(_: &mut Context, tree: &Value) -> Result<Self, CodecError> {
        Ok(tree.clone())
    }
}

// -----------------------------------------------------------------------------
// Serde

/// A value stored through its serde implementations.
///
/// Validation requires the tree to deserialize, and to serialize back to
/// the same tree, so that lossy serde implementations are refused rather
/// than silently normalised.
///
/// # Panics
///
/// Encoding panics if `T`'s `Serialize` implementation fails, which for
/// `serde_json` only happens with non-string map keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Serde<T>(pub T);

impl<T: TypeTag> TypeTag for Serde<T> {
    fn type_tag() -> &'static str {
        static CELL: TypeCell = TypeCell::new();
        CELL.get_or_insert::<Self, _>(|| concat(&["Serde<", T::type_tag(), ">"]))
    }
}

impl<T> Codec for Serde<T>
where
    T: Serialize + DeserializeOwned + TypeTag,
{
    fn validate(ctx: &mut Context, tree: &Value) -> bool {
        let value = match serde_json::from_value::<T>(tree.clone()) {
            Ok(value) => value,
            Err(error) => return ctx.reject(ErrorKind::Custom(error.to_string())),
        };
        match serde_json::to_value(&value) {
            Ok(back) if back == *tree => true,
            Ok(_) => ctx.reject(ErrorKind::Custom(format!(
                "`{}` does not serialize back to the same tree",
                T::type_tag()
            ))),
            Err(error) => ctx.reject(ErrorKind::Custom(error.to_string())),
        }
    }

    fn encode(ctx: &mut Context, value: &Self) -> Value {
        match serde_json::to_value(&value.0) {
            Ok(tree) => tree,
            Err(error) => {
                log::error!("`{}` failed to serialize at `{}`: {error}", T::type_tag(), ctx.path());
                panic!("`{}` failed to serialize: {error}", T::type_tag());
            }
        }
    }

    fn decode(ctx: &mut Context, tree: &Value) -> Result<Self, CodecError> {
        serde_json::from_value(tree.clone())
            .map(Serde)
            .map_err(|error| ctx.error(ErrorKind::Custom(error.to_string())))
    }
}
