//! Homogeneous sequences and sets, stored as arrays.

use alloc::collections::{BTreeSet, LinkedList, VecDeque};
use alloc::format;
use alloc::vec::Vec;
use core::hash::{BuildHasher, Hash};
use std::collections::HashSet;

use serde_json::Value;

use super::{Ascending, ByText, sorted_by_text};
use crate::registry::{TypeCell, concat};
use crate::{Codec, CodecError, Context, ErrorKind, TypeTag};

// -----------------------------------------------------------------------------
// Lists

/// Encodes each element under its index.
fn encode_elements<'a, T: Codec + 'a>(
    ctx: &mut Context,
    items: impl Iterator<Item = &'a T>,
) -> impl Iterator<Item = Value> {
    items
        .enumerate()
        .map(move |(index, item)| ctx.scoped(index, |ctx| T::encode(ctx, item)))
}

macro_rules! impl_list_codec {
    ($($ty:ident)*) => {$(
        impl<T: TypeTag> TypeTag for $ty<T> {
            fn type_tag() -> &'static str {
                static CELL: TypeCell = TypeCell::new();
                CELL.get_or_insert::<Self, _>(|| {
                    concat(&[::core::stringify!($ty), "<", T::type_tag(), ">"])
                })
            }
        }

        impl<T: Codec> Codec for $ty<T> {
            fn validate(ctx: &mut Context, tree: &Value) -> bool {
                match ctx.check_array(tree) {
                    Some(array) => ctx.validate_elements::<T>(array),
                    None => false,
                }
            }

            fn encode(ctx: &mut Context, value: &Self) -> Value {
                Value::Array(encode_elements(ctx, value.iter()).collect())
            }

            fn decode(ctx: &mut Context, tree: &Value) -> Result<Self, CodecError> {
                let array = ctx.as_array(tree)?;
                ctx.decode_elements::<T>(array).collect()
            }
        }
    )*};
}

impl_list_codec!(Vec VecDeque LinkedList);

// -----------------------------------------------------------------------------
// Fixed arrays

impl<T: TypeTag, const N: usize> TypeTag for [T; N] {
    fn type_tag() -> &'static str {
        static CELL: TypeCell = TypeCell::new();
        CELL.get_or_insert::<Self, _>(|| format!("[{}; {N}]", T::type_tag()))
    }
}

impl<T: Codec, const N: usize> Codec for [T; N] {
    fn validate(ctx: &mut Context, tree: &Value) -> bool {
        let Some(array) = ctx.check_array(tree) else {
            return false;
        };
        if array.len() != N {
            return ctx.reject(ErrorKind::LengthMismatch {
                expected: N,
                found: array.len(),
            });
        }
        ctx.validate_elements::<T>(array)
    }

    fn encode(ctx: &mut Context, value: &Self) -> Value {
        Value::Array(encode_elements(ctx, value.iter()).collect())
    }

    fn decode(ctx: &mut Context, tree: &Value) -> Result<Self, CodecError> {
        let array = ctx.as_array(tree)?;
        let found = array.len();
        let items = ctx.decode_elements::<T>(array).collect::<Result<Vec<T>, _>>()?;
        items.try_into().map_err(|_| {
            ctx.error(ErrorKind::LengthMismatch { expected: N, found })
        })
    }
}

// -----------------------------------------------------------------------------
// Sets

/// Validates a set: every element, then each decoded element in turn
/// through `admit`, which refuses repeats and elements out of order.
///
/// A set built from duplicates would re-encode shorter than its tree, and
/// one read out of order would re-encode reordered.
fn validate_set<T: Codec>(
    ctx: &mut Context,
    tree: &Value,
    mut admit: impl FnMut(usize, &Value, T) -> Result<(), ErrorKind>,
) -> bool {
    let Some(array) = ctx.check_array(tree) else {
        return false;
    };
    if !ctx.validate_elements::<T>(array) {
        return false;
    }
    array.iter().enumerate().all(|(index, item)| {
        ctx.scoped(index, |ctx| match T::decode(ctx, item) {
            Ok(value) => match admit(index, item, value) {
                Ok(()) => true,
                Err(kind) => ctx.reject(kind),
            },
            Err(error) => ctx.reject(error.kind),
        })
    })
}

impl<T: TypeTag> TypeTag for BTreeSet<T> {
    fn type_tag() -> &'static str {
        static CELL: TypeCell = TypeCell::new();
        CELL.get_or_insert::<Self, _>(|| concat(&["BTreeSet<", T::type_tag(), ">"]))
    }
}

impl<T: Codec + Ord> Codec for BTreeSet<T> {
    fn validate(ctx: &mut Context, tree: &Value) -> bool {
        let mut seen = Ascending::new();
        validate_set::<T>(ctx, tree, |index, _, value| seen.admit(index, value))
    }

    fn encode(ctx: &mut Context, value: &Self) -> Value {
        Value::Array(encode_elements(ctx, value.iter()).collect())
    }

    fn decode(ctx: &mut Context, tree: &Value) -> Result<Self, CodecError> {
        let array = ctx.as_array(tree)?;
        ctx.decode_elements::<T>(array).collect()
    }
}

impl<T: TypeTag, S: 'static> TypeTag for HashSet<T, S> {
    fn type_tag() -> &'static str {
        static CELL: TypeCell = TypeCell::new();
        CELL.get_or_insert::<Self, _>(|| concat(&["HashSet<", T::type_tag(), ">"]))
    }
}

impl<T, S> Codec for HashSet<T, S>
where
    T: Codec + Eq + Hash,
    S: BuildHasher + Default + 'static,
{
    fn validate(ctx: &mut Context, tree: &Value) -> bool {
        let mut seen = ByText::<T, S>::new();
        validate_set::<T>(ctx, tree, |index, item, value| seen.admit(index, item, value))
    }

    fn encode(ctx: &mut Context, value: &Self) -> Value {
        sorted_by_text(encode_elements(ctx, value.iter()))
    }

    fn decode(ctx: &mut Context, tree: &Value) -> Result<Self, CodecError> {
        let array = ctx.as_array(tree)?;
        ctx.decode_elements::<T>(array).collect()
    }
}
