//! Tagged unions.
//!
//! A union of N alternatives is an object with N keys, one per
//! alternative, named by the alternative's type tag. Each value is the
//! `Option` encoding of that slot: `[x]` for the present alternative, `[]`
//! for the others. Two alternatives with the same tag get distinct keys,
//! the second one suffixed with a counter (`u8`, `u80`).
//!
//! `Variant2<i32, String>` holding `"FooBar"`:
//!
//! ```json
//! { "i32": [], "String": ["FooBar"] }
//! ```

use alloc::borrow::Cow;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use serde_json::{Map, Value};

use super::{absent, present};
use crate::registry::{TypeCell, concat};
use crate::{CodecError, Context, ErrorKind, TypeTag};

// -----------------------------------------------------------------------------
// VariantCodec

/// Per-alternative access to a tagged union.
///
/// Implemented by [`impl_variant_codec!`](crate::impl_variant_codec).
#[doc(hidden)]
pub trait VariantCodec: TypeTag + Sized {
    /// Tags of the alternatives, in declaration order.
    fn alternative_tags() -> Vec<&'static str>;

    /// Validates the slot of alternative `index` as an `Option`.
    fn validate_slot(ctx: &mut Context, index: usize, slot: &Value) -> bool;

    /// Index of the alternative held by `value`.
    fn active(value: &Self) -> usize;

    /// Encodes the value held by the active alternative.
    fn encode_active(ctx: &mut Context, value: &Self) -> Value;

    /// Decodes alternative `index` from the value inside its slot.
    fn decode_alternative(ctx: &mut Context, index: usize, inner: &Value) -> Result<Self, CodecError>;
}

/// Object keys of `V`, unique, in declaration order.
fn keys<V: VariantCodec>() -> &'static [&'static str] {
    static CELL: TypeCell = TypeCell::new();
    CELL.get_or_insert::<V, _>(|| {
        let mut keys: Vec<&'static str> = Vec::new();
        for tag in V::alternative_tags() {
            if !keys.contains(&tag) {
                keys.push(tag);
                continue;
            }
            let mut index = 0_usize;
            let key = loop {
                let key = format!("{tag}{index}");
                if !keys.contains(&key.as_str()) {
                    break key;
                }
                index += 1;
            };
            keys.push(String::leak(key));
        }
        keys
    })
}

// -----------------------------------------------------------------------------
// Codec parts

pub fn validate<V: VariantCodec>(ctx: &mut Context, tree: &Value) -> bool {
    let Some(map) = ctx.check_object(tree) else {
        return false;
    };
    let keys = keys::<V>();
    let mut valid = ctx.check_keys(map, keys);
    let mut present = 0_usize;

    for (index, &key) in keys.iter().enumerate() {
        let Some(slot) = map.get(key) else {
            valid = ctx.reject(ErrorKind::MissingKey(Cow::Borrowed(key)));
            continue;
        };
        if ctx.scoped(key, |ctx| V::validate_slot(ctx, index, slot)) {
            present += usize::from(slot.as_array().is_some_and(|slot| !slot.is_empty()));
        } else {
            valid = false;
        }
    }

    if valid && present != 1 {
        return ctx.reject(ErrorKind::NotExclusive(present));
    }
    valid
}

pub fn encode<V: VariantCodec>(ctx: &mut Context, value: &V) -> Value {
    let active = V::active(value);
    let mut map = Map::new();
    for (index, &key) in keys::<V>().iter().enumerate() {
        let slot = if index == active {
            present(ctx.scoped(key, |ctx| ctx.scoped(0, |ctx| V::encode_active(ctx, value))))
        } else {
            absent()
        };
        map.insert(String::from(key), slot);
    }
    Value::Object(map)
}

pub fn decode<V: VariantCodec>(ctx: &mut Context, tree: &Value) -> Result<V, CodecError> {
    let map = ctx.as_object(tree)?;
    let mut found = None;
    let mut count = 0_usize;

    for (index, &key) in keys::<V>().iter().enumerate() {
        let Some(slot) = map.get(key) else {
            return Err(ctx.error(ErrorKind::MissingKey(Cow::Borrowed(key))));
        };
        let slot = ctx.scoped(key, |ctx| ctx.as_array(slot))?;
        if let [inner] = slot.as_slice() {
            count += 1;
            found = Some((index, key, inner));
        }
    }

    match found {
        Some((index, key, inner)) if count == 1 => {
            ctx.scoped(key, |ctx| ctx.scoped(0, |ctx| V::decode_alternative(ctx, index, inner)))
        }
        _ => Err(ctx.error(ErrorKind::NotExclusive(count))),
    }
}

// -----------------------------------------------------------------------------
// Macro

/// Implements [`Codec`](crate::Codec) and [`TypeTag`](crate::TypeTag)
/// for an enumeration whose variants each hold one value, as a tagged
/// union keyed by the tags of the held types.
///
/// `impl_variant_codec!(Shape { .. })` tags the enumeration with its
/// identifier, `impl_variant_codec!(geo::Shape as "geo::Shape" { .. })`
/// explicitly.
///
/// # Examples
///
/// ```
/// use vc_codec::{deserialize, impl_variant_codec, serialize};
///
/// #[derive(Debug, PartialEq)]
/// enum Id {
///     Number(u64),
///     Name(String),
/// }
///
/// impl_variant_codec!(Id { Number(u64), Name(String) });
///
/// let tree = serialize(&Id::Number(3));
/// assert_eq!(tree, serde_json::json!({ "u64": [3], "String": [] }));
/// assert_eq!(deserialize::<Id>(&tree), Some(Id::Number(3)));
/// ```
#[macro_export]
macro_rules! impl_variant_codec {
    (@impl [$($param:ident),*] $name:ty { $($variant:ident($inner:ty)),+ $(,)? }) => {
        impl<$($param: $crate::Codec),*> $crate::impls::VariantCodec for $name {
            fn alternative_tags() -> $crate::__macro_exports::Vec<&'static str> {
                $crate::__macro_exports::Vec::from([
                    $(<$inner as $crate::TypeTag>::type_tag()),+
                ])
            }

            fn validate_slot(ctx: &mut $crate::Context, index: usize, slot: &$crate::Value) -> bool {
                let validators: &[fn(&mut $crate::Context, &$crate::Value) -> bool] = &[
                    $(<::core::option::Option<$inner> as $crate::Codec>::validate),+
                ];
                validators.get(index).is_some_and(|validate| validate(ctx, slot))
            }

            fn active(value: &Self) -> usize {
                let checks: &[fn(&Self) -> bool] = &[
                    $(|value| ::core::matches!(value, Self::$variant(_))),+
                ];
                checks.iter().position(|check| check(value)).unwrap_or_default()
            }

            fn encode_active(ctx: &mut $crate::Context, value: &Self) -> $crate::Value {
                match value {
                    $(Self::$variant(inner) => <$inner as $crate::Codec>::encode(ctx, inner),)+
                }
            }

            fn decode_alternative(
                ctx: &mut $crate::Context,
                index: usize,
                inner: &$crate::Value,
            ) -> ::core::result::Result<Self, $crate::CodecError> {
                let decoders: &[fn(&mut $crate::Context, &$crate::Value) -> ::core::result::Result<Self, $crate::CodecError>] = &[
                    $(|ctx, inner| <$inner as $crate::Codec>::decode(ctx, inner).map(Self::$variant)),+
                ];
                match decoders.get(index) {
                    Some(decode) => decode(ctx, inner),
                    None => ::core::result::Result::Err(ctx.error($crate::ErrorKind::NotExclusive(0))),
                }
            }
        }

        impl<$($param: $crate::Codec),*> $crate::Codec for $name {
            #[inline]
            fn validate(ctx: &mut $crate::Context, tree: &$crate::Value) -> bool {
                $crate::__macro_exports::validate_variant::<Self>(ctx, tree)
            }

            #[inline]
            fn encode(ctx: &mut $crate::Context, value: &Self) -> $crate::Value {
                $crate::__macro_exports::encode_variant(ctx, value)
            }

            #[inline]
            fn decode(
                ctx: &mut $crate::Context,
                tree: &$crate::Value,
            ) -> ::core::result::Result<Self, $crate::CodecError> {
                $crate::__macro_exports::decode_variant(ctx, tree)
            }
        }
    };
    ($name:ident { $($variant:ident($inner:ty)),+ $(,)? }) => {
        $crate::impl_type_tag!($name);
        $crate::impl_variant_codec!(@impl [] $name { $($variant($inner)),+ });
    };
    ($name:ty as $tag:literal { $($variant:ident($inner:ty)),+ $(,)? }) => {
        $crate::impl_type_tag!($name as $tag);
        $crate::impl_variant_codec!(@impl [] $name { $($variant($inner)),+ });
    };
}

// -----------------------------------------------------------------------------
// Generic unions

macro_rules! define_variant {
    ($(#[$meta:meta])* $name:ident { $($variant:ident($param:ident)),+ }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name<$($param),+> {
            $($variant($param)),+
        }

        impl<$($param: TypeTag),+> TypeTag for $name<$($param),+> {
            fn type_tag() -> &'static str {
                static CELL: TypeCell = TypeCell::new();
                CELL.get_or_insert::<Self, _>(|| {
                    let parts: &[&str] = &[$($param::type_tag()),+];
                    concat(&[::core::stringify!($name), "<", &parts.join(", "), ">"])
                })
            }
        }

        crate::impl_variant_codec!(@impl [$($param),+] $name<$($param),+> { $($variant($param)),+ });
    };
}

define_variant! {
    /// One of two alternatives.
    Variant2 { V0(T0), V1(T1) }
}

define_variant! {
    /// One of three alternatives.
    Variant3 { V0(T0), V1(T1), V2(T2) }
}

define_variant! {
    /// One of four alternatives.
    Variant4 { V0(T0), V1(T1), V2(T2), V3(T3) }
}

define_variant! {
    /// One of five alternatives.
    Variant5 { V0(T0), V1(T1), V2(T2), V3(T3), V4(T4) }
}

define_variant! {
    /// One of six alternatives.
    Variant6 { V0(T0), V1(T1), V2(T2), V3(T3), V4(T4), V5(T5) }
}

#[cfg(test)]
mod tests {
    use alloc::string::{String, ToString};
    use alloc::vec;
    use alloc::vec::Vec;

    use serde_json::json;

    use super::{Variant2, Variant3};
    use crate::{Context, ErrorKind, TypeTag, deserialize, serialize, validate};

    type FooBar = Variant2<i32, String>;

    #[test]
    fn one_key_per_alternative() {
        let value = FooBar::V1("FooBar".to_string());
        let tree = serialize(&value);
        assert_eq!(tree, json!({ "i32": [], "String": ["FooBar"] }));
        assert_eq!(tree.as_object().unwrap().len(), 2);
        assert_eq!(deserialize::<FooBar>(&tree), Some(value));
        assert_eq!(FooBar::type_tag(), "Variant2<i32, String>");
    }

    #[test]
    fn exactly_one_alternative_is_present() {
        let mut ctx = Context::new();
        assert!(!ctx.validate::<FooBar>(&json!({ "i32": [], "String": [] })));
        assert_eq!(ctx.diagnostics()[0].kind, ErrorKind::NotExclusive(0));

        let mut ctx = Context::new();
        assert!(!ctx.validate::<FooBar>(&json!({ "i32": [1], "String": ["x"] })));
        assert_eq!(ctx.diagnostics()[0].kind, ErrorKind::NotExclusive(2));

        let mut ctx = Context::new();
        let error = ctx
            .try_deserialize::<FooBar>(&json!({ "i32": [1], "String": ["x"] }))
            .unwrap_err();
        assert_eq!(error.errors[0].kind, ErrorKind::NotExclusive(2));
    }

    #[test]
    fn key_set_is_exact() {
        assert!(!validate::<FooBar>(&json!({ "i32": [1] })));
        assert!(!validate::<FooBar>(&json!({ "i32": [1], "String": [], "u8": [] })));
        assert!(!validate::<FooBar>(&json!({ "i32": 1, "String": [] })));
        assert!(!validate::<FooBar>(&json!({ "i32": ["1"], "String": [] })));
    }

    #[test]
    fn repeated_tags_get_suffixed_keys() {
        type Twice = Variant3<u8, u8, bool>;
        let tree = serialize(&Twice::V1(4));
        assert_eq!(tree, json!({ "u8": [], "u80": [4], "bool": [] }));
        assert_eq!(deserialize::<Twice>(&tree), Some(Twice::V1(4)));
    }

    #[derive(Debug, PartialEq)]
    enum Reading {
        Missing(()),
        Samples(Vec<f64>),
        Label(String),
    }

    crate::impl_variant_codec!(Reading as "tests::Reading" {
        Missing(()),
        Samples(Vec<f64>),
        Label(String),
    });

    #[test]
    fn user_enumerations() {
        let readings = vec![
            Reading::Missing(()),
            Reading::Samples(vec![0.5]),
            Reading::Label("calibrated".to_string()),
        ];
        let tree = serialize(&readings);
        assert_eq!(tree[1], json!({ "()": [], "Vec<f64>": [[0.5]], "String": [] }));
        assert_eq!(deserialize::<Vec<Reading>>(&tree), Some(readings));
        assert_eq!(Reading::type_tag(), "tests::Reading");
    }

    #[test]
    fn inner_errors_are_located() {
        let mut ctx = Context::new();
        assert!(!ctx.validate::<FooBar>(&json!({ "i32": [], "String": [7] })));
        assert_eq!(ctx.diagnostics()[0].path.to_string(), "$.String[0]");
    }
}
