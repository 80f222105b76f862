//! Trait objects behind owning pointers.
//!
//! A base trait lists its concrete types once, through
//! [`impl_polymorphic!`](crate::impl_polymorphic). `Box<dyn Base>`,
//! `Rc<dyn Base>` and `Arc<dyn Base>` then encode the concrete value
//! together with its tag:
//!
//! ```json
//! { "wrappedType": { "typeName": "Circle", "instance": { "radius": 1.5 } } }
//! ```
//!
//! Decoding reads the tag, decodes that candidate and upcasts it. The set
//! of candidates is closed: a tag outside of it fails validation, and
//! encoding a value whose type is not listed panics.
//!
//! # Examples
//!
//! ```
//! use std::any::Any;
//! use vc_codec::{ClassBuilder, ClassCodec, Construction, impl_class_codec, impl_polymorphic};
//!
//! trait Animal: Any {
//!     fn legs(&self) -> u32;
//! }
//!
//! #[derive(Debug, PartialEq)]
//! struct Bird;
//!
//! impl Animal for Bird {
//!     fn legs(&self) -> u32 { 2 }
//! }
//!
//! impl ClassCodec for Bird {
//!     fn configure(class: &mut ClassBuilder<Self>) -> Construction<Self> {
//!         class.construct((), |()| Bird)
//!     }
//! }
//!
//! impl_class_codec!(Bird);
//! impl_polymorphic!(dyn Animal => [Bird]);
//!
//! let zoo: Vec<Box<dyn Animal>> = vec![Box::new(Bird)];
//! let tree = vc_codec::serialize(&zoo);
//! assert_eq!(tree[0]["wrappedType"]["typeName"], "Bird");
//!
//! let back = vc_codec::deserialize::<Vec<Box<dyn Animal>>>(&tree).unwrap();
//! assert_eq!(back[0].legs(), 2);
//! ```

// -----------------------------------------------------------------------------
// Modules

mod set;

// -----------------------------------------------------------------------------
// Exports

pub use set::{PolymorphicSet, Upcast};

use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::Any;

use serde_json::{Map, Value};

use crate::{CodecError, Context, ErrorKind, TypeTag};

use set::Candidate;

const TYPE_NAME: &str = "typeName";
const INSTANCE: &str = "instance";

// -----------------------------------------------------------------------------
// Polymorphic

/// A base type with a closed set of concrete candidates.
///
/// Implemented for `dyn Base` by [`impl_polymorphic!`](crate::impl_polymorphic).
pub trait Polymorphic: TypeTag {
    /// The value as [`Any`], to find its concrete type.
    fn as_any(value: &Self) -> &dyn Any;

    /// The candidates, built on first call.
    fn polymorphic_set() -> &'static PolymorphicSet<Self>;
}

// -----------------------------------------------------------------------------
// Codec parts

fn candidate_tag<'t>(ctx: &mut Context, map: &'t Map<String, Value>) -> Result<&'t str, CodecError> {
    match map.get(TYPE_NAME) {
        Some(tag) => ctx.scoped(TYPE_NAME, |ctx| ctx.as_str(tag)),
        None => Err(ctx.error(ErrorKind::MissingKey(Cow::Borrowed(TYPE_NAME)))),
    }
}

fn resolve<'t, B: ?Sized + Polymorphic>(
    ctx: &mut Context,
    tree: &'t Value,
) -> Result<(&'static Candidate<B>, &'t Value), CodecError> {
    let map = ctx.as_object(tree)?;
    let tag = candidate_tag(ctx, map)?;
    let Some(candidate) = B::polymorphic_set().by_tag(tag) else {
        return Err(ctx.scoped(TYPE_NAME, |ctx| ctx.error(ErrorKind::UnknownTypeTag(tag.to_string()))));
    };
    match map.get(INSTANCE) {
        Some(instance) => Ok((candidate, instance)),
        None => Err(ctx.error(ErrorKind::MissingKey(Cow::Borrowed(INSTANCE)))),
    }
}

pub fn validate<B: ?Sized + Polymorphic>(ctx: &mut Context, tree: &Value) -> bool {
    let Some(map) = ctx.check_object(tree) else {
        return false;
    };
    if !(ctx.check_keys(map, &[TYPE_NAME, INSTANCE]) & ctx.validate_key::<String>(map, TYPE_NAME)) {
        return false;
    }
    let tag = map.get(TYPE_NAME).and_then(Value::as_str).unwrap_or_default();
    let Some(candidate) = B::polymorphic_set().by_tag(tag) else {
        return ctx.scoped(TYPE_NAME, |ctx| ctx.reject(ErrorKind::UnknownTypeTag(tag.to_string())));
    };
    match map.get(INSTANCE) {
        Some(instance) => ctx.scoped(INSTANCE, |ctx| (candidate.validate)(ctx, instance)),
        None => ctx.reject(ErrorKind::MissingKey(Cow::Borrowed(INSTANCE))),
    }
}

/// Encodes `value` through the candidate matching its concrete type.
///
/// # Panics
///
/// If the concrete type is not a candidate of `B`.
pub fn encode<B: ?Sized + Polymorphic>(ctx: &mut Context, value: &B) -> Value {
    let any = B::as_any(value);
    let set = B::polymorphic_set();
    let Some(candidate) = set.by_type(<dyn Any>::type_id(any)) else {
        let supported = set.tags().collect::<Vec<_>>().join(", ");
        log::error!("unregistered `{}` at `{}`", B::type_tag(), ctx.path());
        panic!(
            "encoding a `{}` whose concrete type is not registered, expected one of [{supported}]",
            B::type_tag()
        );
    };

    let instance = ctx.scoped(INSTANCE, |ctx| (candidate.encode)(ctx, any));
    let mut map = Map::new();
    map.insert(TYPE_NAME.into(), Value::from(candidate.tag));
    map.insert(INSTANCE.into(), instance);
    Value::Object(map)
}

macro_rules! impl_decode_poly {
    ($($name:ident -> $ptr:ident),*) => {$(
        pub fn $name<B: ?Sized + Polymorphic>(ctx: &mut Context, tree: &Value) -> Result<$ptr<B>, CodecError> {
            let (candidate, instance) = resolve::<B>(ctx, tree)?;
            ctx.scoped(INSTANCE, |ctx| (candidate.$name)(ctx, instance))
        }
    )*};
}

impl_decode_poly!(decode_box -> Box, decode_rc -> Rc, decode_arc -> Arc);

// -----------------------------------------------------------------------------
// Macro

/// Implements [`Polymorphic`], [`TypeTag`](crate::TypeTag) and
/// [`PointeeCodec`](crate::PointeeCodec) for `dyn Base`, given the list
/// of its concrete types.
///
/// The base trait must have `Any` as a supertrait. Each candidate needs a
/// [`Codec`](crate::Codec) and is identified by its tag. The base is
/// tagged `dyn Base` unless given one with `as`.
///
/// ```ignore
/// impl_polymorphic!(dyn Shape => [Circle, Square]);
/// impl_polymorphic!(dyn geo::Shape as "Shape" => [Circle, Square]);
/// ```
#[macro_export]
macro_rules! impl_polymorphic {
    (dyn $base:path => [$($candidate:ty),+ $(,)?]) => {
        $crate::impl_polymorphic!(
            dyn $base as ::core::concat!("dyn ", ::core::stringify!($base)) => [$($candidate),+]
        );
    };
    (dyn $base:path as $tag:expr => [$($candidate:ty),+ $(,)?]) => {
        impl $crate::TypeTag for dyn $base {
            #[inline]
            fn type_tag() -> &'static str {
                $tag
            }
        }

        impl $crate::Polymorphic for dyn $base {
            #[inline]
            fn as_any(value: &Self) -> &dyn ::core::any::Any {
                value
            }

            fn polymorphic_set() -> &'static $crate::PolymorphicSet<Self> {
                static SET: $crate::__macro_exports::OnceLock<$crate::PolymorphicSet<dyn $base>> =
                    $crate::__macro_exports::OnceLock::new();
                SET.get_or_init(|| {
                    $crate::PolymorphicSet::<dyn $base>::new()
                        $(.candidate::<$candidate>($crate::Upcast {
                            boxed: |value| value,
                            rc: |value| value,
                            arc: |value| value,
                        }))+
                })
            }
        }

        impl $crate::PointeeCodec for dyn $base {
            #[inline]
            fn validate_pointee(ctx: &mut $crate::Context, tree: &$crate::Value) -> bool {
                $crate::__macro_exports::validate_poly::<Self>(ctx, tree)
            }

            #[inline]
            fn encode_pointee(ctx: &mut $crate::Context, value: &Self) -> $crate::Value {
                $crate::__macro_exports::encode_poly::<Self>(ctx, value)
            }

            #[inline]
            fn decode_box(
                ctx: &mut $crate::Context,
                tree: &$crate::Value,
            ) -> ::core::result::Result<$crate::__macro_exports::Box<Self>, $crate::CodecError> {
                $crate::__macro_exports::decode_poly_box::<Self>(ctx, tree)
            }

            #[inline]
            fn decode_rc(
                ctx: &mut $crate::Context,
                tree: &$crate::Value,
            ) -> ::core::result::Result<$crate::__macro_exports::Rc<Self>, $crate::CodecError> {
                $crate::__macro_exports::decode_poly_rc::<Self>(ctx, tree)
            }

            #[inline]
            fn decode_arc(
                ctx: &mut $crate::Context,
                tree: &$crate::Value,
            ) -> ::core::result::Result<$crate::__macro_exports::Arc<Self>, $crate::CodecError> {
                $crate::__macro_exports::decode_poly_arc::<Self>(ctx, tree)
            }
        }
    };
}
