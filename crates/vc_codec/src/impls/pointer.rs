//! Owning pointers.
//!
//! - `Box<T>` is `{"wrappedType": T}`.
//! - `Rc<T>` and `Arc<T>` are `{"ptr": id, "wrappedType": T}`, where `id`
//!   names the allocation. One encoding [`Context`] gives an allocation
//!   the same id every time, and no two sessions of a process hand out the
//!   same id. Decoding in one session turns equal ids with equal payloads
//!   back into one shared instance.
//!
//! A null owning pointer is `Option<Box<T>>`, encoded like any `Option`.

use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::rc::{self, Rc};
use alloc::string::{String, ToString};
use alloc::sync::{self, Arc};
use core::any::Any;

use serde_json::{Map, Value};

use crate::context::SharedKey;
use crate::registry::{TypeCell, concat};
use crate::{Codec, CodecError, Context, ErrorKind, TypeTag};

const WRAPPED: &str = "wrappedType";
const PTR: &str = "ptr";

// -----------------------------------------------------------------------------
// PointeeCodec

/// The codec of a type as seen behind an owning pointer.
///
/// Every [`Codec`] type is a pointee. Trait objects become pointees
/// through [`impl_polymorphic!`](crate::impl_polymorphic), which is why
/// decoding yields the pointer rather than the value: a `dyn Trait` can
/// only be built already boxed.
pub trait PointeeCodec: TypeTag {
    fn validate_pointee(ctx: &mut Context, tree: &Value) -> bool;

    fn encode_pointee(ctx: &mut Context, value: &Self) -> Value;

    fn decode_box(ctx: &mut Context, tree: &Value) -> Result<Box<Self>, CodecError>;

    fn decode_rc(ctx: &mut Context, tree: &Value) -> Result<Rc<Self>, CodecError>;

    fn decode_arc(ctx: &mut Context, tree: &Value) -> Result<Arc<Self>, CodecError>;
}

impl<T: Codec> PointeeCodec for T {
    #[inline]
    fn validate_pointee(ctx: &mut Context, tree: &Value) -> bool {
        T::validate(ctx, tree)
    }

    #[inline]
    fn encode_pointee(ctx: &mut Context, value: &Self) -> Value {
        T::encode(ctx, value)
    }

    #[inline]
    fn decode_box(ctx: &mut Context, tree: &Value) -> Result<Box<Self>, CodecError> {
        T::decode(ctx, tree).map(Box::new)
    }

    #[inline]
    fn decode_rc(ctx: &mut Context, tree: &Value) -> Result<Rc<Self>, CodecError> {
        T::decode(ctx, tree).map(Rc::new)
    }

    #[inline]
    fn decode_arc(ctx: &mut Context, tree: &Value) -> Result<Arc<Self>, CodecError> {
        T::decode(ctx, tree).map(Arc::new)
    }
}

macro_rules! impl_pointer_tag {
    ($($ptr:ident)*) => {$(
        impl<T: ?Sized + TypeTag> TypeTag for $ptr<T> {
            fn type_tag() -> &'static str {
                static CELL: TypeCell = TypeCell::new();
                CELL.get_or_insert::<Self, _>(|| {
                    concat(&[::core::stringify!($ptr), "<", T::type_tag(), ">"])
                })
            }
        }
    )*};
}

impl_pointer_tag!(Box Rc Arc);

// -----------------------------------------------------------------------------
// Shared helpers

fn validate_wrapped<T: ?Sized + PointeeCodec>(ctx: &mut Context, map: &Map<String, Value>) -> bool {
    match map.get(WRAPPED) {
        Some(tree) => ctx.scoped(WRAPPED, |ctx| T::validate_pointee(ctx, tree)),
        None => ctx.reject(ErrorKind::MissingKey(Cow::Borrowed(WRAPPED))),
    }
}

fn wrapped<'t>(ctx: &Context, map: &'t Map<String, Value>) -> Result<&'t Value, CodecError> {
    map.get(WRAPPED)
        .ok_or_else(|| ctx.error(ErrorKind::MissingKey(Cow::Borrowed(WRAPPED))))
}

fn validate_shared<T: ?Sized + PointeeCodec>(ctx: &mut Context, tree: &Value) -> bool {
    let Some(map) = ctx.check_object(tree) else {
        return false;
    };
    let known = ctx.check_keys(map, &[PTR, WRAPPED]);
    let id = ctx.validate_key::<u64>(map, PTR);
    known & id & validate_wrapped::<T>(ctx, map)
}

fn encode_shared<T: ?Sized + PointeeCodec>(
    ctx: &mut Context,
    address: usize,
    value: &T,
    weak: impl FnOnce() -> Box<dyn Any>,
) -> Value {
    let id = ctx.share_id(address, weak);
    let mut map = Map::new();
    map.insert(PTR.into(), Value::from(id));
    let inner = ctx.scoped(WRAPPED, |ctx| T::encode_pointee(ctx, value));
    map.insert(WRAPPED.into(), inner);
    Value::Object(map)
}

/// Reads the identity and payload of a shared pointer, returning the
/// cache key together with the payload.
fn shared_parts<'t, P: ?Sized + 'static>(
    ctx: &mut Context,
    tree: &'t Value,
) -> Result<(SharedKey, &'t Value), CodecError> {
    let map = ctx.as_object(tree)?;
    let id = ctx.decode_key::<u64>(map, PTR)?;
    let inner = wrapped(ctx, map)?;
    Ok((SharedKey::new::<P>(id, inner.to_string()), inner))
}

// -----------------------------------------------------------------------------
// Box

impl<T: ?Sized + PointeeCodec> Codec for Box<T> {
    fn validate(ctx: &mut Context, tree: &Value) -> bool {
        let Some(map) = ctx.check_object(tree) else {
            return false;
        };
        let known = ctx.check_keys(map, &[WRAPPED]);
        known & validate_wrapped::<T>(ctx, map)
    }

    fn encode(ctx: &mut Context, value: &Self) -> Value {
        let inner = ctx.scoped(WRAPPED, |ctx| T::encode_pointee(ctx, value));
        let mut map = Map::new();
        map.insert(WRAPPED.into(), inner);
        Value::Object(map)
    }

    fn decode(ctx: &mut Context, tree: &Value) -> Result<Self, CodecError> {
        let map = ctx.as_object(tree)?;
        let inner = wrapped(ctx, map)?;
        ctx.scoped(WRAPPED, |ctx| T::decode_box(ctx, inner))
    }
}

// -----------------------------------------------------------------------------
// Rc & Arc

macro_rules! impl_shared_codec {
    ($ptr:ident, $weak:ident, $decode:ident) => {
        impl<T: ?Sized + PointeeCodec> Codec for $ptr<T> {
            #[inline]
            fn validate(ctx: &mut Context, tree: &Value) -> bool {
                validate_shared::<T>(ctx, tree)
            }

            fn encode(ctx: &mut Context, value: &Self) -> Value {
                let address = $ptr::as_ptr(value).cast::<()>().addr();
                let weak = $ptr::downgrade(value);
                encode_shared::<T>(ctx, address, value, move || Box::new(weak) as Box<dyn Any>)
            }

            fn decode(ctx: &mut Context, tree: &Value) -> Result<Self, CodecError> {
                let (key, inner) = shared_parts::<Self>(ctx, tree)?;
                if let Some(shared) = ctx.shared_lookup(&key, $weak::Weak::<T>::upgrade) {
                    log::trace!("reusing shared `{}` at `{}`", T::type_tag(), ctx.path());
                    return Ok(shared);
                }
                let fresh = ctx.scoped(WRAPPED, |ctx| T::$decode(ctx, inner))?;
                ctx.shared_insert(key, $ptr::downgrade(&fresh));
                Ok(fresh)
            }
        }
    };
}

impl_shared_codec!(Rc, rc, decode_rc);
impl_shared_codec!(Arc, sync, decode_arc);

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::rc::Rc;
    use alloc::string::String;
    use alloc::sync::Arc;
    use alloc::vec;
    use alloc::vec::Vec;

    use serde_json::json;

    use crate::{Context, TypeTag, deserialize, serialize, validate};

    #[test]
    fn pointer_tags() {
        assert_eq!(<Box<u8>>::type_tag(), "Box<u8>");
        assert_eq!(<Rc<String>>::type_tag(), "Rc<String>");
        assert_eq!(<Arc<Vec<u8>>>::type_tag(), "Arc<Vec<u8>>");
    }

    #[test]
    fn box_wraps_its_pointee() {
        let tree = serialize(&Box::new(5_u8));
        assert_eq!(tree, json!({ "wrappedType": 5 }));
        assert_eq!(deserialize::<Box<u8>>(&tree), Some(Box::new(5)));
        assert!(!validate::<Box<u8>>(&json!(5)));
        assert!(!validate::<Box<u8>>(&json!({ "wrappedType": 5, "extra": 0 })));
        assert!(!validate::<Box<u8>>(&json!({})));
    }

    #[test]
    fn null_box_is_an_empty_option() {
        assert_eq!(serialize(&None::<Box<u8>>), json!([]));
        assert_eq!(deserialize::<Option<Box<u8>>>(&json!([])), Some(None));
    }

    #[test]
    fn shared_pointer_shape() {
        let tree = serialize(&Rc::new(String::from("x")));
        assert!(tree["ptr"].is_u64());
        assert_eq!(tree["wrappedType"], json!("x"));
        assert_eq!(tree.as_object().map(|map| map.len()), Some(2));
        assert!(!validate::<Rc<String>>(&json!({ "wrappedType": "x" })));
        assert!(!validate::<Rc<String>>(&json!({ "ptr": -1, "wrappedType": "x" })));
    }

    #[test]
    fn one_object_decodes_to_one_instance() {
        let original = Rc::new(5_u32);
        let mut ctx = Context::new();
        let tree = ctx.serialize(&vec![original.clone(), original.clone()]);
        assert_eq!(tree[0]["ptr"], tree[1]["ptr"]);

        let decoded = ctx.deserialize::<Vec<Rc<u32>>>(&tree).unwrap();
        assert!(Rc::ptr_eq(&decoded[0], &decoded[1]));
        assert!(!Rc::ptr_eq(&decoded[0], &original));
        assert_eq!(*decoded[0], 5);
    }

    #[test]
    fn sessions_do_not_merge() {
        let original = Rc::new(5_u32);
        let mut ctx = Context::new();
        let tree = ctx.serialize(&original);
        let first = ctx.deserialize::<Rc<u32>>(&tree).unwrap();
        ctx.clear();
        let second = ctx.deserialize::<Rc<u32>>(&tree).unwrap();
        assert!(!Rc::ptr_eq(&first, &second));
    }

    #[test]
    fn equal_values_from_distinct_objects_stay_distinct() {
        let mut ctx = Context::new();
        let tree = ctx.serialize(&vec![Rc::new(5_u32), Rc::new(5_u32)]);
        assert_ne!(tree[0]["ptr"], tree[1]["ptr"]);

        let decoded = ctx.deserialize::<Vec<Rc<u32>>>(&tree).unwrap();
        assert!(!Rc::ptr_eq(&decoded[0], &decoded[1]));
    }

    #[test]
    fn separately_encoded_objects_stay_distinct() {
        let first = serialize(&Rc::new(42_u32));
        let second = serialize(&Rc::new(42_u32));
        assert_ne!(first, second);

        let mut ctx = Context::new();
        let a = ctx.deserialize::<Rc<u32>>(&first).unwrap();
        let b = ctx.deserialize::<Rc<u32>>(&second).unwrap();
        assert!(!Rc::ptr_eq(&a, &b));
        assert_eq!((*a, *b), (42, 42));
    }

    #[test]
    fn cache_never_keeps_instances_alive() {
        let mut ctx = Context::new();
        let tree = ctx.serialize(&Rc::new(String::from("short-lived")));
        let decoded = ctx.deserialize::<Rc<String>>(&tree).unwrap();
        assert_eq!(Rc::strong_count(&decoded), 1);
        let weak = Rc::downgrade(&decoded);
        drop(decoded);
        assert!(weak.upgrade().is_none());

        let again = ctx.deserialize::<Rc<String>>(&tree).unwrap();
        assert_eq!(*again, "short-lived");
    }

    #[test]
    fn arc_shares_like_rc() {
        let original = Arc::new(vec![1_u8, 2]);
        let mut ctx = Context::new();
        let tree = ctx.serialize(&[original.clone(), original]);
        let [a, b] = ctx.deserialize::<[Arc<Vec<u8>>; 2]>(&tree).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
